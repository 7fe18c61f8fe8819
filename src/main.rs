use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use r_filetools::compress::{gzip, targz};
use r_filetools::decompress::unzip::folder_name_of;
use r_filetools::{FileToolError, FileToolLogger, Unzipper, Zipper, fsutil, logger};

const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(version, about = "Datei- und Archivwerkzeuge")]
struct Cli {
    /// Ausführliches Logging einschalten
    #[arg(long, global = true)]
    verbose: bool,

    /// In diese Datei loggen statt auf die Konsole
    #[arg(long, global = true, env = "R_FILETOOLS_LOG", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log-Datei `log-<NAME>.txt` im Log-Verzeichnis anlegen
    #[arg(long, global = true, value_name = "NAME", conflicts_with = "log_file")]
    log_component: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Eine einzelne Datei zippen
    Zip { file: PathBuf, target_dir: PathBuf },
    /// Ein Verzeichnis zippen
    ZipDir { dir: PathBuf, target_dir: PathBuf },
    /// Eine Zip-Datei entpacken
    Unzip {
        zip: PathBuf,
        target_dir: PathBuf,
        /// Zielordner, Standard ist der Name der Zip-Datei
        #[arg(long)]
        folder: Option<String>,
    },
    /// Eine Datei mit GZip komprimieren
    Gzip { src: PathBuf, dest: PathBuf },
    /// Eine GZip-Datei entpacken
    Gunzip { src: PathBuf, dest: PathBuf },
    /// Ein Verzeichnis als tar.gz packen
    Tar { dir: PathBuf, dest: PathBuf },
    /// Ein tar.gz-Archiv entpacken
    Untar { archive: PathBuf, dest: PathBuf },
    /// Eine Datei in ein Verzeichnis kopieren
    Copy { file: PathBuf, target_dir: PathBuf },
    /// Eine Datei oder ein Verzeichnis löschen
    Rm { path: PathBuf },
    /// Ein Verzeichnis anlegen
    Mkdir { path: PathBuf },
    /// Eine Datei umbenennen
    Rename {
        dir: PathBuf,
        name: String,
        new_name: String,
    },
    /// Den Inhalt einer Datei ausgeben
    Cat { file: PathBuf },
    /// Die aktuelle Log-Datei ausgeben
    ShowLog,
}

fn main() {
    let cli = Cli::parse();

    init_logging(&cli);
    info!("Starting application (verbose: {})", cli.verbose);

    if let Err(e) = run(cli.command) {
        error!("Application error: {}", e);
        eprintln!("Fehler: {}", e);
        log::logger().flush();
        std::process::exit(1);
    }

    info!("Application shutdown");
    log::logger().flush();
}

fn init_logging(cli: &Cli) {
    let log_path = match (&cli.log_file, &cli.log_component) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(component)) => Some(logger::log_path_in(Path::new(DEFAULT_LOG_DIR), component)),
        (None, None) => None,
    };

    match log_path {
        Some(path) => {
            if let Err(e) = FileToolLogger::init(cli.verbose, &path) {
                eprintln!("Logging konnte nicht gestartet werden: {}", e);
            }
        }
        None => {
            let default_level = if cli.verbose { "trace" } else { "info" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
                .init();
        }
    }
}

fn run(command: Command) -> Result<(), FileToolError> {
    match command {
        Command::Zip { file, target_dir } => {
            let archive = Zipper::new().zip_file(&file, &target_dir)?;
            println!("{}", archive.display());
        }
        Command::ZipDir { dir, target_dir } => {
            let archive = Zipper::new().zip_directory(&dir, &target_dir)?;
            println!("{}", archive.display());
        }
        Command::Unzip {
            zip,
            target_dir,
            folder,
        } => {
            let folder = match folder {
                Some(folder) => folder,
                None => folder_name_of(&zip)?,
            };
            let report = Unzipper::new().unzip(&zip, &target_dir, &folder)?;
            println!(
                "{} Einträge entpackt, {} übersprungen nach {}",
                report.extracted,
                report.skipped,
                report.folder.display()
            );
        }
        Command::Gzip { src, dest } => {
            gzip::compress_file(&src, &dest)?;
        }
        Command::Gunzip { src, dest } => {
            gzip::decompress_file(&src, &dest)?;
        }
        Command::Tar { dir, dest } => {
            targz::pack_dir_to_file(&dir, &dest)?;
        }
        Command::Untar { archive, dest } => {
            targz::unpack_file(&archive, &dest)?;
        }
        Command::Copy { file, target_dir } => {
            fsutil::copy_file_into(&target_dir, &file)?;
        }
        Command::Rm { path } => {
            // a symlink is removed as a link, its target stays
            let removed = if fsutil::is_real_dir(&path) {
                fsutil::remove_dir_recursive(&path)?
            } else {
                fsutil::remove_file(&path)?
            };
            if !removed {
                warn!("Nothing removed at {}", path.display());
                return Err(FileToolError::NotFound(path.display().to_string()));
            }
        }
        Command::Mkdir { path } => {
            if !fsutil::create_dir(&path)? {
                info!("Directory {} already exists", path.display());
            }
        }
        Command::Rename {
            dir,
            name,
            new_name,
        } => {
            if !fsutil::rename(&dir, &name, &new_name)? {
                return Err(FileToolError::NotFound(dir.join(name).display().to_string()));
            }
        }
        Command::Cat { file } => {
            print!("{}", fsutil::read_to_string(&file)?);
        }
        Command::ShowLog => {
            if !logger::is_started() {
                warn!("No log file in use, start with --log-file or --log-component");
            }
            logger::print_log_to_console();
        }
    }
    Ok(())
}
