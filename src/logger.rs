use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, atomic::{AtomicBool, Ordering}};

use crate::error::{FileToolError, Result};
use crate::fsutil;

static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);
static LOGGING_STARTED: AtomicBool = AtomicBool::new(false);
static LOG_FILE_PATH: OnceLock<PathBuf> = OnceLock::new();

pub struct FileToolLogger {
    log_file: Mutex<File>,
}

impl FileToolLogger {
    /// Installs the file logger. The log file is recreated empty once the
    /// logger is in place; a failed install leaves it untouched.
    pub fn init(verbose: bool, log_path: &Path) -> Result<()> {
        let component = component_of(log_path);
        Self::install(verbose, log_path, &component)
    }

    /// Starts logging for `component` into `log-<component>.txt` next to the
    /// executable.
    pub fn init_for(component: &str, verbose: bool) -> Result<()> {
        let log_path = log_path_in(&fsutil::execution_dir()?, component);
        Self::install(verbose, &log_path, component)
    }

    fn install(verbose: bool, log_path: &Path, component: &str) -> Result<()> {
        if is_started() {
            return Err(FileToolError::Logger(format!(
                "Logging läuft bereits in {}",
                log_file_path().map(|p| p.display().to_string()).unwrap_or_default()
            )));
        }

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if fsutil::is_dir_and_exists(log_path) {
            return Err(FileToolError::IsADirectory(log_path.display().to_string()));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        let truncate_handle = file.try_clone()?;

        let logger = FileToolLogger {
            log_file: Mutex::new(file),
        };

        log::set_boxed_logger(Box::new(logger))?;
        truncate_handle.set_len(0)?;

        VERBOSE_MODE.store(verbose, Ordering::Relaxed);
        log::set_max_level(if verbose {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        });

        let _ = LOG_FILE_PATH.set(log_path.to_path_buf());
        LOGGING_STARTED.store(true, Ordering::Relaxed);
        log::info!("starting logging of {}", component);
        Ok(())
    }
}

/// `log-FileRef.txt` belongs to `FileRef`; other names stand for themselves.
fn component_of(log_path: &Path) -> String {
    let stem = log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix("log-") {
        Some(component) if !component.is_empty() => component.to_string(),
        _ => stem,
    }
}

impl log::Log for FileToolLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if VERBOSE_MODE.load(Ordering::Relaxed) {
            true
        } else {
            metadata.level() <= Level::Info
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_line = format_line(record.level(), record.target(), &record.args().to_string());

            if let Ok(mut file) = self.log_file.lock() {
                let _ = file.write_all(log_line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        target,
        message
    )
}

/// Log file location for `component` below `dir`; a trailing `bin` folder is
/// skipped so build output directories log into the project root.
pub fn log_path_in(dir: &Path, component: &str) -> PathBuf {
    let base = if dir.ends_with("bin") {
        dir.parent().unwrap_or(dir)
    } else {
        dir
    };
    base.join(format!("log-{}.txt", component))
}

pub fn is_started() -> bool {
    LOGGING_STARTED.load(Ordering::Relaxed)
}

pub fn log_file_path() -> Option<PathBuf> {
    LOG_FILE_PATH.get().cloned()
}

pub fn log_file_contents() -> Result<String> {
    let path = log_file_path()
        .ok_or_else(|| FileToolError::NotFound("Log-Datei".to_string()))?;
    log::logger().flush();
    fsutil::read_to_string(&path)
}

pub fn print_log_to_console() {
    match log_file_contents() {
        Ok(content) => println!("{}", content),
        Err(e) => eprintln!("Fehler beim Lesen der Log-Datei: {}", e),
    }
}

/// Maps textual level names, including the classic SEVERE/FINE family,
/// onto `log` levels.
pub fn parse_level(label: &str) -> Option<Level> {
    match label.trim().to_ascii_uppercase().as_str() {
        "SEVERE" | "ERROR" => Some(Level::Error),
        "WARNING" | "WARN" => Some(Level::Warn),
        "INFO" | "CONFIG" => Some(Level::Info),
        "FINE" | "DEBUG" => Some(Level::Debug),
        "FINER" | "FINEST" | "TRACE" => Some(Level::Trace),
        _ => None,
    }
}

pub fn log_message(level_label: &str, message: &str) {
    match parse_level(level_label) {
        Some(level) => log::log!(level, "{}", message),
        None => log::trace!("LOGGING_ERROR:{}", level_label),
    }
}
