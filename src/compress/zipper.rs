use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FileToolError, Result};
use crate::fsutil;

/// Write buffer for archive output.
pub const ZIP_BUFFER_LEN: usize = 2048;

/// Creates `.zip` archives and remembers the last one written.
#[derive(Debug, Default, Clone)]
pub struct Zipper {
    dir: Option<PathBuf>,
    file_name: Option<String>,
}

impl Zipper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(dir: &Path, file_name: &str) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
            file_name: Some(file_name.to_string()),
        }
    }

    /// Packs a single file into `<target_dir>/<file name>.zip`.
    pub fn zip_file(&mut self, file: &Path, target_dir: &Path) -> Result<PathBuf> {
        if fsutil::is_dir_and_exists(file) {
            return Err(FileToolError::IsADirectory(file.display().to_string()));
        }
        if !fsutil::is_file_not_dir(file) {
            return Err(FileToolError::NotFound(file.display().to_string()));
        }
        if !fsutil::is_dir_and_exists(target_dir) {
            return Err(FileToolError::NotADirectory(target_dir.display().to_string()));
        }

        let name = entry_file_name(file)?;
        let archive_name = format!("{}.zip", name);
        let destination = target_dir.join(&archive_name);

        let mut zip = ZipWriter::new(BufWriter::with_capacity(
            ZIP_BUFFER_LEN,
            File::create(&destination)?,
        ));
        zip.start_file(name.as_str(), file_options())?;
        let mut reader = BufReader::with_capacity(ZIP_BUFFER_LEN, File::open(file)?);
        fsutil::move_stream_data(&mut reader, &mut zip)?;
        zip.finish()?.flush()?;

        info!("Zipped {} -> {}", file.display(), destination.display());
        self.remember(target_dir, archive_name);
        Ok(destination)
    }

    /// Packs everything below `dir` into `<target_dir>/<dir name>.zip`,
    /// entries named relative to `dir`.
    pub fn zip_directory(&mut self, dir: &Path, target_dir: &Path) -> Result<PathBuf> {
        if !fsutil::exists(dir) || !fsutil::is_dir_and_exists(target_dir) {
            return Err(FileToolError::TargetMissing {
                target: target_dir.display().to_string(),
                file: dir.display().to_string(),
            });
        }
        if !dir.is_dir() {
            return Err(FileToolError::NotADirectory(dir.display().to_string()));
        }

        let archive_name = format!("{}.zip", entry_file_name(dir)?);
        let destination = target_dir.join(&archive_name);
        let output = File::create(&destination)?;
        // target_dir may lie inside dir, the archive must not pack itself
        let skip = destination.canonicalize()?;

        let mut zip = ZipWriter::new(BufWriter::with_capacity(ZIP_BUFFER_LEN, output));
        let options = file_options();

        for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if path.canonicalize().is_ok_and(|p| p == skip) {
                debug!("Skipping the archive being written {}", path.display());
                continue;
            }
            let name = entry_name(path.strip_prefix(dir)?);

            if entry.file_type().is_dir() {
                debug!("Adding directory entry {}", name);
                zip.add_directory(name.as_str(), options)?;
            } else if entry.file_type().is_file() {
                debug!("Adding file entry {}", name);
                zip.start_file(name.as_str(), options)?;
                let mut reader = BufReader::with_capacity(ZIP_BUFFER_LEN, File::open(path)?);
                fsutil::move_stream_data(&mut reader, &mut zip)?;
            }
        }
        zip.finish()?.flush()?;

        info!("Zipped directory {} -> {}", dir.display(), destination.display());
        self.remember(target_dir, archive_name);
        Ok(destination)
    }

    /// The last archive written, if it is still there.
    pub fn zip_path(&self) -> Option<PathBuf> {
        let (dir, name) = (self.dir.as_ref()?, self.file_name.as_ref()?);
        let path = dir.join(name);
        fsutil::is_file_not_dir(&path).then_some(path)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn remember(&mut self, dir: &Path, archive_name: String) {
        self.dir = Some(dir.to_path_buf());
        self.file_name = Some(archive_name);
    }
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn entry_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| FileToolError::Path(format!("ungültiger Dateiname {}", path.display())))
}

/// Archive entry names always use `/`.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn test_zip_file() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("notes.txt");
        fs::write(&src, b"some notes").unwrap();
        let out_dir = temp_dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let mut zipper = Zipper::new();
        let archive_path = zipper.zip_file(&src, &out_dir).unwrap();
        assert_eq!(archive_path, out_dir.join("notes.txt.zip"));
        assert_eq!(zipper.zip_path(), Some(archive_path.clone()));
        assert_eq!(zipper.file_name(), Some("notes.txt.zip"));

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "notes.txt");
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "some notes");
    }

    #[test]
    fn test_zip_file_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut zipper = Zipper::new();
        let err = zipper.zip_file(temp_dir.path(), temp_dir.path()).unwrap_err();
        assert!(matches!(err, FileToolError::IsADirectory(_)));
        assert!(zipper.zip_path().is_none());
    }

    #[test]
    fn test_zip_directory() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("project");
        fs::create_dir_all(src.join("sub/empty")).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        fs::write(src.join("sub/b.txt"), b"b").unwrap();

        let mut zipper = Zipper::new();
        let archive_path = zipper.zip_directory(&src, temp_dir.path()).unwrap();
        assert_eq!(archive_path, temp_dir.path().join("project.zip"));

        let archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "sub/", "sub/b.txt", "sub/empty/"]);
    }

    #[test]
    fn test_zip_directory_into_itself() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("proj");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();

        let archive_path = Zipper::new().zip_directory(&src, &src).unwrap();
        assert_eq!(archive_path, src.join("proj.zip"));

        let archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names, vec!["a.txt"]);

        // a second run finds the old archive on disk and still leaves it out
        let archive_path = Zipper::new().zip_directory(&src, &src).unwrap();
        let archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_zip_directory_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let mut zipper = Zipper::new();
        let err = zipper
            .zip_directory(temp_dir.path(), &temp_dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, FileToolError::TargetMissing { .. }));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        assert_eq!(entry_name(Path::new("a").join("b").join("c.txt").as_path()), "a/b/c.txt");
    }
}
