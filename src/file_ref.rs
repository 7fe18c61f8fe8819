use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::fsutil;
use crate::logger::FileToolLogger;

/// A file addressed by folder, name and format, plus the working directory
/// the caller operates in (the user's desktop unless changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    dir: Option<PathBuf>,
    file_name: Option<String>,
    file_format: Option<String>,
    folder_name: Option<String>,
    working_dir: PathBuf,
}

impl Default for FileRef {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRef {
    pub fn new() -> Self {
        Self {
            dir: None,
            file_name: None,
            file_format: None,
            folder_name: None,
            working_dir: fsutil::desktop_dir(),
        }
    }

    pub fn with_file(dir: &Path, file_name: &str) -> Self {
        let mut file_ref = Self::new();
        file_ref.set_dir(dir);
        file_ref.set_file_name(file_name);
        file_ref
    }

    pub fn with_format(dir: &Path, file_name: &str, file_format: &str) -> Self {
        let mut file_ref = Self::with_file(dir, file_name);
        file_ref.set_file_format(file_format);
        file_ref
    }

    pub fn start_logger(&self) -> Result<()> {
        FileToolLogger::init_for("FileRef", false)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Ignored unless `dir` is an existing directory.
    pub fn set_dir(&mut self, dir: &Path) {
        if fsutil::is_dir_and_exists(dir) {
            self.folder_name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            self.dir = Some(dir.to_path_buf());
        } else {
            debug!("Ignoring {} as file folder, not a directory", dir.display());
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: &Path) {
        if fsutil::exists(dir) {
            self.working_dir = dir.to_path_buf();
        }
    }

    pub fn folder_name(&self) -> Option<&str> {
        self.folder_name.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: &str) {
        self.file_name = Some(file_name.to_string());
    }

    pub fn set_file_name_from_path(&mut self, path: &Path) {
        if fsutil::is_file_not_dir(path) {
            self.file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
        }
    }

    pub fn file_format(&self) -> Option<&str> {
        self.file_format.as_deref()
    }

    pub fn set_file_format(&mut self, file_format: &str) {
        self.file_format = Some(file_format.to_string());
    }

    pub fn full_path(&self) -> Option<PathBuf> {
        match (&self.dir, &self.file_name) {
            (Some(dir), Some(name)) => Some(dir.join(name)),
            _ => None,
        }
    }

    pub fn exists(&self) -> bool {
        self.full_path()
            .map(|p| fsutil::exists(&p))
            .unwrap_or(false)
    }
}
