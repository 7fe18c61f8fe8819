use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{FileToolError, Result};
use crate::fsutil;

/// Entries below this folder are resource forks written by macOS archivers.
const MACOS_JUNK_MARKER: &str = "__macosx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Extracted,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnzipReport {
    pub folder: PathBuf,
    pub extracted: usize,
    pub skipped: usize,
}

/// Extracts `.zip` archives into a folder named after the archive.
#[derive(Debug, Default, Clone)]
pub struct Unzipper {
    zip_file: Option<PathBuf>,
    folder_name: Option<String>,
}

impl Unzipper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zip_file(&self) -> Option<&Path> {
        self.zip_file.as_deref()
    }

    pub fn zip_file_name(&self) -> Option<&str> {
        self.zip_file
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
    }

    pub fn folder_name(&self) -> Option<&str> {
        self.folder_name.as_deref()
    }

    /// Remembers `dir/name` as the archive, only if it exists.
    pub fn set_zip_file(&mut self, dir: &Path, name: &str) {
        let path = dir.join(name);
        if path.exists() {
            self.zip_file = Some(path);
        }
    }

    /// Prepares the output folder next to the archive: creates it when it is
    /// missing, clears it away when it is already there.
    pub fn create_zip_folder(&mut self, dir: &Path, name: &str) -> Result<()> {
        self.set_zip_file(dir, name);
        let Some(zip_file) = self.zip_file.clone() else {
            warn!("No archive {} in {}", name, dir.display());
            return Ok(());
        };

        let folder_name = folder_name_of(&zip_file)?;
        let parent = zip_file.parent().unwrap_or(dir).to_path_buf();
        let folder = parent.join(&folder_name);
        self.folder_name = Some(folder_name.clone());

        if !folder.exists() {
            fs::create_dir(&folder)?;
            info!("{} created in {}", folder_name, parent.display());
        } else {
            info!("{} already exists in {}", folder_name, parent.display());
            Self::delete_folder(&parent, &folder_name)?;
            info!("{} deleted", folder_name);
        }
        Ok(())
    }

    /// Extracts `zip` into `target_dir/folder_name`, skipping macOS junk.
    pub fn unzip(&self, zip: &Path, target_dir: &Path, folder_name: &str) -> Result<UnzipReport> {
        let output_folder = target_dir.join(folder_name);
        if !output_folder.exists() {
            fs::create_dir_all(&output_folder)?;
        }

        let file = File::open(zip)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        info!(
            "Extracting {} into {} ({} entries)",
            zip.display(),
            output_folder.display(),
            archive.len()
        );

        let mut report = UnzipReport {
            folder: output_folder.clone(),
            extracted: 0,
            skipped: 0,
        };
        for index in 0..archive.len() {
            match extract_entry(&mut archive, index, &output_folder)? {
                EntryOutcome::Extracted => report.extracted += 1,
                EntryOutcome::Skipped => report.skipped += 1,
            }
        }

        info!(
            "Done extracting {}: {} extracted, {} skipped",
            zip.display(),
            report.extracted,
            report.skipped
        );
        Ok(report)
    }

    pub fn delete_file(parent: &Path, name: &str) -> Result<bool> {
        fsutil::remove_file_in(parent, name)
    }

    /// Deletes `parent/name` with everything in it.
    pub fn delete_folder(parent: &Path, name: &str) -> Result<()> {
        let folder = parent.join(name);
        while folder.exists() {
            if !fsutil::remove_dir_recursive(&folder)? {
                return Err(FileToolError::CannotDelete(folder.display().to_string()));
            }
        }
        Ok(())
    }
}

/// Writes one archive entry below `dest_root`.
pub fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    dest_root: &Path,
) -> Result<EntryOutcome> {
    let mut entry = archive.by_index(index)?;
    let name = entry.name().to_string();

    if is_junk_entry(&name) {
        debug!("Skipping {}", name);
        return Ok(EntryOutcome::Skipped);
    }
    debug!("Extracting {}", name);

    let relative = entry
        .enclosed_name()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| FileToolError::Path(format!("unsicherer Archiveintrag {}", name)))?;
    let output_path = dest_root.join(relative);

    if entry.is_dir() {
        fs::create_dir_all(&output_path)?;
    } else {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&output_path)?);
        fsutil::move_stream_data(&mut entry, &mut writer)?;
        writer.flush()?;
    }
    Ok(EntryOutcome::Extracted)
}

pub fn is_junk_entry(name: &str) -> bool {
    name.to_lowercase().contains(MACOS_JUNK_MARKER)
}

/// Archive file name up to the first `.zip`.
pub fn folder_name_of(zip_file: &Path) -> Result<String> {
    let file_name = zip_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FileToolError::Path(format!("ungültiger Dateiname {}", zip_file.display())))?;
    file_name
        .find(".zip")
        .map(|idx| file_name[..idx].to_string())
        .ok_or_else(|| FileToolError::Path(format!("{} ist keine Zip-Datei", file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_archive(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            match content {
                Some(data) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(data).unwrap();
                }
                None => zip.add_directory(*name, options).unwrap(),
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_is_junk_entry() {
        assert!(is_junk_entry("__MACOSX/._a.txt"));
        assert!(is_junk_entry("docs/__macosx/x"));
        assert!(!is_junk_entry("docs/macos.txt"));
    }

    #[test]
    fn test_folder_name_of() {
        assert_eq!(folder_name_of(Path::new("/tmp/backup.zip")).unwrap(), "backup");
        assert_eq!(folder_name_of(Path::new("a.zip.zip")).unwrap(), "a");
        assert!(folder_name_of(Path::new("/tmp/backup.tar")).is_err());
    }

    #[test]
    fn test_unzip_skips_junk_and_creates_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("bundle.zip");
        write_archive(
            &zip_path,
            &[
                ("docs/", None),
                ("docs/readme.txt", Some(b"read me".as_slice())),
                ("deep/nested/data.bin", Some([0u8, 1, 2].as_slice())),
                ("__MACOSX/docs/._readme.txt", Some(b"junk".as_slice())),
            ],
        );

        let report = Unzipper::new()
            .unzip(&zip_path, temp_dir.path(), "bundle")
            .unwrap();
        let out = temp_dir.path().join("bundle");
        assert_eq!(report.folder, out);
        assert_eq!(report.extracted, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(fs::read(out.join("docs/readme.txt")).unwrap(), b"read me");
        assert_eq!(fs::read(out.join("deep/nested/data.bin")).unwrap(), vec![0u8, 1, 2]);
        assert!(!out.join("__MACOSX").exists());
    }

    #[test]
    fn test_extract_entry_refuses_escaping_names() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buf);
            zip.start_file("../evil.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"x").unwrap();
            zip.finish().unwrap();
        }
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        let mut archive = ZipArchive::new(buf).unwrap();
        let err = extract_entry(&mut archive, 0, &dest).unwrap_err();
        assert!(matches!(err, FileToolError::Path(_)));
        assert!(!temp_dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_unzip_refuses_absolute_names() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("abs.zip");
        write_archive(
            &zip_path,
            &[
                ("ok.txt", Some(b"ok".as_slice())),
                ("/abs/evil.txt", Some(b"x".as_slice())),
            ],
        );

        let err = Unzipper::new()
            .unzip(&zip_path, temp_dir.path(), "abs")
            .unwrap_err();
        assert!(matches!(err, FileToolError::Path(_)));
        assert!(!Path::new("/abs/evil.txt").exists());
        assert!(!temp_dir.path().join("abs/abs/evil.txt").exists());
    }

    #[test]
    fn test_create_zip_folder() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("photos.zip");
        write_archive(&zip_path, &[("a.txt", Some(b"a".as_slice()))]);

        let mut unzipper = Unzipper::new();
        unzipper.create_zip_folder(temp_dir.path(), "photos.zip").unwrap();
        assert_eq!(unzipper.zip_file(), Some(zip_path.as_path()));
        assert_eq!(unzipper.zip_file_name(), Some("photos.zip"));
        assert_eq!(unzipper.folder_name(), Some("photos"));
        assert!(temp_dir.path().join("photos").is_dir());

        fs::write(temp_dir.path().join("photos/old.txt"), b"old").unwrap();
        unzipper.create_zip_folder(temp_dir.path(), "photos.zip").unwrap();
        assert!(!temp_dir.path().join("photos").exists());
    }

    #[test]
    fn test_set_zip_file_ignores_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut unzipper = Unzipper::new();
        unzipper.set_zip_file(temp_dir.path(), "missing.zip");
        assert!(unzipper.zip_file().is_none());
        unzipper.create_zip_folder(temp_dir.path(), "missing.zip").unwrap();
        assert!(unzipper.folder_name().is_none());
    }

    #[test]
    fn test_delete_helpers() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("f/g")).unwrap();
        fs::write(temp_dir.path().join("f/g/h.txt"), b"h").unwrap();
        fs::write(temp_dir.path().join("single.txt"), b"s").unwrap();

        assert!(Unzipper::delete_file(temp_dir.path(), "single.txt").unwrap());
        assert!(!Unzipper::delete_file(temp_dir.path(), "single.txt").unwrap());
        Unzipper::delete_folder(temp_dir.path(), "f").unwrap();
        assert!(!temp_dir.path().join("f").exists());
        Unzipper::delete_folder(temp_dir.path(), "f").unwrap();
    }
}
