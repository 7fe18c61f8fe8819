use std::path::Path;
use std::fs;
use tar::{Builder, Archive};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use log::{debug, info};
use walkdir::WalkDir;

use crate::compress::gzip::is_gzip;
use crate::error::{FileToolError, Result};

/// tar.gz of every file below `src_path`, stored under relative names.
pub fn pack_dir(src_path: &Path) -> Result<Vec<u8>> {
    if !src_path.is_dir() {
        return Err(FileToolError::NotADirectory(src_path.display().to_string()));
    }

    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(enc);

    for entry in WalkDir::new(src_path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let name = entry.path().strip_prefix(src_path)?;
            debug!("Packing {}", name.display());
            builder.append_path_with_name(entry.path(), name)?;
        }
    }

    let archive_data = builder.into_inner()?.finish()?;
    info!("Packed {} ({} bytes)", src_path.display(), archive_data.len());
    Ok(archive_data)
}

/// Unpacks gzip'ed tar data into `dest_path`; anything else is written to
/// `dest_path` as is.
pub fn unpack(data: &[u8], dest_path: &Path) -> Result<()> {
    if is_gzip(data) {
        let decoder = GzDecoder::new(data);
        let mut archive = Archive::new(decoder);
        fs::create_dir_all(dest_path)?;
        archive
            .unpack(dest_path)
            .map_err(|e| FileToolError::Archive(e.to_string()))?;
        info!("Unpacked archive into {}", dest_path.display());
    } else {
        fs::write(dest_path, data)?;
        info!("Data is not gzip'ed, wrote {} bytes to {}", data.len(), dest_path.display());
    }
    Ok(())
}

pub fn pack_dir_to_file(src_path: &Path, archive_path: &Path) -> Result<()> {
    let data = pack_dir(src_path)?;
    fs::write(archive_path, data)?;
    Ok(())
}

pub fn unpack_file(archive_path: &Path, dest_path: &Path) -> Result<()> {
    let data = fs::read(archive_path)?;
    unpack(&data, dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pack_and_unpack() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();
        fs::write(src.join("nested/b.txt"), b"beta").unwrap();

        let data = pack_dir(&src).unwrap();
        assert!(is_gzip(&data));

        let dest = temp_dir.path().join("dest");
        unpack(&data, &dest).unwrap();
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("nested/b.txt")).unwrap(), b"beta");
    }

    #[test]
    fn test_unpack_plain_data_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("plain.bin");
        unpack(b"not an archive", &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"not an archive");
    }

    #[test]
    fn test_pack_dir_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"a").unwrap();
        assert!(matches!(pack_dir(&file), Err(FileToolError::NotADirectory(_))));
    }
}
