//! File-system helpers: existence checks, creation, deletion, copy and
//! content access on top of `std::fs`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use image::DynamicImage;
use log::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::error::{FileToolError, Result};

/// Buffer size used when moving data between streams.
pub const COPY_BUFFER_LEN: usize = 2000;

const FILE_SCHEME: &str = "file:///";

pub fn exists(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.exists()
}

/// `true` only if `dir` is an existing directory that contains `name`.
pub fn exists_in(dir: &Path, name: &str) -> bool {
    !name.is_empty() && is_dir_and_exists(dir) && dir.join(name).exists()
}

pub fn is_file_not_dir(path: &Path) -> bool {
    exists(path) && !path.is_dir()
}

pub fn is_dir_and_exists(path: &Path) -> bool {
    exists(path) && path.is_dir()
}

/// Plain suffix check on the file name, the suffix includes the dot.
pub fn has_extension(file_name: &str, suffix: &str) -> bool {
    !file_name.is_empty() && !suffix.is_empty() && file_name.ends_with(suffix)
}

pub fn is_pdf(file_name: &str) -> bool {
    has_extension(file_name, ".pdf")
}

pub fn is_xml(file_name: &str) -> bool {
    has_extension(file_name, ".xml")
}

/// Returns `path` with a trailing `/` when it names an existing directory,
/// otherwise an empty string.
pub fn valid_folder_path(path: &Path) -> String {
    if !is_dir_and_exists(path) {
        return String::new();
    }
    let folder = path.to_string_lossy();
    if folder.ends_with('/') {
        folder.into_owned()
    } else {
        format!("{}/", folder)
    }
}

pub fn valid_folder_uri(path: &Path, scheme: &str) -> String {
    let folder = valid_folder_path(path);
    if scheme.eq_ignore_ascii_case(FILE_SCHEME) {
        file_scheme_uri(&folder)
    } else {
        folder
    }
}

pub fn file_scheme_uri(path: &str) -> String {
    if path.starts_with(FILE_SCHEME) {
        return path.to_string();
    }
    let stripped = path.strip_prefix('/').unwrap_or(path);
    format!("{}{}", FILE_SCHEME, stripped)
}

pub fn parent_dir_of(path: &Path) -> Option<PathBuf> {
    if !exists(path) {
        return None;
    }
    path.canonicalize()
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}

pub fn desktop_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Desktop")
}

/// Directory that holds the running executable.
pub fn execution_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| FileToolError::Path(format!("kein Elternverzeichnis für {}", exe.display())))
}

/// Creates an empty file at `path`, replacing an existing file.
pub fn create_file(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        if path.is_dir() {
            return Err(FileToolError::IsADirectory(path.display().to_string()));
        }
        fs::remove_file(path)?;
    }
    File::create(path)?;
    trace!("Created empty file {}", path.display());
    Ok(path.to_path_buf())
}

/// Creates an empty file or, with `as_dir`, an empty directory at `path`.
/// Whatever was there before is removed first.
pub fn create_file_or_dir(path: &Path, as_dir: bool) -> Result<PathBuf> {
    if !path.exists() {
        if as_dir {
            fs::create_dir_all(path)?;
        } else {
            create_file(path)?;
        }
        return Ok(path.to_path_buf());
    }

    if is_file_not_dir(path) {
        fs::remove_file(path)
            .map_err(|_| FileToolError::CannotDelete(path.display().to_string()))?;
        if !as_dir {
            File::create(path)?;
        }
    }

    if as_dir {
        if path.exists() && !remove_dir_recursive(path)? {
            return Err(FileToolError::CannotDelete(path.display().to_string()));
        }
        fs::create_dir_all(path)?;
    }

    Ok(path.to_path_buf())
}

/// Creates an empty `name` inside `dir`. Returns `None` if `dir` is not a
/// directory or `name` is empty.
pub fn create_file_in(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    if name.is_empty() || !is_dir_and_exists(dir) {
        return Ok(None);
    }
    let path = dir.join(name);
    if is_file_not_dir(&path) {
        fs::remove_file(&path)?;
    }
    File::create(&path).map_err(|e| FileToolError::CannotCreate {
        name: name.to_string(),
        dir: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(path))
}

/// Creates the directory tree unless a directory is already there.
pub fn create_dir(path: &Path) -> Result<bool> {
    if is_dir_and_exists(path) {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    debug!("Created directory {}", path.display());
    Ok(true)
}

/// Deletes a file (or an empty directory). `false` when nothing was there.
/// A symlink is removed itself, never its target.
pub fn remove_file(path: &Path) -> Result<bool> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(false);
    };
    if metadata.is_dir() {
        fs::remove_dir(path)?;
    } else {
        fs::remove_file(path)?;
    }
    debug!("Removed {}", path.display());
    Ok(true)
}

pub fn remove_file_in(dir: &Path, name: &str) -> Result<bool> {
    if name.is_empty() {
        return Ok(false);
    }
    remove_file(&dir.join(name))
}

pub fn delete_if_exists(dir: &Path, name: &str) -> Result<bool> {
    if name.is_empty() || !is_dir_and_exists(dir) {
        return Ok(false);
    }
    match fs::remove_file(dir.join(name)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Deletes everything below `path` depth-first, then `path` itself.
/// Returns whether the final delete succeeded.
pub fn remove_dir_recursive(path: &Path) -> Result<bool> {
    if !exists(path) {
        return Ok(false);
    }
    if !is_real_dir(path) {
        return remove_file(path);
    }

    for entry in WalkDir::new(path).min_depth(1).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())?;
            debug!("Deleted folder {}", entry.path().display());
        } else {
            fs::remove_file(entry.path())?;
            debug!("Deleted file {}", entry.path().display());
        }
    }

    match fs::remove_dir(path) {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!("Could not delete {}: {}", path.display(), e);
            Ok(false)
        }
    }
}

/// Directory check that does not follow symlinks.
pub fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}

pub fn rename(dir: &Path, name: &str, new_name: &str) -> Result<bool> {
    if !exists_in(dir, name) || new_name.is_empty() {
        return Ok(false);
    }
    fs::rename(dir.join(name), dir.join(new_name))?;
    info!("Renamed {} to {} in {}", name, new_name, dir.display());
    Ok(true)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| FileToolError::NoContent(format!("{}: {}", path.display(), e)))
}

/// Content of `dir/name`, or an empty buffer when there is no such file.
pub fn read_bytes_in(dir: &Path, name: &str) -> Result<Vec<u8>> {
    if !exists_in(dir, name) {
        return Ok(Vec::new());
    }
    let path = dir.join(name);
    if !is_file_not_dir(&path) {
        return Ok(Vec::new());
    }
    read_bytes(&path)
}

pub fn read_to_string(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes).map_err(|_| FileToolError::Decode("UTF-8".to_string()))
}

/// Loads and decodes the picture `dir/name` (PNG, JPEG, GIF or BMP).
pub fn load_image(dir: &Path, name: &str) -> Result<DynamicImage> {
    let path = dir.join(name);
    if name.is_empty() || !is_file_not_dir(&path) {
        return Err(FileToolError::NotFound(path.display().to_string()));
    }
    let picture = image::open(&path)
        .map_err(|e| FileToolError::NoContent(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded picture {} ({}x{})", path.display(), picture.width(), picture.height());
    Ok(picture)
}

pub fn read_stream<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    move_stream_data(reader, &mut content)?;
    Ok(content)
}

/// Copies `reader` into `writer` until EOF, returns the number of bytes moved.
pub fn move_stream_data<R, W>(reader: &mut R, writer: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; COPY_BUFFER_LEN];
    let mut total = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    Ok(total)
}

/// Looks up an `encoding_rs` encoding by its WHATWG label.
pub fn encoding_for(charset: &str) -> Result<&'static Encoding> {
    Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| FileToolError::Encoding(charset.to_string()))
}

/// Encodes `text` in `encoding`. UTF-16 is written without a byte order
/// mark; encodings that can only decode are an `Encoding` error.
pub fn encode_text(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }
    if encoding.output_encoding() != encoding {
        return Err(FileToolError::Encoding(format!(
            "{} kann nicht geschrieben werden",
            encoding.name()
        )));
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        warn!("Some characters are not representable in {}", encoding.name());
    }
    Ok(bytes.into_owned())
}

/// Writes UTF-8 text into an existing file. Returns `false` without touching
/// anything when there is no content or no file.
pub fn write_to_file(path: &Path, content: Option<&str>, append: bool) -> Result<bool> {
    let Some(content) = content else {
        warn!("No content to write into {}", path.display());
        return Ok(false);
    };
    if !is_file_not_dir(path) {
        info!("There is no file at {} that could be written", path.display());
        return Ok(false);
    }
    write_bytes(path, content.as_bytes(), append)?;
    Ok(true)
}

pub fn write_to_file_encoded(
    path: &Path,
    content: Option<&str>,
    charset: &str,
    append: bool,
) -> Result<bool> {
    let content = content.ok_or(FileToolError::EmptyContent)?;
    let encoding = encoding_for(charset)?;
    if !is_file_not_dir(path) {
        info!("There is no file at {} that could be written", path.display());
        return Ok(false);
    }

    let bytes = encode_text(content, encoding)?;
    write_bytes(path, &bytes, append)?;
    Ok(true)
}

fn write_bytes(path: &Path, bytes: &[u8], append: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

/// Copies `file` into `target_dir`, replacing a file of the same name.
pub fn copy_file_into(target_dir: &Path, file: &Path) -> Result<()> {
    if !exists(target_dir) || !exists(file) {
        return Err(FileToolError::TargetMissing {
            target: target_dir.display().to_string(),
            file: file.display().to_string(),
        });
    }
    if file.is_dir() {
        return Err(FileToolError::IsADirectory(file.display().to_string()));
    }
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FileToolError::Path(format!("ungültiger Dateiname {}", file.display())))?;

    let dest = target_dir.join(name);
    if exists(&dest) {
        if same_file(file, &dest) {
            debug!("{} already is in {}", name, target_dir.display());
            return Ok(());
        }
        remove_file(&dest)?;
    }

    copy_content(file, target_dir, name).map_err(|e| FileToolError::CopyFailed {
        name: name.to_string(),
        target: target_dir.display().to_string(),
        reason: e.to_string(),
    })?;
    info!("Copied {} into {}", file.display(), target_dir.display());
    Ok(())
}

/// Copies `src_dir/name` into `target_dir`. Does nothing when the source is
/// missing or the target is not a directory.
pub fn copy_file_from(target_dir: &Path, src_dir: &Path, name: &str) -> Result<()> {
    if !exists(target_dir) || name.is_empty() {
        return Err(FileToolError::TargetMissing {
            target: target_dir.display().to_string(),
            file: src_dir.join(name).display().to_string(),
        });
    }
    if !exists_in(src_dir, name) || !is_dir_and_exists(target_dir) {
        debug!("Nothing to copy for {} from {}", name, src_dir.display());
        return Ok(());
    }
    copy_file_into(target_dir, &src_dir.join(name))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_content(file: &Path, target_dir: &Path, name: &str) -> Result<u64> {
    let dest = create_file_in(target_dir, name)?
        .ok_or_else(|| FileToolError::NotADirectory(target_dir.display().to_string()))?;
    let mut reader = File::open(file)?;
    let mut writer = BufWriter::new(File::create(dest)?);
    let copied = move_stream_data(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(copied)
}
