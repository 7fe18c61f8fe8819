use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use log::{debug, info};

use crate::error::{FileToolError, Result};
use crate::fsutil;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Encodes `data` in `charset` and gzips it.
pub fn compress(data: &str, charset: &str) -> Result<Vec<u8>> {
    let encoding = fsutil::encoding_for(charset)?;
    let bytes = fsutil::encode_text(data, encoding)?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len()), Compression::default());
    encoder.write_all(&bytes)?;
    let compressed = encoder.finish()?;
    debug!("Compressed {} bytes to {}", bytes.len(), compressed.len());
    Ok(compressed)
}

pub fn decompress(compressed: &[u8], charset: &str) -> Result<String> {
    let encoding = fsutil::encoding_for(charset)?;
    if !is_gzip(compressed) {
        return Err(FileToolError::Archive("keine GZip-Daten".to_string()));
    }

    let mut raw = Vec::new();
    GzDecoder::new(compressed).read_to_end(&mut raw)?;

    let (text, _, had_errors) = encoding.decode(&raw);
    if had_errors {
        return Err(FileToolError::Decode(encoding.name().to_string()));
    }
    Ok(text.into_owned())
}

pub fn compress_file(src: &Path, dest: &Path) -> Result<u64> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(dest)?), Compression::default());
    let moved = fsutil::move_stream_data(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    info!("Gzipped {} -> {} ({} bytes)", src.display(), dest.display(), moved);
    Ok(moved)
}

pub fn decompress_file(src: &Path, dest: &Path) -> Result<u64> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(src)?));
    let mut writer = BufWriter::new(File::create(dest)?);
    let moved = fsutil::move_stream_data(&mut decoder, &mut writer)?;
    writer.flush()?;
    info!("Gunzipped {} -> {} ({} bytes)", src.display(), dest.display(), moved);
    Ok(moved)
}
