//! # r_filetools
//!
//! File-system and archive helpers: existence checks, copy/delete/rename,
//! directory creation and removal, content reading and writing, a file
//! logger, ZIP creation and extraction, GZip and tar.gz packing.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use r_filetools::{Unzipper, Zipper};
//!
//! fn main() -> r_filetools::Result<()> {
//!     let mut zipper = Zipper::new();
//!     let archive = zipper.zip_directory(Path::new("reports"), Path::new("/tmp"))?;
//!
//!     let report = Unzipper::new().unzip(&archive, Path::new("/tmp/restore"), "reports")?;
//!     println!("{} entries extracted", report.extracted);
//!     Ok(())
//! }
//! ```

pub mod compress;
pub mod decompress;
pub mod error;
pub mod file_ref;
pub mod fsutil;
pub mod logger;

pub use compress::Zipper;
pub use decompress::{UnzipReport, Unzipper};
pub use error::{FileToolError, Result};
pub use file_ref::FileRef;
pub use logger::FileToolLogger;
