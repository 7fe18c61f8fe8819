//! Archive creation: ZIP, GZip and tar.gz.

pub mod gzip;
pub mod targz;
pub mod zipper;

pub use zipper::Zipper;
