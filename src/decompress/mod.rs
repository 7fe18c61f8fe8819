//! Archive extraction.

pub mod unzip;

pub use unzip::{EntryOutcome, UnzipReport, Unzipper};
