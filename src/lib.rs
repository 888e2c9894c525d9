//! # `lspk`
//!
//! A pure-Rust library for reading and writing LSPK archives, the asset
//! package format used by a family of Larian-style RPG titles.
//!
//! ## Supported versions
//!
//! | On-disk version | Reader | Writer |
//! |---|---|---|
//! | 7, 9 | yes (V9 layout) | no |
//! | 10 | yes | yes, single-part, always uncompressed |
//! | 13 | yes | yes, single-part or multi-part |
//! | 15, 16 | yes (untested, logs a warning) | no |
//! | 18 | yes | yes, single-part |
//!
//! ## Quick start
//!
//! ```no_run
//! use lspk::Package;
//!
//! let package = Package::read("Shared.pak")?;
//! println!("{} files, version {}", package.files.len(), package.version);
//!
//! let data = package.extract("Public/Shared/meta.lsx")?;
//! package.extract_all("output/")?;
//! # Ok::<(), lspk::Error>(())
//! ```
//!
//! ```no_run
//! use lspk::WriterV13;
//!
//! let mut writer = WriterV13::new("Mod.pak", None);
//! writer.add_file("meta.lsx", b"<save/>".to_vec(), true)?;
//! writer.save()?;
//! # Ok::<(), lspk::Error>(())
//! ```

mod binary;
mod detect;
mod entry;
mod error;
mod lz4;
mod package;
mod pending;
mod versions;

pub use detect::{detect, DetectionResult, SignatureLocation};
pub use entry::FileEntry;
pub use error::{Error, Result};
pub use package::Package;
pub use pending::PendingFile;
pub use versions::{WriterV10, WriterV13, WriterV18};
