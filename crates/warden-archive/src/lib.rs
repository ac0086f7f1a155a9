//! ZIP extraction that refuses to write outside its target, enforces entry
//! count and extracted size limits, and leaves nothing behind on failure.
//!
//! # Architecture
//!
//! - `sanitize.rs` - Canonical path containment (zip-slip prevention)
//! - `extract/` - Guarded pipeline and the ZIP entry source
//! - `options.rs` - Limits and progress hook
//! - `report.rs` - What a successful unpack wrote
//!
//! Rollback uses [`warden_fs::remove_tree`].

pub use error::{Error, Result};
pub use extract::{
    EntrySource, PendingEntry, PendingEntryKind, ZipSource, unpack, unpack_from_reader,
    unpack_with_options, unpack_with_source,
};
pub use options::{
    DEFAULT_COPY_CHUNK_BYTES, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_EXTRACTED_BYTES, Progress,
    UnpackOptions,
};
pub use report::{UnpackReport, UnpackedEntry};
pub use sanitize::{ContainedPath, contain_entry};

mod error;
pub mod extract;
pub mod options;
mod report;
mod sanitize;
