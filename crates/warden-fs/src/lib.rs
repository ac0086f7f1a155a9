//! Filesystem primitives used by guarded archive extraction.
//!
//! - `primitives/remove_tree.rs` - Stack-based recursive delete for rollback

mod error;
pub mod primitives;

pub use error::{Error, RemovedKind, Result};
pub use primitives::remove_tree;
