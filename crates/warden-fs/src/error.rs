use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to list directory: {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to delete {kind}: {path}: {source}")]
    Remove {
        kind: RemovedKind,
        path: PathBuf,
        source: io::Error,
    },
}

impl Error {
    /// Path the failing operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Remove { path, .. } => path,
        }
    }
}

/// What a failed removal was trying to delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovedKind {
    File,
    Directory,
}

impl std::fmt::Display for RemovedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
