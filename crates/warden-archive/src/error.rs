use std::io;
use std::path::PathBuf;

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreation { path: PathBuf, source: io::Error },

    #[error("failed to open archive: {path}: {source}")]
    ArchiveOpen { path: PathBuf, source: ZipError },

    #[error("potential path traversal attack: entry '{entry}' resolves to '{resolved}'")]
    PathTraversal { entry: String, resolved: PathBuf },

    #[error("exceeded the maximum extracted size limit of {limit} bytes, it might be a zip bomb")]
    SizeLimitExceeded { limit: u64 },

    #[error("too many entries to unpack (limit {limit}), it might be a zip bomb")]
    TooManyEntries { limit: usize },

    #[error("cleanup after failed unpack did not finish ({cause}): {source}")]
    Cleanup {
        cause: Box<Error>,
        source: warden_fs::Error,
    },

    #[error("archive is corrupted: {0}")]
    Corrupted(#[source] ZipError),

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The error that made the unpack fail in the first place.
    ///
    /// For [`Error::Cleanup`] this is the wrapped cause, otherwise `self`.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Cleanup { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Whether the archive tripped one of the zip-bomb limits.
    pub fn is_limit_violation(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::SizeLimitExceeded { .. } | Self::TooManyEntries { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_keeps_original_cause() {
        let err = Error::Cleanup {
            cause: Box::new(Error::TooManyEntries { limit: 3 }),
            source: warden_fs::Error::Read {
                path: PathBuf::from("/tmp/out"),
                source: io::Error::other("denied"),
            },
        };
        assert!(matches!(err.root_cause(), Error::TooManyEntries { limit: 3 }));
        assert!(err.is_limit_violation());
        assert!(err.to_string().contains("it might be a zip bomb"));
    }

    #[test]
    fn traversal_message_names_entry() {
        let err = Error::PathTraversal {
            entry: "../evil.txt".into(),
            resolved: PathBuf::from("/tmp/evil.txt"),
        };
        let message = err.to_string();
        assert!(message.contains("potential path traversal attack"));
        assert!(message.contains("../evil.txt"));
        assert!(!err.is_limit_violation());
    }
}
