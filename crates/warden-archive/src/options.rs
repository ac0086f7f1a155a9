use std::path::PathBuf;
use std::sync::Arc;

/// Default abort threshold for the number of processed entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default abort threshold for cumulative extracted bytes (1 GiB).
pub const DEFAULT_MAX_EXTRACTED_BYTES: u64 = 1024 * 1024 * 1024;

/// Default buffer size for the streaming copy.
pub const DEFAULT_COPY_CHUNK_BYTES: usize = 8192;

/// Limits and hooks for one unpack call.
#[derive(Clone)]
pub struct UnpackOptions {
    pub max_entries: usize,
    pub max_extracted_bytes: u64,
    pub copy_chunk_bytes: usize,
    pub on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

/// Snapshot reported after each entry is written.
#[derive(Clone, Debug)]
pub struct Progress {
    pub entries_processed: usize,
    pub bytes_written: u64,
    pub current_entry: PathBuf,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_extracted_bytes: DEFAULT_MAX_EXTRACTED_BYTES,
            copy_chunk_bytes: DEFAULT_COPY_CHUNK_BYTES,
            on_progress: None,
        }
    }
}

impl std::fmt::Debug for UnpackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnpackOptions")
            .field("max_entries", &self.max_entries)
            .field("max_extracted_bytes", &self.max_extracted_bytes)
            .field("copy_chunk_bytes", &self.copy_chunk_bytes)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl UnpackOptions {
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    pub fn max_extracted_bytes(mut self, bytes: u64) -> Self {
        self.max_extracted_bytes = bytes;
        self
    }

    /// Values below one are treated as one.
    pub fn copy_chunk_bytes(mut self, bytes: usize) -> Self {
        self.copy_chunk_bytes = bytes;
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn chunk_len(&self) -> usize {
        self.copy_chunk_bytes.max(1)
    }

    pub(crate) fn report(&self, progress: impl FnOnce() -> Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(progress());
        }
    }
}
