use std::path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct UnpackReport {
    pub entry_count: usize,
    pub total_bytes: u64,
    pub entries: Vec<UnpackedEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpackedEntry {
    /// Entry name exactly as stored in the archive.
    pub name: String,
    pub target_path: PathBuf,
    /// Bytes written to disk for this entry; zero for directories.
    pub size: u64,
    pub is_directory: bool,
}

impl UnpackReport {
    pub fn files(&self) -> impl Iterator<Item = &UnpackedEntry> {
        self.entries.iter().filter(|e| !e.is_directory)
    }

    pub fn directories(&self) -> impl Iterator<Item = &UnpackedEntry> {
        self.entries.iter().filter(|e| e.is_directory)
    }
}
