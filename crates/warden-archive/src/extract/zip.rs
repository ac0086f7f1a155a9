use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use ::zip::ZipArchive;
use ::zip::read::ZipFile;
use ::zip::result::ZipError;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingEntryKind};

/// Entries of a ZIP archive in central-directory order.
///
/// Names are passed through exactly as stored. The zip crate's
/// `enclosed_name` would silently drop hostile names instead of letting the
/// extractor report them.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    index: usize,
}

impl ZipSource<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let open_err = |e| Error::ArchiveOpen {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::open(path).map_err(|e| open_err(ZipError::Io(e)))?;
        let archive = ZipArchive::new(file).map_err(open_err)?;
        Ok(Self { archive, index: 0 })
    }
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(Error::Corrupted)?;
        Ok(Self { archive, index: 0 })
    }

    /// Number of entries in the central directory.
    pub(crate) fn len(&self) -> usize {
        self.archive.len()
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    type Reader<'a>
        = ZipFile<'a, R>
    where
        Self: 'a;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<Self::Reader<'_>>>> {
        if self.index >= self.archive.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;

        let file = match self.archive.by_index(index) {
            Ok(f) => f,
            Err(e) => return Some(Err(Error::Corrupted(e))),
        };

        let name = file.name().to_string();
        let size = file.size();
        let kind = if file.is_dir() {
            PendingEntryKind::Directory
        } else {
            PendingEntryKind::File(file)
        };

        Some(Ok(PendingEntry { name, size, kind }))
    }
}
