//! Guarded extraction pipeline.
//!
//! Every entry goes through the same steps: path containment, directory or
//! file materialization with a running byte budget, then the entry-count
//! check. Any error after the target directory exists rolls the target back
//! with [`warden_fs::remove_tree`] and returns the error that caused it.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use warden_fs::remove_tree;

use crate::error::{Error, Result};
use crate::options::{Progress, UnpackOptions};
use crate::report::{UnpackReport, UnpackedEntry};
use crate::sanitize::contain_entry;

mod zip;

pub use self::zip::ZipSource;

/// An entry read from the archive but not yet written.
pub struct PendingEntry<R> {
    /// Raw entry name; attacker controlled.
    pub name: String,
    /// Size declared by the archive. Informational only, never trusted.
    pub size: u64,
    pub kind: PendingEntryKind<R>,
}

pub enum PendingEntryKind<R> {
    Directory,
    File(R),
}

/// Produces archive entries one at a time, in archive order.
///
/// The reader of a returned entry may borrow the source, so only one entry
/// can be alive at a time.
pub trait EntrySource {
    type Reader<'a>: Read
    where
        Self: 'a;

    fn next_entry(&mut self) -> Option<Result<PendingEntry<Self::Reader<'_>>>>;
}

/// Counters for a single unpack call.
#[derive(Debug, Default)]
struct ExtractionState {
    files_processed: usize,
    total_bytes_written: u64,
}

impl ExtractionState {
    fn record_bytes(&mut self, n: u64, limit: u64) -> Result<()> {
        self.total_bytes_written = self.total_bytes_written.saturating_add(n);
        if self.total_bytes_written > limit {
            return Err(Error::SizeLimitExceeded { limit });
        }
        Ok(())
    }

    fn record_entry(&mut self, limit: usize) -> Result<()> {
        self.files_processed += 1;
        if self.files_processed > limit {
            return Err(Error::TooManyEntries { limit });
        }
        Ok(())
    }
}

/// Unpack the ZIP archive at `archive` into `target` with default limits.
///
/// `target` is created if missing. On failure it is removed again and the
/// triggering error is returned.
pub fn unpack(archive: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
    unpack_with_options(archive, target, &UnpackOptions::default()).map(|_| ())
}

/// Unpack the ZIP archive at `archive` into `target`.
pub fn unpack_with_options(
    archive: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: &UnpackOptions,
) -> Result<UnpackReport> {
    let archive = archive.as_ref();
    let target = target.as_ref();

    prepare_target(target)?;
    // The source lives only inside the closure, so the archive handle is
    // closed before any rollback starts.
    let outcome = ZipSource::open(archive).and_then(|mut source| {
        debug!(archive = %archive.display(), entries = source.len(), "archive opened");
        extract_entries(&mut source, target, options)
    });
    finish(target, outcome)
}

/// Unpack a ZIP archive from an open reader.
pub fn unpack_from_reader<R: Read + Seek>(
    reader: R,
    target: impl AsRef<Path>,
    options: &UnpackOptions,
) -> Result<UnpackReport> {
    let target = target.as_ref();

    prepare_target(target)?;
    let outcome = ZipSource::new(reader).and_then(|mut source| {
        debug!(entries = source.len(), "archive opened");
        extract_entries(&mut source, target, options)
    });
    finish(target, outcome)
}

/// Unpack entries from any [`EntrySource`].
pub fn unpack_with_source<S: EntrySource>(
    source: &mut S,
    target: impl AsRef<Path>,
    options: &UnpackOptions,
) -> Result<UnpackReport> {
    let target = target.as_ref();

    prepare_target(target)?;
    let outcome = extract_entries(source, target, options);
    finish(target, outcome)
}

fn prepare_target(target: &Path) -> Result<()> {
    ensure_directory(target)
}

fn finish(target: &Path, outcome: Result<UnpackReport>) -> Result<UnpackReport> {
    let cause = match outcome {
        Ok(report) => {
            info!(
                target = %target.display(),
                entries = report.entry_count,
                bytes = report.total_bytes,
                "unpack finished"
            );
            return Ok(report);
        }
        Err(e) => e,
    };

    warn!(
        target = %target.display(),
        error = %cause,
        limit_violation = cause.is_limit_violation(),
        "unpack failed, removing extracted files"
    );
    match remove_tree(target) {
        Ok(()) => Err(cause),
        Err(source) => {
            error!(
                target = %target.display(),
                path = %source.path().display(),
                error = %source,
                "rollback did not finish"
            );
            Err(Error::Cleanup {
                cause: Box::new(cause),
                source,
            })
        }
    }
}

fn extract_entries<S: EntrySource>(
    source: &mut S,
    target: &Path,
    options: &UnpackOptions,
) -> Result<UnpackReport> {
    let mut state = ExtractionState::default();
    let mut entries = Vec::new();
    let mut buffer = vec![0u8; options.chunk_len()];

    while let Some(pending) = source.next_entry() {
        let pending = pending?;
        let contained = contain_entry(&pending.name, target)?;

        let (size, is_directory) = match pending.kind {
            PendingEntryKind::Directory => {
                ensure_directory(&contained.resolved)?;
                (0, true)
            }
            PendingEntryKind::File(mut reader) => {
                if let Some(parent) = contained.resolved.parent() {
                    ensure_directory(parent)?;
                }
                let written = write_file(
                    &mut reader,
                    &contained.resolved,
                    &mut buffer,
                    &mut state,
                    options.max_extracted_bytes,
                )?;
                (written, false)
            }
        };

        state.record_entry(options.max_entries)?;
        debug!(entry = %contained.original, bytes = size, "unpacked entry");

        options.report(|| Progress {
            entries_processed: state.files_processed,
            bytes_written: state.total_bytes_written,
            current_entry: PathBuf::from(&contained.original),
        });

        entries.push(UnpackedEntry {
            name: contained.original,
            target_path: contained.resolved,
            size,
            is_directory,
        });
    }

    Ok(UnpackReport {
        entry_count: state.files_processed,
        total_bytes: state.total_bytes_written,
        entries,
    })
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreation {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Stream `reader` into a new file at `path`, charging every chunk against
/// the byte budget as soon as it is written.
fn write_file<R: Read>(
    reader: &mut R,
    path: &Path,
    buffer: &mut [u8],
    state: &mut ExtractionState,
    limit: u64,
) -> Result<u64> {
    let write_err = |e| Error::ExtractionFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = File::create(path).map_err(write_err)?;
    let mut written = 0u64;

    loop {
        let n = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        };
        file.write_all(&buffer[..n]).map_err(write_err)?;
        written += n as u64;
        state.record_bytes(n as u64, limit)?;
    }

    Ok(written)
}
