use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// An archive entry name resolved to a location under the target directory.
#[derive(Clone, Debug)]
pub struct ContainedPath {
    pub original: String,
    pub resolved: PathBuf,
}

/// Canonical form of the target directory.
///
/// The directory must already exist.
pub fn canonical_root(target: &Path) -> Result<PathBuf> {
    fs::canonicalize(target).map_err(|e| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source: e,
    })
}

/// Resolve `entry_name` against `target` and reject anything that does not
/// land strictly below the target's canonical path.
///
/// Both sides are resolved through symlinks on every call; nothing is cached
/// between entries because earlier entries may have changed the tree.
pub fn contain_entry(entry_name: &str, target: &Path) -> Result<ContainedPath> {
    let root = canonical_root(target)?;
    let candidate = root.join(entry_name);

    let traversal = |resolved: PathBuf| Error::PathTraversal {
        entry: entry_name.to_string(),
        resolved,
    };

    // A path that cannot be resolved (dangling link, unreadable component)
    // cannot be shown to stay inside the root.
    let resolved = canonicalize_lenient(&candidate).map_err(|_| traversal(candidate.clone()))?;

    if resolved == root || !resolved.starts_with(&root) {
        return Err(traversal(resolved));
    }

    Ok(ContainedPath {
        original: entry_name.to_string(),
        resolved,
    })
}

/// Canonicalize a path whose tail may not exist yet.
///
/// Components are applied one at a time. Every existing symlink met on the
/// way is replaced by its canonical target, so a later `..` climbs out of the
/// link's real location the same way the kernel would. Missing components are
/// kept lexically.
fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => {
                resolved.push(part);
                if let Ok(meta) = fs::symlink_metadata(&resolved)
                    && meta.file_type().is_symlink()
                {
                    resolved = fs::canonicalize(&resolved)?;
                }
            }
        }
    }

    Ok(resolved)
}
