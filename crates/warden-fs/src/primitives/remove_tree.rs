use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RemovedKind;
use crate::{Error, Result};

/// Delete `root` and everything below it.
///
/// Uses an explicit stack instead of recursion so that arbitrarily deep trees
/// cannot exhaust the call stack. A directory that still has children is pushed
/// back underneath them; its files are deleted immediately and its
/// subdirectories are visited first. Symlinks below the root are removed,
/// never followed.
///
/// When `root` itself is a symlink to a directory, the directory it points to
/// is emptied and then the link is removed; the emptied directory stays.
///
/// Succeeds without doing anything when `root` does not exist. On failure the
/// tree may be partially removed.
pub fn remove_tree(root: impl AsRef<Path>) -> Result<()> {
    let root = root.as_ref();

    let meta = match fs::symlink_metadata(root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::Read {
                path: root.to_path_buf(),
                source: e,
            });
        }
    };

    if meta.file_type().is_symlink() {
        // is_dir() follows the link
        if root.is_dir() {
            let real = fs::canonicalize(root).map_err(|e| Error::Read {
                path: root.to_path_buf(),
                source: e,
            })?;
            debug!(link = %root.display(), path = %real.display(), "emptying linked directory");
            clear_dir(&real)?;
        }
        return remove_file(root);
    }

    if !meta.is_dir() {
        return remove_file(root);
    }
    remove_dir_tree(root)
}

/// Remove everything inside `dir`, keeping `dir` itself.
fn clear_dir(dir: &Path) -> Result<()> {
    for (child, is_dir) in list_children(dir)? {
        if is_dir {
            remove_dir_tree(&child)?;
        } else {
            remove_file(&child)?;
        }
    }
    Ok(())
}

fn remove_dir_tree(root: &Path) -> Result<()> {
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(current) = stack.pop() {
        let children = list_children(&current)?;

        if children.is_empty() {
            debug!(path = %current.display(), "removing directory");
            fs::remove_dir(&current).map_err(|e| Error::Remove {
                kind: RemovedKind::Directory,
                path: current.clone(),
                source: e,
            })?;
            continue;
        }

        stack.push(current);
        for (child, is_dir) in children {
            if is_dir {
                stack.push(child);
            } else {
                remove_file(&child)?;
            }
        }
    }

    Ok(())
}

fn list_children(dir: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let read_err = |e| Error::Read {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        // file_type() does not traverse symlinks
        let file_type = entry.file_type().map_err(|e| Error::Read {
            path: entry.path(),
            source: e,
        })?;
        children.push((entry.path(), file_type.is_dir()));
    }
    Ok(children)
}

fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::Remove {
        kind: RemovedKind::File,
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remove_missing_is_noop() {
        let dir = tempdir().unwrap();
        remove_tree(dir.path().join("absent")).unwrap();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_remove_nested_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("a/one.txt"), "one").unwrap();
        fs::write(root.join("a/b/c/deep.txt"), "deep").unwrap();

        remove_tree(&root).unwrap();
        assert!(!root.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_remove_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lone.txt");
        fs::write(&file, "data").unwrap();

        remove_tree(&file).unwrap();
        assert!(!file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_followed() {
        let dir = tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.txt"), "keep").unwrap();

        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        remove_tree(&root).unwrap();
        assert!(!root.exists());
        assert!(outside.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root_is_emptied_then_unlinked() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(real.join("sub")).unwrap();
        fs::write(real.join("top.txt"), "top").unwrap();
        fs::write(real.join("sub/inner.txt"), "inner").unwrap();

        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        remove_tree(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(!real.join("top.txt").exists());
        assert!(!real.join("sub").exists());
        assert!(real.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_root_link_is_unlinked() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        remove_tree(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
    }
}
