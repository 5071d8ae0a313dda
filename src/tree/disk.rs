use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{GraftError, Result};
use crate::tree::Tree;

const SKIPPED_DIRS: &[&str] = &[".git", "target"];

/// Read every file under `root` into a [`Tree`].
pub fn load(root: &Path) -> Result<Tree> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && SKIPPED_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| GraftError::ProjectRead {
            context: format!("walking {}", root.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| GraftError::InvalidTreePath {
                path: entry.path().to_path_buf(),
            })?
            .to_path_buf();
        let content = std::fs::read(entry.path()).map_err(|e| GraftError::ProjectRead {
            context: format!("reading {}", entry.path().display()),
            source: e,
        })?;
        files.push((rel, content));
    }

    tracing::debug!(root = %root.display(), files = files.len(), "loaded target tree");
    Tree::from_files(files)
}

/// Write the staged files of `tree` under `root`.
///
/// Each file goes through a temp file in its destination directory and is
/// renamed into place, so a crash never leaves a half-written file behind.
pub fn flush(tree: &Tree, root: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for rel in tree.staged() {
        let Some(content) = tree.read(rel) else {
            continue;
        };
        let dest = root.join(rel);
        let parent = dest.parent().unwrap_or(root);
        std::fs::create_dir_all(parent).map_err(|e| GraftError::Io {
            context: format!("creating directory {}", parent.display()),
            source: e,
        })?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| GraftError::Io {
            context: format!("creating temp file in {}", parent.display()),
            source: e,
        })?;
        tmp.write_all(content).map_err(|e| GraftError::Io {
            context: format!("writing {}", dest.display()),
            source: e,
        })?;
        tmp.persist(&dest).map_err(|e| GraftError::Io {
            context: format!("replacing {}", dest.display()),
            source: e.error,
        })?;

        tracing::debug!(path = %rel.display(), "flushed");
        written.push(rel.to_path_buf());
    }

    Ok(written)
}
