pub mod diff;
pub mod disk;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::{Component, Path, PathBuf};

use crate::error::{GraftError, Result};

/// In-memory model of the project being scaffolded into.
///
/// Files are keyed by normalized relative path; directories only exist
/// implicitly as prefixes of file paths. Every write that changes content is
/// staged so that [`disk::flush`] persists only what this invocation touched.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    staged: BTreeSet<PathBuf>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from pre-existing content. Nothing is staged.
    pub fn from_files<I, P>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, Vec<u8>)>,
        P: AsRef<Path>,
    {
        let mut tree = Tree::new();
        for (path, content) in files {
            tree.insert(path.as_ref(), content)?;
        }
        tree.staged.clear();
        Ok(tree)
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        let path = normalize(path.as_ref()).ok()?;
        self.files.get(&path).map(Vec::as_slice)
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.read(path).is_some()
    }

    /// Stage `content` at `path`. Returns whether the tree changed.
    pub fn write(&mut self, path: impl AsRef<Path>, content: Vec<u8>) -> Result<bool> {
        let path = normalize(path.as_ref())?;
        if self.files.get(&path).is_some_and(|old| *old == content) {
            return Ok(false);
        }
        self.insert(&path, content)?;
        self.staged.insert(path);
        Ok(true)
    }

    fn insert(&mut self, path: &Path, content: Vec<u8>) -> Result<()> {
        let path = normalize(path)?;

        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() && self.files.contains_key(ancestor) {
                return Err(GraftError::TreeConflict {
                    path: path.clone(),
                    reason: format!("{} is a file, not a directory", ancestor.display()),
                });
            }
        }

        let next = self
            .files
            .range::<Path, _>((Bound::Excluded(path.as_path()), Bound::Unbounded))
            .next();
        if let Some((child, _)) = next {
            if child.starts_with(&path) {
                return Err(GraftError::TreeConflict {
                    path: path.clone(),
                    reason: format!("it is a directory containing {}", child.display()),
                });
            }
        }

        self.files.insert(path, content);
        Ok(())
    }

    /// All files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_slice()))
    }

    /// Paths written during this invocation, in path order.
    pub fn staged(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(PathBuf::as_path)
    }

    pub fn is_staged(&self, path: impl AsRef<Path>) -> bool {
        normalize(path.as_ref()).is_ok_and(|p| self.staged.contains(&p))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content-only view, used to compare two trees regardless of staging.
    pub fn contents(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.files
    }
}

/// Reduce `path` to its normal components; reject anything escaping the root.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(GraftError::InvalidTreePath {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(GraftError::InvalidTreePath {
            path: path.to_path_buf(),
        });
    }
    Ok(normalized)
}
