use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::merge::{Action, MergeStrategy};
use crate::render::RenderedFileSet;
use crate::tree::Tree;

/// Which paths a merge touched, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub created: Vec<PathBuf>,
    pub overwritten: Vec<PathBuf>,
    pub combined: Vec<PathBuf>,
    /// Existing files the strategy left alone.
    pub skipped: Vec<PathBuf>,
    /// Written with content identical to what was there.
    pub unchanged: Vec<PathBuf>,
}

impl MergeReport {
    pub fn has_changes(&self) -> bool {
        !self.created.is_empty() || !self.overwritten.is_empty() || !self.combined.is_empty()
    }

    /// Fold the report of a later stage into this one.
    pub fn merge_from(&mut self, other: MergeReport) {
        self.created.extend(other.created);
        self.overwritten.extend(other.overwritten);
        self.combined.extend(other.combined);
        self.skipped.extend(other.skipped);
        self.unchanged.extend(other.unchanged);
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} overwritten, {} combined, {} skipped",
            self.created.len(),
            self.overwritten.len(),
            self.combined.len(),
            self.skipped.len() + self.unchanged.len(),
        )
    }
}

/// Apply `files` to `tree` under `strategy`, one action per rendered path.
pub fn apply(
    mut tree: Tree,
    files: &RenderedFileSet,
    strategy: MergeStrategy,
) -> Result<(Tree, MergeReport)> {
    let mut report = MergeReport::default();

    for file in files {
        let existing = tree.read(&file.path);
        let existed = existing.is_some();
        let action = strategy.resolve(&file.path, existing, &file.content);

        match action {
            Action::Skip => {
                tracing::debug!(path = %file.path.display(), %strategy, "kept existing");
                report.skipped.push(file.path.clone());
            }
            Action::Write(content) => {
                let changed = tree.write(&file.path, content)?;
                let bucket = match (changed, existed, strategy) {
                    (false, _, _) => &mut report.unchanged,
                    (true, false, _) => &mut report.created,
                    (true, true, MergeStrategy::Combine) => &mut report.combined,
                    (true, true, _) => &mut report.overwritten,
                };
                bucket.push(file.path.clone());
                tracing::debug!(path = %file.path.display(), %strategy, changed, "wrote");
            }
        }
    }

    Ok((tree, report))
}
