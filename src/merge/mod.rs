pub mod combine;
pub mod mutate;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::GraftError;

pub use mutate::{apply, MergeReport};

/// How a rendered file is reconciled with a file already at the same path.
///
/// Chosen once per invocation and applied to every rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeStrategy {
    /// Always write the rendered content.
    Overwrite,
    /// Write only where nothing exists yet.
    Skip,
    /// Write where nothing exists; otherwise union the two versions.
    Combine,
}

/// What to do at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Write(Vec<u8>),
    Skip,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 3] = [
        MergeStrategy::Overwrite,
        MergeStrategy::Skip,
        MergeStrategy::Combine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Overwrite => "overwrite",
            MergeStrategy::Skip => "skip",
            MergeStrategy::Combine => "combine",
        }
    }

    pub fn resolve(&self, path: &Path, existing: Option<&[u8]>, incoming: &[u8]) -> Action {
        match (self, existing) {
            (_, None) => Action::Write(incoming.to_vec()),
            (MergeStrategy::Overwrite, Some(_)) => Action::Write(incoming.to_vec()),
            (MergeStrategy::Skip, Some(_)) => Action::Skip,
            (MergeStrategy::Combine, Some(current)) => combine::combine(path, current, incoming),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = GraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" | "override" => Ok(MergeStrategy::Overwrite),
            "skip" | "keep" => Ok(MergeStrategy::Skip),
            "combine" => Ok(MergeStrategy::Combine),
            _ => Err(GraftError::UnknownStrategy {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
