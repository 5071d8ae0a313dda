//! Narrow, text-level edits to the Maven project descriptor.
//!
//! The descriptor is never parsed as XML. It is treated as opaque text with
//! a few recognised anchors: the first `<artifactId>` element, an optional
//! `<distributionManagement>` opening tag, and the closing `</project>`
//! marker. Edits only ever insert text directly in front of an anchor.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::config::schema::{DistributionConfig, RepositoryConfig};
use crate::error::{GraftError, Result};
use crate::tree::Tree;

pub const DESCRIPTOR_PATH: &str = "pom.xml";
pub const CLOSING_MARKER: &str = "</project>";
const BLOCK_OPENING_TAG: &str = "<distributionmanagement>";

fn artifact_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<artifactId>([^<]*)</artifactId>").expect("artifactId pattern is valid")
    })
}

fn descriptor_path() -> PathBuf {
    PathBuf::from(DESCRIPTOR_PATH)
}

/// The project identifier: the trimmed content of the first `<artifactId>`
/// element. A blank first element counts as no identifier.
pub fn extract_identifier(document: &str) -> Result<String> {
    artifact_id_pattern()
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GraftError::IdentifierNotFound {
            path: descriptor_path(),
        })
}

/// Whether the distribution-management block is present, in any letter case.
pub fn has_distribution_management(document: &str) -> bool {
    document.to_ascii_lowercase().contains(BLOCK_OPENING_TAG)
}

/// Byte offset of the closing marker, which must occur exactly once.
pub fn check_closing_marker(document: &str) -> Result<usize> {
    let mut positions = document.match_indices(CLOSING_MARKER).map(|(i, _)| i);
    match (positions.next(), positions.count()) {
        (Some(at), 0) => Ok(at),
        (first, rest) => Err(GraftError::ClosingMarker {
            path: descriptor_path(),
            marker: CLOSING_MARKER.to_string(),
            found: usize::from(first.is_some()) + rest,
        }),
    }
}

/// Ensure the distribution-management block exists exactly once.
///
/// Returns the input untouched when the block is already there.
pub fn patch<'a>(document: &'a str, distribution: &DistributionConfig) -> Result<Cow<'a, str>> {
    if has_distribution_management(document) {
        return Ok(Cow::Borrowed(document));
    }

    let at = check_closing_marker(document)?;
    let (before, anchor) = document.split_at(at);

    let fragment = distribution_fragment(distribution);
    let mut patched = String::with_capacity(document.len() + fragment.len());
    patched.push_str(before);
    patched.push_str(&fragment);
    patched.push_str(anchor);

    Ok(Cow::Owned(patched))
}

/// The literal block inserted in front of the closing marker.
pub fn distribution_fragment(distribution: &DistributionConfig) -> String {
    format!(
        "  <distributionManagement>\n{}{}  </distributionManagement>\n",
        repository_element("repository", &distribution.repository),
        repository_element("snapshotRepository", &distribution.snapshot_repository),
    )
}

fn repository_element(tag: &str, repo: &RepositoryConfig) -> String {
    format!(
        "    <{tag}>\n      <id>{}</id>\n      <name>{}</name>\n      <url>{}</url>\n    </{tag}>\n",
        repo.id, repo.name, repo.url
    )
}

/// Read the descriptor out of `tree` and check everything the pipeline relies on.
///
/// Returns the project identifier.
pub fn validate(tree: &Tree) -> Result<String> {
    let document = read(tree)?;
    let identifier = extract_identifier(document)?;
    if !has_distribution_management(document) {
        check_closing_marker(document)?;
    }
    Ok(identifier)
}

pub(crate) fn read(tree: &Tree) -> Result<&str> {
    let path = Path::new(DESCRIPTOR_PATH);
    let bytes = tree.read(path).ok_or_else(|| GraftError::DescriptorMissing {
        path: descriptor_path(),
    })?;
    std::str::from_utf8(bytes).map_err(|_| GraftError::DescriptorEncoding {
        path: descriptor_path(),
    })
}

/// Patch the descriptor inside `tree`. Returns whether it changed.
pub fn patch_tree(mut tree: Tree, distribution: &DistributionConfig) -> Result<(Tree, bool)> {
    let patched = match patch(read(&tree)?, distribution)? {
        Cow::Borrowed(_) => None,
        Cow::Owned(patched) => Some(patched),
    };
    let Some(patched) = patched else {
        return Ok((tree, false));
    };
    let changed = tree.write(DESCRIPTOR_PATH, patched.into_bytes())?;
    Ok((tree, changed))
}
