use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tera::Context;
use walkdir::WalkDir;

use crate::config::schema::FilesConfig;
use crate::error::{GraftError, Result};
use crate::render::file::{is_binary, render_file_content, render_path_component};

/// One file produced by a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the target tree root.
    pub path: PathBuf,
    pub content: Vec<u8>,
    /// Copied verbatim (binary or `copy_without_render`) rather than rendered.
    pub is_copy: bool,
}

/// Output of rendering one template resource, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFileSet {
    files: Vec<RenderedFile>,
}

impl RenderedFileSet {
    pub fn iter(&self) -> std::slice::Iter<'_, RenderedFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}

impl<'a> IntoIterator for &'a RenderedFileSet {
    type Item = &'a RenderedFile;
    type IntoIter = std::slice::Iter<'a, RenderedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// How a template resource directory is turned into files.
pub struct RenderSettings<'a> {
    pub templates_suffix: &'a str,
    pub files: &'a FilesConfig,
}

/// Render every file under `resource_dir` against `context`.
///
/// Reads only the template resource; the target tree is never consulted, so
/// the same resource and context always produce the same set.
pub fn render_resource(
    resource_dir: &Path,
    settings: &RenderSettings<'_>,
    context: &Context,
) -> Result<RenderedFileSet> {
    if !resource_dir.is_dir() {
        return Err(GraftError::TemplateDirectoryMissing {
            path: resource_dir.to_path_buf(),
        });
    }

    let suffix = settings.templates_suffix;
    let exclude_set = build_glob_set(&settings.files.exclude)?;
    let copy_set = build_glob_set(&settings.files.copy_without_render)?;

    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(resource_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GraftError::TemplateRead {
            context: format!("walking {}", resource_dir.display()),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let src_path = entry.path();
        let rel_path = src_path
            .strip_prefix(resource_dir)
            .expect("entry must be under resource_dir");
        let rel_str = rel_path.to_string_lossy();

        if exclude_set.is_match(rel_str.as_ref()) {
            continue;
        }

        let Some(rendered_rel) = render_relative_path(rel_path, context, suffix)? else {
            tracing::debug!(template = %rel_str, "path rendered empty, skipping");
            continue;
        };

        if !seen.insert(rendered_rel.clone()) {
            return Err(GraftError::DuplicateRenderedPath { path: rendered_rel });
        }

        let raw = std::fs::read(src_path).map_err(|e| GraftError::TemplateRead {
            context: format!("reading {}", src_path.display()),
            source: e,
        })?;

        let has_suffix = suffix.is_empty() || rel_str.ends_with(suffix);
        let should_copy = copy_set.is_match(rendered_rel.to_string_lossy().as_ref())
            || is_binary(&raw)
            || !has_suffix;

        if should_copy {
            files.push(RenderedFile {
                path: rendered_rel,
                content: raw,
                is_copy: true,
            });
            continue;
        }

        let source = String::from_utf8(raw).map_err(|e| GraftError::TemplateRead {
            context: format!("reading {}", src_path.display()),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        let rendered = render_file_content(&rel_str, &source, context)?;
        files.push(RenderedFile {
            path: rendered_rel,
            content: rendered.into_bytes(),
            is_copy: false,
        });
    }

    tracing::debug!(
        resource = %resource_dir.display(),
        files = files.len(),
        "rendered template resource"
    );
    Ok(RenderedFileSet { files })
}

/// Render each component of a relative path through Tera and strip the template suffix.
///
/// Returns `None` when a component renders to an empty string, which lets a
/// template switch a file off with `{% if flag %}name{% endif %}`.
fn render_relative_path(rel_path: &Path, context: &Context, suffix: &str) -> Result<Option<PathBuf>> {
    let mut rendered = PathBuf::new();
    for component in rel_path.components() {
        let part = component.as_os_str().to_string_lossy();
        let mut rendered_part = render_path_component(&part, context)?;

        if !suffix.is_empty() && rendered_part.ends_with(suffix) {
            rendered_part.truncate(rendered_part.len() - suffix.len());
        }

        if rendered_part.trim().is_empty() {
            return Ok(None);
        }

        rendered.push(rendered_part);
    }
    Ok(Some(rendered))
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| GraftError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| GraftError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
