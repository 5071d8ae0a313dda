#![allow(unused_assignments)]

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::pipeline::Stage;

/// Coarse classification of every failure the generator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing options, unknown merge strategy, bad template config.
    Configuration,
    /// The target project does not satisfy what the generator needs.
    Precondition,
    /// A template could not be rendered.
    Render,
    /// The target tree rejected a write.
    TreeMutation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Precondition => "precondition error",
            ErrorKind::Render => "render error",
            ErrorKind::TreeMutation => "tree mutation error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum GraftError {
    #[error("Unknown merge strategy '{input}'")]
    #[diagnostic(help("Use one of: overwrite, skip, combine"))]
    UnknownStrategy { input: String },

    #[error("Invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in your graft.toml file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid template config: {reason}")]
    ConfigInvalid { reason: String },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Project descriptor not found: {path}")]
    #[diagnostic(help("Run graft from the root of a Maven project (the directory holding pom.xml)"))]
    DescriptorMissing { path: PathBuf },

    #[error("Project descriptor {path} is not valid UTF-8")]
    DescriptorEncoding { path: PathBuf },

    #[error("No <artifactId> element found in {path}")]
    #[diagnostic(help("The project name is read from the first <artifactId> in pom.xml"))]
    IdentifierNotFound { path: PathBuf },

    #[error("Expected exactly one '{marker}' in {path}, found {found}")]
    #[diagnostic(help("The descriptor must end with a single closing element"))]
    ClosingMarker {
        path: PathBuf,
        marker: String,
        found: usize,
    },

    #[error("Template rendering failed in {file}")]
    #[diagnostic(help("Check your Tera template syntax and that every referenced parameter is set"))]
    RenderError {
        file: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render filename: {filename}")]
    FilenameRenderError {
        filename: String,
        #[source]
        source: tera::Error,
    },

    #[error("Two template files render to the same path: {path}")]
    DuplicateRenderedPath { path: PathBuf },

    #[error("Template directory not found: {path}")]
    #[diagnostic(help(
        "Point --templates (or GRAFT_TEMPLATES) at a directory containing files/ and docker/"
    ))]
    TemplateDirectoryMissing { path: PathBuf },

    #[error("Cannot write {path}: {reason}")]
    TreeConflict { path: PathBuf, reason: String },

    #[error("Invalid tree path {path}: paths must be relative and must not contain '..'")]
    InvalidTreePath { path: PathBuf },

    #[error("Unknown ignore tag '{tag}'")]
    UnknownIgnoreTag { tag: String },

    #[error("Failed to read project: {context}")]
    #[diagnostic(help("Check that the project directory exists and is readable"))]
    ProjectRead {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read template: {context}")]
    TemplateRead {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read template config: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<GraftError>,
    },
}

impl GraftError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraftError::UnknownStrategy { .. }
            | GraftError::InvalidOption { .. }
            | GraftError::ConfigParse { .. }
            | GraftError::ConfigInvalid { .. }
            | GraftError::ConfigRead { .. }
            | GraftError::GlobPattern { .. }
            | GraftError::UnknownIgnoreTag { .. } => ErrorKind::Configuration,
            GraftError::DescriptorMissing { .. }
            | GraftError::DescriptorEncoding { .. }
            | GraftError::ProjectRead { .. }
            | GraftError::IdentifierNotFound { .. }
            | GraftError::ClosingMarker { .. } => ErrorKind::Precondition,
            GraftError::RenderError { .. }
            | GraftError::FilenameRenderError { .. }
            | GraftError::DuplicateRenderedPath { .. }
            | GraftError::TemplateDirectoryMissing { .. }
            | GraftError::TemplateRead { .. } => ErrorKind::Render,
            GraftError::TreeConflict { .. }
            | GraftError::InvalidTreePath { .. }
            | GraftError::Io { .. } => ErrorKind::TreeMutation,
            GraftError::Stage { source, .. } => source.kind(),
        }
    }

    /// The pipeline stage the error surfaced in, if it came out of the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GraftError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        GraftError::Stage {
            stage,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wrapper_keeps_inner_kind() {
        let err = GraftError::UnknownStrategy {
            input: "merge-all".into(),
        }
        .in_stage(Stage::Validate);

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.stage(), Some(Stage::Validate));
        assert_eq!(err.to_string(), "validate failed");
    }

    fn io_error() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn read_failures_are_classified_by_origin() {
        let project = GraftError::ProjectRead {
            context: "walking demo".into(),
            source: io_error(),
        };
        let template = GraftError::TemplateRead {
            context: "reading files/Jenkinsfile.tera".into(),
            source: io_error(),
        };
        let config = GraftError::ConfigRead {
            path: PathBuf::from("graft.toml"),
            source: io_error(),
        };
        let flush = GraftError::Io {
            context: "writing pom.xml".into(),
            source: io_error(),
        };

        assert_eq!(project.kind(), ErrorKind::Precondition);
        assert_eq!(template.kind(), ErrorKind::Render);
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert_eq!(flush.kind(), ErrorKind::TreeMutation);
    }

    #[test]
    fn unwrapped_error_has_no_stage() {
        let err = GraftError::DescriptorMissing {
            path: PathBuf::from("pom.xml"),
        };
        assert_eq!(err.stage(), None);
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }
}
