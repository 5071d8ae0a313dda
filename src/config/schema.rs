use serde::{Deserialize, Serialize};

use crate::error::{GraftError, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub template: TemplateMetadata,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub distribution: DistributionConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateMetadata {
    #[serde(default = "default_template_name")]
    pub name: String,
    pub description: Option<String>,

    #[serde(default = "default_templates_suffix")]
    pub templates_suffix: String,
}

fn default_template_name() -> String {
    "devon4j".to_string()
}

fn default_templates_suffix() -> String {
    ".tera".to_string()
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        Self {
            name: default_template_name(),
            description: None,
            templates_suffix: default_templates_suffix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FilesConfig {
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub copy_without_render: Vec<String>,
}

/// Repositories written into the descriptor's `<distributionManagement>` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistributionConfig {
    #[serde(default = "default_release_repository")]
    pub repository: RepositoryConfig,

    #[serde(default = "default_snapshot_repository")]
    pub snapshot_repository: RepositoryConfig,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            repository: default_release_repository(),
            snapshot_repository: default_snapshot_repository(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub id: String,
    pub name: String,
    pub url: String,
}

fn default_release_repository() -> RepositoryConfig {
    RepositoryConfig {
        id: "pl-nexus".to_string(),
        name: "PL Releases".to_string(),
        url: "http://nexus3-core:8081/nexus3/repository/maven-releases".to_string(),
    }
}

fn default_snapshot_repository() -> RepositoryConfig {
    RepositoryConfig {
        id: "pl-nexus".to_string(),
        name: "PL Snapshots".to_string(),
        url: "http://nexus3-core:8081/nexus3/repository/maven-snapshots".to_string(),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IgnoreConfig {
    /// Ecosystem tags passed to the ignore-rule generator.
    #[serde(default = "default_ignore_tags")]
    pub tags: Vec<String>,
}

fn default_ignore_tags() -> Vec<String> {
    [
        "java",
        "maven",
        "eclipse",
        "intellij",
        "intellij+all",
        "intellij+iml",
        "visualstudiocode",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            tags: default_ignore_tags(),
        }
    }
}

impl TemplateConfig {
    pub fn validate(&self) -> Result<()> {
        for (label, repo) in [
            ("repository", &self.distribution.repository),
            ("snapshot_repository", &self.distribution.snapshot_repository),
        ] {
            for (field, value) in [("id", &repo.id), ("name", &repo.name), ("url", &repo.url)] {
                if value.trim().is_empty() {
                    return Err(GraftError::ConfigInvalid {
                        reason: format!("distribution.{label}.{field} must not be empty"),
                    });
                }
                // Values are spliced into XML verbatim.
                if value.contains(&['<', '>', '&'][..]) {
                    return Err(GraftError::ConfigInvalid {
                        reason: format!(
                            "distribution.{label}.{field} must not contain XML markup characters"
                        ),
                    });
                }
            }
        }

        if self.ignore.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(GraftError::ConfigInvalid {
                reason: "ignore.tags must not contain empty tags".into(),
            });
        }

        Ok(())
    }
}
