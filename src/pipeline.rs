use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tera::{Context, Value};

use crate::config::{load_config, TemplateConfig};
use crate::descriptor;
use crate::error::{GraftError, Result};
use crate::ignore::{self, IgnoreOutcome, IgnoreRules};
use crate::merge::{self, MergeReport, MergeStrategy};
use crate::render::{build_context, build_parameters, render_resource, RenderSettings, RenderedFileSet};
use crate::tree::Tree;

/// Template resource rendered on every run.
pub const CORE_RESOURCE: &str = "files";
/// Template resource rendered only for container/cloud deployments.
pub const PLATFORM_RESOURCE: &str = "docker";

/// The steps of one generator run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    RenderCore,
    MergeCore,
    RenderOptional,
    MergeOptional,
    PatchDescriptor,
    EnsureIgnoreRules,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::RenderCore => "render core files",
            Stage::MergeCore => "merge core files",
            Stage::RenderOptional => "render platform files",
            Stage::MergeOptional => "merge platform files",
            Stage::PatchDescriptor => "patch pom.xml",
            Stage::EnsureIgnoreRules => "ensure ignore rules",
        };
        f.write_str(name)
    }
}

/// Validated-options input for one run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Merge strategy identifier (`overwrite`, `skip`, `combine`).
    pub merge: String,
    pub docker: bool,
    pub openshift: bool,
    /// Extra template parameters.
    pub params: BTreeMap<String, Value>,
}

impl Options {
    pub fn wants_platform_files(&self) -> bool {
        self.docker || self.openshift
    }
}

/// A template directory holding the core and platform resources plus `graft.toml`.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub root: PathBuf,
    pub config: TemplateConfig,
}

impl TemplateSet {
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(GraftError::TemplateDirectoryMissing {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            config: load_config(root)?,
        })
    }

    pub fn render(&self, resource: &str, context: &Context) -> Result<RenderedFileSet> {
        let settings = RenderSettings {
            templates_suffix: &self.config.template.templates_suffix,
            files: &self.config.files,
        };
        render_resource(&self.root.join(resource), &settings, context)
    }
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub appname: String,
    pub strategy: MergeStrategy,
    pub merge: MergeReport,
    pub platform_rendered: bool,
    pub descriptor_patched: bool,
    pub ignore: IgnoreOutcome,
    pub stages: Vec<Stage>,
}

impl PipelineReport {
    pub fn has_changes(&self) -> bool {
        self.merge.has_changes()
            || self.descriptor_patched
            || !matches!(self.ignore, IgnoreOutcome::UpToDate)
    }
}

struct Validated {
    strategy: MergeStrategy,
    appname: String,
    context: Context,
}

/// Run the whole generator against `tree`.
///
/// Validation happens before anything is written. A failure in a later stage
/// leaves the returned error as the only result; the partially mutated tree
/// is dropped, so nothing reaches disk.
pub fn run(
    tree: Tree,
    options: &Options,
    templates: &TemplateSet,
    ignore_rules: &dyn IgnoreRules,
) -> Result<(Tree, PipelineReport)> {
    let mut stages = Vec::new();

    let validated = validate(&tree, options).map_err(|e| e.in_stage(Stage::Validate))?;
    stages.push(Stage::Validate);
    tracing::info!(
        appname = %validated.appname,
        strategy = %validated.strategy,
        "validated project"
    );

    let core = templates
        .render(CORE_RESOURCE, &validated.context)
        .map_err(|e| e.in_stage(Stage::RenderCore))?;
    stages.push(Stage::RenderCore);

    let (mut tree, mut merge_report) =
        merge::apply(tree, &core, validated.strategy).map_err(|e| e.in_stage(Stage::MergeCore))?;
    stages.push(Stage::MergeCore);
    tracing::info!(files = core.len(), report = %merge_report, "merged core files");

    let platform_rendered = options.wants_platform_files();
    if platform_rendered {
        let platform = templates
            .render(PLATFORM_RESOURCE, &validated.context)
            .map_err(|e| e.in_stage(Stage::RenderOptional))?;
        stages.push(Stage::RenderOptional);

        let (merged, report) = merge::apply(tree, &platform, validated.strategy)
            .map_err(|e| e.in_stage(Stage::MergeOptional))?;
        stages.push(Stage::MergeOptional);
        tracing::info!(files = platform.len(), %report, "merged platform files");

        tree = merged;
        merge_report.merge_from(report);
    }

    let (tree, descriptor_patched) =
        descriptor::patch_tree(tree, &templates.config.distribution)
            .map_err(|e| e.in_stage(Stage::PatchDescriptor))?;
    stages.push(Stage::PatchDescriptor);
    tracing::info!(patched = descriptor_patched, "checked distribution management");

    let (tree, ignore) = ignore::ensure(tree, ignore_rules, &templates.config.ignore.tags)
        .map_err(|e| e.in_stage(Stage::EnsureIgnoreRules))?;
    stages.push(Stage::EnsureIgnoreRules);

    Ok((
        tree,
        PipelineReport {
            appname: validated.appname,
            strategy: validated.strategy,
            merge: merge_report,
            platform_rendered,
            descriptor_patched,
            ignore,
            stages,
        },
    ))
}

fn validate(tree: &Tree, options: &Options) -> Result<Validated> {
    let strategy: MergeStrategy = options.merge.parse()?;
    let appname = descriptor::validate(tree)?;

    let mut params = options.params.clone();
    params.insert("merge".into(), Value::String(strategy.to_string()));
    params.insert("docker".into(), Value::Bool(options.docker));
    params.insert("openshift".into(), Value::Bool(options.openshift));
    let variables = build_parameters(&params, &appname)?;

    Ok(Validated {
        strategy,
        appname,
        context: build_context(&variables),
    })
}
