pub mod config;
pub mod descriptor;
pub mod error;
pub mod ignore;
pub mod merge;
pub mod pipeline;
pub mod render;
pub mod tree;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use console::style;
use tera::Value;

use crate::error::{GraftError, Result};
use crate::ignore::BuiltinIgnoreRules;
use crate::pipeline::{Options, PipelineReport, TemplateSet};
use crate::tree::Tree;

/// Environment variable overriding where the bundled template set lives.
pub const TEMPLATES_ENV: &str = "GRAFT_TEMPLATES";

const BUNDLED_TEMPLATES: &str = "templates/devon4j";

/// Template set used when no `--templates` directory is given.
///
/// Looked up in `$GRAFT_TEMPLATES`, then beside the executable
/// (`templates/devon4j` or `../share/graft/templates/devon4j`), and finally in
/// the source tree the binary was built from.
pub fn default_templates_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_templates_dir(
        std::env::var_os(TEMPLATES_ENV).map(PathBuf::from),
        exe_dir.as_deref(),
    )
}

fn resolve_templates_dir(explicit: Option<PathBuf>, exe_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = exe_dir {
        for candidate in [
            dir.join(BUNDLED_TEMPLATES),
            dir.join("../share/graft").join(BUNDLED_TEMPLATES),
        ] {
            if candidate.is_dir() {
                tracing::debug!(path = %candidate.display(), "using installed templates");
                return candidate;
            }
        }
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_TEMPLATES)
}

pub struct GraftOptions {
    /// Root of the Maven project to scaffold into.
    pub project: PathBuf,
    /// Template set directory. If None, uses the bundled devon4j templates.
    pub templates: Option<PathBuf>,
    /// Merge strategy identifier.
    pub merge: String,
    pub docker: bool,
    pub openshift: bool,
    /// Pre-supplied key=value pairs.
    pub data: Vec<(String, String)>,
}

/// A run that has been computed in memory but not written.
pub struct Plan {
    pub project: PathBuf,
    /// The project as it was loaded from disk.
    pub before: Tree,
    /// The project after every stage; only its staged paths will be written.
    pub after: Tree,
    pub report: PipelineReport,
}

impl Plan {
    pub fn changes(&self) -> Vec<tree::diff::Change<'_>> {
        tree::diff::changes(&self.before, &self.after)
    }
}

/// Load the project and template set, then run the whole pipeline in memory.
pub fn plan(options: GraftOptions) -> Result<Plan> {
    let params = parse_data(options.data)?;
    let templates_dir = options.templates.unwrap_or_else(default_templates_dir);
    let templates = TemplateSet::load(&templates_dir)?;

    let before = tree::disk::load(&options.project)?;

    let pipeline_options = Options {
        merge: options.merge,
        docker: options.docker,
        openshift: options.openshift,
        params,
    };

    let (after, report) = pipeline::run(
        before.clone(),
        &pipeline_options,
        &templates,
        &BuiltinIgnoreRules,
    )?;

    Ok(Plan {
        project: options.project,
        before,
        after,
        report,
    })
}

/// Write the staged files of a plan to disk.
pub fn execute(plan: &Plan) -> Result<Vec<PathBuf>> {
    let written = tree::disk::flush(&plan.after, &plan.project)?;

    println!(
        "\n{} Scaffolded {} into {}",
        style("✓").green().bold(),
        style(&plan.report.appname).bold(),
        style(plan.project.display()).cyan()
    );
    println!(
        "  {} ({} strategy), {} files written",
        plan.report.merge,
        plan.report.strategy,
        written.len()
    );

    Ok(written)
}

/// Scaffold the template set into a project.
pub fn graft(options: GraftOptions) -> Result<Plan> {
    let plan = plan(options)?;
    execute(&plan)?;
    Ok(plan)
}

/// Check that a project can be scaffolded into. Returns the project name.
pub fn check(project: &Path) -> Result<String> {
    let tree = tree::disk::load(project)?;
    descriptor::validate(&tree)
}

/// Split one `-d key=value` argument. The value may itself contain `=`.
pub fn parse_data_arg(arg: &str) -> Result<(String, String)> {
    let Some((key, value)) = arg.split_once('=') else {
        return Err(GraftError::InvalidOption {
            name: arg.to_string(),
            reason: "expected key=value".into(),
        });
    };
    Ok((key.trim().to_string(), value.to_string()))
}

/// `-d key=value` values: `true`/`false` become booleans, integers become
/// numbers, everything else stays a string.
fn parse_data(data: Vec<(String, String)>) -> Result<BTreeMap<String, Value>> {
    data.into_iter()
        .map(|(key, raw)| {
            if key.trim().is_empty() {
                return Err(GraftError::InvalidOption {
                    name: format!("={raw}"),
                    reason: "parameter name must not be empty".into(),
                });
            }
            let value = if let Ok(flag) = raw.parse::<bool>() {
                Value::Bool(flag)
            } else if let Ok(number) = raw.parse::<i64>() {
                Value::from(number)
            } else {
                Value::String(raw)
            };
            Ok((key, value))
        })
        .collect()
}
