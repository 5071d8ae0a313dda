use std::path::PathBuf;

use console::style;
use graft::tree::diff::unified_diff;
use graft::GraftOptions;
use miette::Result;

#[allow(clippy::too_many_arguments)]
pub fn run(
    path: String,
    merge: String,
    docker: bool,
    openshift: bool,
    data: Vec<String>,
    templates: Option<String>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let data_pairs = data
        .iter()
        .map(|arg| graft::parse_data_arg(arg))
        .collect::<graft::error::Result<Vec<_>>>()?;

    let options = GraftOptions {
        project: PathBuf::from(path),
        templates: templates.map(PathBuf::from),
        merge,
        docker,
        openshift,
        data: data_pairs,
    };

    if !dry_run {
        graft::graft(options)?;
        return Ok(());
    }

    let plan = graft::plan(options)?;
    let changes = plan.changes();

    println!(
        "\n{} Dry run: changes that would be made in {}:",
        style("==>").cyan().bold(),
        style(plan.project.display()).cyan()
    );

    for change in &changes {
        let action = if change.is_create() { "create" } else { "update" };
        println!("  {} {}", style(action).green(), change.path.display());

        if verbose {
            println!("  {}", style("──────").dim());
            let before = change
                .before
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            let after = String::from_utf8_lossy(change.after);
            for line in unified_diff(&before, &after, change.path).lines() {
                println!("  {}", line);
            }
            println!("  {}", style("──────").dim());
            println!();
        }
    }

    println!("\nSummary: {}", plan.report.merge);
    if plan.report.descriptor_patched {
        println!("  pom.xml: distributionManagement added");
    }

    println!(
        "\n{} Dry run: no files written.",
        style("\u{2139}").blue().bold()
    );

    Ok(())
}
