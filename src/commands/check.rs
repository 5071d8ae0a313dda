use std::path::PathBuf;

use console::style;
use miette::Result;

pub fn run(path: String) -> Result<()> {
    let appname = graft::check(&PathBuf::from(&path))?;

    println!(
        "{} {} is ready to scaffold (project {})",
        style("✓").green().bold(),
        style(&path).cyan(),
        style(appname).bold()
    );

    Ok(())
}
