use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "graft",
    about = "Scaffold an application module into an existing Maven project",
    version
)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the templates into a project and patch its pom.xml
    Apply {
        /// Path to the Maven project (default: current directory)
        #[arg(default_value = ".")]
        path: String,

        /// How to treat files that already exist: overwrite, skip or combine
        #[arg(short, long, default_value = "skip")]
        merge: String,

        /// Also render the container deployment files
        #[arg(long)]
        docker: bool,

        /// Also render the OpenShift deployment files
        #[arg(long)]
        openshift: bool,

        /// Set template parameters (can be repeated: -d key=value)
        #[arg(short, long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Template set directory (default: bundled devon4j templates)
        #[arg(long)]
        templates: Option<String>,

        /// Show planned changes without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that a project can be scaffolded into
    Check {
        /// Path to the Maven project (default: current directory)
        #[arg(default_value = ".")]
        path: String,
    },
}
