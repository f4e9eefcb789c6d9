use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deploy prebuilt Java archives as containers
#[derive(Parser, Debug)]
#[command(
    name = "jarbox",
    about = "Deploy prebuilt Java archives as containers",
    version,
    long_about = "jarbox detects projects that ship a prebuilt Java archive, writes a \
                  Dockerfile for them, builds the image and starts a container from it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Report which template applies to a project",
        long_about = "Runs every registered template detector against the project directory \
                      and prints the first match. Exits with status 1 when none match.\n\n\
                      Examples:\n  \
                      jarbox detect\n  \
                      jarbox detect /path/to/project"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Build and start a project",
        long_about = "Copies the project into a staging directory, selects a template, \
                      builds the image and starts a container.\n\n\
                      Examples:\n  \
                      jarbox deploy ./my-service\n  \
                      jarbox deploy ./my-service --user alice --format json"
    )]
    Deploy(DeployArgs),

    #[command(about = "Print the Dockerfile a template writes")]
    Dockerfile(DockerfileArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(value_name = "PATH", help = "Project directory (defaults to current directory)")]
    pub project_path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(value_name = "PATH", help = "Project directory (defaults to current directory)")]
    pub project_path: Option<PathBuf>,

    #[arg(short = 'u', long, value_name = "NAME", help = "Owner of the deployment")]
    pub user: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Status output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        value_name = "URL",
        help = "Docker endpoint (overrides JARBOX_DOCKER_HOST)"
    )]
    pub docker_host: Option<String>,

    #[arg(
        long,
        value_name = "ID",
        help = "Container ID of a deployment this one replaces (repeatable)"
    )]
    pub replace: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DockerfileArgs {
    #[arg(short = 't', long, default_value = "java", help = "Template name")]
    pub template: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
