use jarbox::cli::commands::{CliArgs, Commands};
use jarbox::cli::handlers::{handle_deploy, handle_detect, handle_dockerfile, resolve_config};
use jarbox::util::logging::init_logging;
use jarbox::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    init_logging(config.logging_config());

    debug!("jarbox v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
        Commands::Deploy(deploy_args) => handle_deploy(deploy_args, &config).await,
        Commands::Dockerfile(dockerfile_args) => handle_dockerfile(dockerfile_args),
    };

    std::process::exit(exit_code);
}
