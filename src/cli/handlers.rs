//! Command handlers for the jarbox binary

use super::commands::{CliArgs, Commands, DeployArgs, DetectArgs, DockerfileArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::{ConfigError, JarboxConfig};
use crate::engine::{Deployment, DockerEngine};
use crate::staging::{LocalTempManager, StagedProject, TempManager};
use crate::status::{ChannelStatusStream, StatusMessage};
use crate::template::{DeployContext, TemplateRegistry};
use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

fn resolve_path(path: Option<&PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.clone()),
        None => env::current_dir().context("Failed to get current directory"),
    }
}

fn default_user() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let path = match resolve_path(args.project_path.as_ref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    match TemplateRegistry::with_defaults().select(&path) {
        Some(template) => {
            println!("{}", template.name());
            0
        }
        None => {
            eprintln!("No template matches {}", path.display());
            1
        }
    }
}

pub fn handle_dockerfile(args: &DockerfileArgs) -> i32 {
    let registry = TemplateRegistry::with_defaults();
    match registry.get(&args.template) {
        Some(template) => {
            println!("{}", template.build_descriptor());
            0
        }
        None => {
            eprintln!(
                "Unknown template '{}'. Available: {}",
                args.template,
                registry.names().join(", ")
            );
            1
        }
    }
}

/// Loads the environment configuration, applies command-line overrides and
/// validates the result
pub fn resolve_config(args: &CliArgs) -> Result<JarboxConfig, ConfigError> {
    let mut config = JarboxConfig::default();

    if let Some(level) = &args.log_level {
        config.log_level = level.to_lowercase();
    } else if args.verbose {
        config.log_level = "debug".to_string();
    } else if args.quiet {
        config.log_level = "error".to_string();
    }

    if let Commands::Deploy(deploy_args) = &args.command {
        if let Some(host) = &deploy_args.docker_host {
            config.docker_host = Some(host.clone());
        }
    }

    config.validate()?;
    Ok(config)
}

pub async fn handle_deploy(args: &DeployArgs, config: &JarboxConfig) -> i32 {
    match deploy(args, config).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn deploy(args: &DeployArgs, config: &JarboxConfig) -> Result<bool> {
    let source = resolve_path(args.project_path.as_ref())?;
    let staged = StagedProject::stage(&source, &config.staging_dir)?;
    let temp = staged.temp_manager();

    let result = deploy_staged(args, config, &source, &staged, &temp).await;

    // Templates only clean up after a successful start
    if !matches!(result, Ok(true)) {
        if let Err(e) = temp.clean_temp().await {
            warn!(error = %e, "Failed to clean staged project");
        }
    }
    result
}

async fn deploy_staged(
    args: &DeployArgs,
    config: &JarboxConfig,
    source: &Path,
    staged: &StagedProject,
    temp: &LocalTempManager,
) -> Result<bool> {
    let username = args.user.clone().unwrap_or_else(default_user);

    let registry = TemplateRegistry::with_defaults();
    let template = registry.select(staged.path()).ok_or_else(|| {
        anyhow!(
            "No template matches {} (available: {})",
            source.display(),
            registry.names().join(", ")
        )
    })?;
    info!(template = template.name(), user = %username, "Deploying {}", source.display());

    let engine = DockerEngine::connect(config.docker_host.as_deref(), &config.image_prefix)?
        .with_template(template.name());
    let api_version = engine.ping().await?;
    debug!(api_version = %api_version, "Docker daemon reachable");

    let existing = args
        .replace
        .iter()
        .map(|id| Deployment {
            id: id.clone(),
            name: id.clone(),
            image: String::new(),
            user: username.clone(),
        })
        .collect();

    let (stream, rx) = ChannelStatusStream::new();
    let formatter = OutputFormatter::new(args.format.into());
    let printer = tokio::spawn(print_status(rx, formatter, std::io::stdout()));

    let outcome = template
        .execute(DeployContext {
            username,
            staged_dir: staged.path().to_path_buf(),
            existing,
            status: Box::new(stream),
            engine: &engine,
            temp,
        })
        .await;

    printer.await.context("Status printer task failed")?;

    Ok(outcome.is_success())
}

/// Writes status events to `out` until the stream ends
async fn print_status<W: Write>(
    mut rx: UnboundedReceiver<StatusMessage>,
    formatter: OutputFormatter,
    mut out: W,
) {
    while let Some(message) = rx.recv().await {
        match message {
            StatusMessage::Status(event) => match formatter.format(&event) {
                Ok(line) => {
                    if let Err(e) = writeln!(out, "{}", line) {
                        debug!(error = %e, "Failed to write status event");
                    }
                }
                Err(e) => debug!(error = %e, "Failed to format status event"),
            },
            StatusMessage::End(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StatusEvent, StatusStream};
    use clap::Parser;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn deploy_args(path: &Path) -> DeployArgs {
        DeployArgs {
            project_path: Some(path.to_path_buf()),
            user: Some("alice".to_string()),
            format: super::super::commands::OutputFormatArg::Human,
            docker_host: None,
            replace: Vec::new(),
        }
    }

    fn test_config(staging: &Path, docker_host: &str) -> JarboxConfig {
        JarboxConfig {
            log_level: "info".to_string(),
            log_json: false,
            image_prefix: "jarbox".to_string(),
            staging_dir: staging.to_path_buf(),
            docker_host: Some(docker_host.to_string()),
        }
    }

    #[tokio::test]
    async fn test_unreachable_daemon_removes_staged_copy() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("app.jar"), b"jar").unwrap();
        let staging = TempDir::new().unwrap();
        // Nothing listens on port 1
        let config = test_config(staging.path(), "tcp://127.0.0.1:1");

        assert_eq!(handle_deploy(&deploy_args(project.path()), &config).await, 1);
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unmatched_project_removes_staged_copy() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("main.py"), "print()").unwrap();
        let staging = TempDir::new().unwrap();
        let config = test_config(staging.path(), "tcp://127.0.0.1:1");

        assert_eq!(handle_deploy(&deploy_args(project.path()), &config).await, 1);
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_print_status_human_output() {
        let (stream, rx) = ChannelStatusStream::new();
        let stream: Box<dyn StatusStream> = Box::new(stream);
        stream.write_status(StatusEvent::info("Deploying Java project.."));
        stream.write_status(StatusEvent::error("Build log contains errors!"));
        stream.end("");

        let mut out = Vec::new();
        print_status(rx, OutputFormatter::new(OutputFormat::Human), &mut out).await;

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Deploying Java project..\nerror: Build log contains errors!\n"
        );
    }

    #[test]
    #[serial]
    fn test_resolve_config_rejects_bad_env_level() {
        env::set_var("JARBOX_LOG_LEVEL", "loud");
        let result = resolve_config(&CliArgs::parse_from(["jarbox", "detect"]));
        env::remove_var("JARBOX_LOG_LEVEL");

        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    #[serial]
    fn test_resolve_config_flags_override_env() {
        env::set_var("JARBOX_LOG_LEVEL", "warn");
        let args = CliArgs::parse_from([
            "jarbox",
            "--verbose",
            "deploy",
            "--docker-host",
            "tcp://10.0.0.5:2375",
        ]);
        let config = resolve_config(&args);
        env::remove_var("JARBOX_LOG_LEVEL");

        let config = config.unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.docker_host.as_deref(), Some("tcp://10.0.0.5:2375"));
        assert_eq!(config.logging_config().level, tracing::Level::DEBUG);
    }

    #[tokio::test]
    async fn test_detect_java_project() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.jar"), b"jar").unwrap();

        let args = DetectArgs {
            project_path: Some(dir.path().to_path_buf()),
        };
        assert_eq!(handle_detect(&args).await, 0);
    }

    #[tokio::test]
    async fn test_detect_no_match() {
        let dir = TempDir::new().unwrap();
        let args = DetectArgs {
            project_path: Some(dir.path().to_path_buf()),
        };
        assert_eq!(handle_detect(&args).await, 1);
    }

    #[test]
    fn test_dockerfile_known_and_unknown() {
        assert_eq!(
            handle_dockerfile(&DockerfileArgs {
                template: "java".into()
            }),
            0
        );
        assert_eq!(
            handle_dockerfile(&DockerfileArgs {
                template: "cobol".into()
            }),
            1
        );
    }
}
