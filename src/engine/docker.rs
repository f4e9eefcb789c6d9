use super::{BuildRequest, BuildResult, ContainerEngine, Deployment, EngineError, StartRequest};
use crate::status::StatusEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions,
};
use bollard::image::BuildImageOptions;
use bollard::models::{HostConfig, RestartPolicy, RestartPolicyNameEnum};
use bollard::Docker;
use bytes::Bytes;
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

const DOCKER_TIMEOUT_SECS: u64 = 120;
const OWNER_LABEL: &str = "jarbox.user";
const TEMPLATE_LABEL: &str = "jarbox.template";

/// Container engine talking to a Docker daemon
pub struct DockerEngine {
    docker: Docker,
    image_prefix: String,
    template: String,
}

impl DockerEngine {
    /// Connect to the daemon at `host`, or the local default socket when `None`
    pub fn connect(host: Option<&str>, image_prefix: impl Into<String>) -> Result<Self> {
        let docker = match host {
            None => Docker::connect_with_local_defaults(),
            Some(h) if h.starts_with("unix://") => Docker::connect_with_unix(
                h,
                DOCKER_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            Some(h) => {
                Docker::connect_with_http(h, DOCKER_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
        }
        .with_context(|| format!("Failed to connect to Docker at {}", host.unwrap_or("default socket")))?;

        Ok(Self {
            docker,
            image_prefix: image_prefix.into(),
            template: "java".to_string(),
        })
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Check that the daemon answers
    pub async fn ping(&self) -> Result<String> {
        let version = self
            .docker
            .version()
            .await
            .context("Failed to get Docker version")?;
        let api_version = version.api_version.unwrap_or_else(|| "0.0".to_string());
        debug!("Docker API version: {}", api_version);
        Ok(api_version)
    }

    fn base_name(&self, username: &str, context_dir: &Path) -> String {
        let project = context_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        sanitize_name(&format!("{}-{}-{}", self.image_prefix, username, project))
    }
}

/// Reduce a name to the characters docker accepts in image and container names
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

fn pack_context(dir: &Path) -> std::io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    builder.append_dir_all(".", dir)?;
    builder.into_inner()
}

fn split_log_chunk(chunk: &str) -> impl Iterator<Item = String> + '_ {
    chunk
        .lines()
        .map(|l| l.trim_end().to_string())
        .filter(|l| !l.is_empty())
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build(&self, request: BuildRequest<'_>) -> Result<BuildResult, EngineError> {
        let name = self.base_name(request.username, request.context_dir);
        let image = format!("{}:latest", name);

        let dir = request.context_dir.to_path_buf();
        let context = tokio::task::spawn_blocking(move || pack_context(&dir))
            .await
            .map_err(|e| EngineError::new(format!("Build context task failed: {}", e)))?
            .map_err(|e| EngineError::new(format!("Failed to pack build context: {}", e)))?;

        info!(image = %image, context_bytes = context.len(), "Building image");

        let mut labels = HashMap::new();
        labels.insert(OWNER_LABEL.to_string(), request.username.to_string());
        labels.insert(TEMPLATE_LABEL.to_string(), self.template.clone());

        let options = BuildImageOptions {
            dockerfile: "Dockerfile".to_string(),
            t: image.clone(),
            rm: true,
            forcerm: true,
            labels,
            ..Default::default()
        };

        let mut log = Vec::new();
        let mut stream = self
            .docker
            .build_image(options, None, Some(Bytes::from(context)));

        while let Some(item) = stream.next().await {
            match item {
                Ok(info) => {
                    if let Some(chunk) = info.stream.as_deref() {
                        for line in split_log_chunk(chunk) {
                            request.status.write_status(StatusEvent::info(line.clone()));
                            log.push(line);
                        }
                    }
                    if let Some(error) = info.error {
                        return Err(EngineError::new(error).with_log(log));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Image build failed");
                    return Err(EngineError::new(e.to_string()).with_log(log));
                }
            }
        }

        Ok(BuildResult { image, name, log })
    }

    async fn start(&self, request: StartRequest<'_>) -> Result<Deployment, EngineError> {
        let short_id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}-{}", request.build.name, &short_id[..8]);

        let mut labels = HashMap::new();
        labels.insert(OWNER_LABEL.to_string(), request.username.to_string());
        labels.insert(TEMPLATE_LABEL.to_string(), self.template.clone());

        let config = Config {
            image: Some(request.build.image.clone()),
            labels: Some(labels),
            host_config: Some(HostConfig {
                restart_policy: Some(RestartPolicy {
                    name: Some(RestartPolicyNameEnum::ON_FAILURE),
                    maximum_retry_count: Some(2),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: name.clone(),
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(|e| EngineError::new(format!("Failed to create container: {}", e)))?;

        for warning in &created.warnings {
            warn!(container = %name, "{}", warning);
        }

        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| EngineError::new(format!("Failed to start container: {}", e)))?;

        info!(container = %name, id = %created.id, "Container started");

        for old in request.existing {
            debug!(container = %old.name, "Removing superseded deployment");
            if let Err(e) = self
                .docker
                .remove_container(
                    &old.id,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await
            {
                warn!(container = %old.name, error = %e, "Failed to remove old deployment");
            }
        }

        Ok(Deployment {
            id: created.id,
            name,
            image: request.build.image.clone(),
            user: request.username.to_string(),
        })
    }
}
