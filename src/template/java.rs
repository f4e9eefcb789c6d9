//! Template for prebuilt Java archives
//!
//! Matches any project whose top-level directory holds a file with `.jar` in
//! its name, and runs it on a stock OpenJDK image. The descriptor always
//! launches `app.jar`; projects shipping a differently named archive build
//! fine but fail at container startup.

use super::{
    DeployContext, DeployError, DeployOutcome, DeployStage, DeployTemplate, DESCRIPTOR_FILE,
};
use crate::build_log::{self, BuildLogVerdict};
use crate::engine::{BuildRequest, ContainerEngine, Deployment, StartRequest};
use crate::fs::{FileSystem, RealFileSystem};
use crate::staging::TempManager;
use crate::status::{StatusEvent, StatusStream};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const JAVA_DOCKERFILE: &str = "FROM openjdk
COPY . /usr/src/myapp
WORKDIR /usr/src/myapp
EXPOSE 80
CMD java -jar app.jar";

pub const MSG_DEPLOYING: &str = "Deploying Java project..";
pub const MSG_BUILD_LOG_ERRORS: &str = "Build log contains errors!";
pub const MSG_SUCCESS: &str = "Deployment success!";

/// Descriptor for Java archive projects. Takes no inputs.
pub fn java_dockerfile() -> &'static str {
    JAVA_DOCKERFILE
}

pub struct JavaTemplate {
    fs: Arc<dyn FileSystem>,
}

impl JavaTemplate {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn run(
        &self,
        username: &str,
        staged_dir: &Path,
        existing: &[Deployment],
        status: &dyn StatusStream,
        engine: &dyn ContainerEngine,
        temp: &dyn TempManager,
    ) -> Result<DeployOutcome, DeployError> {
        self.fs
            .write_file(&staged_dir.join(DESCRIPTOR_FILE), java_dockerfile())
            .map_err(DeployError::Descriptor)?;
        debug!(stage = %DeployStage::DescriptorWritten, dir = %staged_dir.display());
        status.write_status(StatusEvent::info(MSG_DEPLOYING));

        debug!(stage = %DeployStage::Building, user = username);
        let build = engine
            .build(BuildRequest {
                username,
                context_dir: staged_dir,
                status,
            })
            .await?;
        debug!(image = %build.image, log_lines = build.log.len(), "Build result: {:?}", build);

        debug!(stage = %DeployStage::Classifying);
        if build_log::classify(&build.log) == BuildLogVerdict::Fail {
            debug!("Build log contains errors");
            return Ok(DeployOutcome::BuildRejected { log: build.log });
        }

        debug!(stage = %DeployStage::Starting, existing = existing.len());
        let deployment = engine
            .start(StartRequest {
                build: &build,
                username,
                existing,
                status,
            })
            .await?;
        debug!(container = %deployment.name, id = %deployment.id, "Container started");

        debug!(stage = %DeployStage::CleaningUp);
        temp.clean_temp().await.map_err(DeployError::Cleanup)?;

        Ok(DeployOutcome::Deployed(deployment))
    }
}

impl Default for JavaTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeployTemplate for JavaTemplate {
    fn name(&self) -> &str {
        "java"
    }

    fn detect(&self, staged_dir: &Path) -> bool {
        match self.fs.read_dir(staged_dir) {
            Ok(entries) => entries.iter().any(|e| e.file_name().contains(".jar")),
            Err(e) => {
                debug!(dir = %staged_dir.display(), error = %e, "Cannot list staged directory");
                false
            }
        }
    }

    fn build_descriptor(&self) -> String {
        java_dockerfile().to_string()
    }

    async fn execute(&self, ctx: DeployContext<'_>) -> DeployOutcome {
        let DeployContext {
            username,
            staged_dir,
            existing,
            status,
            engine,
            temp,
        } = ctx;
        debug!(stage = %DeployStage::Init, user = %username, template = self.name());

        let result = self
            .run(
                &username,
                &staged_dir,
                &existing,
                status.as_ref(),
                engine,
                temp,
            )
            .await;

        let outcome = match result {
            Ok(DeployOutcome::Deployed(deployment)) => {
                status.write_status(
                    StatusEvent::info(MSG_SUCCESS).with_deployments(vec![deployment.clone()]),
                );
                debug!(stage = %DeployStage::Succeeded);
                DeployOutcome::Deployed(deployment)
            }
            Ok(DeployOutcome::BuildRejected { log }) => {
                status.write_status(StatusEvent::error(MSG_BUILD_LOG_ERRORS));
                debug!(stage = %DeployStage::Failed, "Build rejected");
                DeployOutcome::BuildRejected { log }
            }
            Ok(DeployOutcome::Failed(e)) | Err(e) => {
                debug!(stage = %DeployStage::Failed, error = %e, "Deployment failed");
                let message = e.status_error();
                status.write_status(
                    StatusEvent::error(message.clone())
                        .with_error(message)
                        .with_log(e.status_log()),
                );
                DeployOutcome::Failed(e)
            }
        };

        status.end("");
        outcome
    }
}
