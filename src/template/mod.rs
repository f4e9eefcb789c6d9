//! Deployment templates
//!
//! A template recognises one kind of project and knows how to turn it into a
//! running container. The host asks each registered template in turn whether
//! it applies to a staged directory and executes the first one that does.
//!
//! Everything a template needs while executing arrives through
//! [`DeployContext`]; templates hold no per-request state of their own.

pub mod java;
mod registry;

use crate::engine::{ContainerEngine, Deployment, EngineError};
use crate::staging::TempManager;
use crate::status::StatusStream;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use java::JavaTemplate;
pub use registry::TemplateRegistry;

/// Name of the build descriptor written into the staged directory
pub const DESCRIPTOR_FILE: &str = "Dockerfile";

/// Errors that abort a deployment
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Failed to write build descriptor: {0:#}")]
    Descriptor(anyhow::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to clean temporary directory: {0:#}")]
    Cleanup(anyhow::Error),
}

impl DeployError {
    /// Message reported to the user for this failure
    pub fn status_error(&self) -> String {
        match self {
            DeployError::Engine(e) => e.error.clone(),
            other => other.to_string(),
        }
    }

    /// Engine log collected before the failure, if the error carries one
    pub fn status_log(&self) -> Option<Vec<String>> {
        match self {
            DeployError::Engine(e) => Some(e.log.clone()),
            _ => None,
        }
    }
}

/// Stages of a single template execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Init,
    DescriptorWritten,
    Building,
    Classifying,
    Starting,
    CleaningUp,
    Succeeded,
    Failed,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployStage::Init => "init",
            DeployStage::DescriptorWritten => "descriptor_written",
            DeployStage::Building => "building",
            DeployStage::Classifying => "classifying",
            DeployStage::Starting => "starting",
            DeployStage::CleaningUp => "cleaning_up",
            DeployStage::Succeeded => "succeeded",
            DeployStage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// How a template execution ended
#[derive(Debug)]
pub enum DeployOutcome {
    /// Container started and staged directory cleaned up
    Deployed(Deployment),
    /// Build finished but its log contained failure terms
    BuildRejected { log: Vec<String> },
    /// An operation raised an error
    Failed(DeployError),
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Deployed(_))
    }

    pub fn deployment(&self) -> Option<&Deployment> {
        match self {
            DeployOutcome::Deployed(d) => Some(d),
            _ => None,
        }
    }
}

/// Per-request inputs for [`DeployTemplate::execute`]
pub struct DeployContext<'a> {
    pub username: String,
    pub staged_dir: PathBuf,
    /// Deployments the new one replaces, passed through to the engine
    pub existing: Vec<Deployment>,
    /// Ended exactly once by the template before `execute` returns
    pub status: Box<dyn StatusStream>,
    pub engine: &'a dyn ContainerEngine,
    pub temp: &'a dyn TempManager,
}

#[async_trait]
pub trait DeployTemplate: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this template applies to the project in `staged_dir`.
    /// Never fails: an unreadable directory is simply not a match.
    fn detect(&self, staged_dir: &Path) -> bool;

    /// Build descriptor this template writes before building
    fn build_descriptor(&self) -> String;

    /// Build and start the project, reporting progress on the context's
    /// status stream
    async fn execute(&self, ctx: DeployContext<'_>) -> DeployOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_reports_own_fields() {
        let err = DeployError::from(
            EngineError::new("daemon unreachable").with_log(vec!["Step 1/5".into()]),
        );
        assert_eq!(err.status_error(), "daemon unreachable");
        assert_eq!(err.status_log(), Some(vec!["Step 1/5".to_string()]));
    }

    #[test]
    fn test_descriptor_error_has_no_log() {
        let err = DeployError::Descriptor(anyhow::anyhow!("read-only file system"));
        assert!(err.status_error().contains("read-only file system"));
        assert_eq!(err.status_log(), None);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(DeployStage::DescriptorWritten.to_string(), "descriptor_written");
        assert_eq!(DeployStage::CleaningUp.to_string(), "cleaning_up");
    }
}
