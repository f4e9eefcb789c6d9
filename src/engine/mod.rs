//! Container engine abstraction
//!
//! Templates never talk to a container daemon directly. They drive a
//! [`ContainerEngine`], which builds an image from a staged directory and
//! starts a container from the result. [`docker::DockerEngine`] is the
//! bollard-backed implementation used by the CLI; tests substitute their own.

pub mod docker;

use crate::status::StatusStream;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use docker::DockerEngine;

/// Error raised by a container engine operation.
///
/// Carries the engine's own message and whatever log output was collected
/// before the failure, so both can be shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{error}")]
pub struct EngineError {
    pub error: String,
    pub log: Vec<String>,
}

impl EngineError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            log: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: Vec<String>) -> Self {
        self.log = log;
        self
    }
}

/// Result of a finished image build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// Image reference the build was tagged with
    pub image: String,
    /// Base name for containers started from this image
    pub name: String,
    /// Build output, one entry per line, in order
    pub log: Vec<String>,
}

/// A running container started for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub name: String,
    pub image: String,
    pub user: String,
}

pub struct BuildRequest<'a> {
    pub username: &'a str,
    pub context_dir: &'a Path,
    pub status: &'a dyn StatusStream,
}

pub struct StartRequest<'a> {
    pub build: &'a BuildResult,
    pub username: &'a str,
    /// Deployments the new container supersedes. What happens to them is
    /// up to the engine.
    pub existing: &'a [Deployment],
    pub status: &'a dyn StatusStream,
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Build an image from the descriptor in `context_dir`
    async fn build(&self, request: BuildRequest<'_>) -> Result<BuildResult, EngineError>;

    /// Start a container from a previous build
    async fn start(&self, request: StartRequest<'_>) -> Result<Deployment, EngineError>;
}
