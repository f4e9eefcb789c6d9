//! Status events and the stream they are written to

use crate::engine::Deployment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Error,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Info => write!(f, "info"),
            StatusLevel::Error => write!(f, "error"),
        }
    }
}

/// A single user-facing progress or result message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub message: String,
    pub level: StatusLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployments: Option<Vec<Deployment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Vec<String>>,
}

impl StatusEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: StatusLevel::Info,
            deployments: None,
            error: None,
            log: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            ..Self::info(message)
        }
    }

    pub fn with_deployments(mut self, deployments: Vec<Deployment>) -> Self {
        self.deployments = Some(deployments);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_log(mut self, log: Option<Vec<String>>) -> Self {
        self.log = log;
        self
    }
}

/// Sink for the status events of one deployment request.
///
/// `write_status` may be called any number of times. `end` consumes the
/// stream, so a stream can be terminated at most once.
pub trait StatusStream: Send + Sync {
    fn write_status(&self, event: StatusEvent);

    fn end(self: Box<Self>, payload: &str);
}
