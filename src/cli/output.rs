//! Status output formatting

use crate::status::{StatusEvent, StatusLevel};
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Human-readable text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, event: &StatusEvent) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string(event).context("Failed to serialize status event")
            }
            OutputFormat::Human => Ok(self.format_human(event)),
        }
    }

    fn format_human(&self, event: &StatusEvent) -> String {
        let mut out = match event.level {
            StatusLevel::Info => event.message.clone(),
            StatusLevel::Error => format!("error: {}", event.message),
        };

        if let Some(deployments) = &event.deployments {
            for d in deployments {
                out.push_str(&format!("\n  {} ({}) image={}", d.name, short_id(&d.id), d.image));
            }
        }
        if let Some(log) = &event.log {
            for line in log {
                out.push_str("\n  | ");
                out.push_str(line);
            }
        }
        out
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
