//! Template registry

use super::{DeployTemplate, JavaTemplate};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Ordered set of templates; earlier registrations win
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: Vec<Arc<dyn DeployTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JavaTemplate::new()));
        registry
    }

    pub fn register(&mut self, template: Arc<dyn DeployTemplate>) {
        self.templates.push(template);
    }

    /// First template whose detector matches `staged_dir`
    pub fn select(&self, staged_dir: &Path) -> Option<Arc<dyn DeployTemplate>> {
        for template in &self.templates {
            if template.detect(staged_dir) {
                debug!(template = template.name(), "Template matched");
                return Some(template.clone());
            }
            debug!(template = template.name(), "Template does not apply");
        }
        None
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DeployTemplate>> {
        self.templates
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name()).collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
