//! jarbox - deployment template for prebuilt Java archives
//!
//! Given a staged project directory, jarbox decides whether the project ships
//! a prebuilt `.jar`, writes a Dockerfile for it, builds an image, checks the
//! build output for failure signals and starts a container from the result.
//!
//! # Core Concepts
//!
//! - **Template**: a pluggable strategy ([`DeployTemplate`]) that detects
//!   whether it applies to a project and performs its build/deploy sequence
//! - **Container engine**: the image build / container start backend
//!   ([`ContainerEngine`]), Docker via bollard by default
//! - **Status stream**: the per-request channel of user-facing progress and
//!   result messages ([`StatusStream`])
//!
//! # Example Usage
//!
//! ```ignore
//! use jarbox::{ChannelStatusStream, DeployContext, DockerEngine, StagedProject, TemplateRegistry};
//!
//! async fn deploy(project: &std::path::Path) -> anyhow::Result<()> {
//!     let staged = StagedProject::stage(project, &std::env::temp_dir())?;
//!     let temp = staged.temp_manager();
//!     let engine = DockerEngine::connect(None, "jarbox")?;
//!
//!     let registry = TemplateRegistry::with_defaults();
//!     if let Some(template) = registry.select(staged.path()) {
//!         let (stream, _rx) = ChannelStatusStream::new();
//!         let outcome = template
//!             .execute(DeployContext {
//!                 username: "alice".into(),
//!                 staged_dir: staged.path().to_path_buf(),
//!                 existing: Vec::new(),
//!                 status: Box::new(stream),
//!                 engine: &engine,
//!                 temp: &temp,
//!             })
//!             .await;
//!         println!("deployed: {}", outcome.is_success());
//!     }
//!     Ok(())
//! }
//! ```

pub mod build_log;
pub mod cli;
pub mod config;
pub mod engine;
pub mod fs;
pub mod staging;
pub mod status;
pub mod template;
pub mod util;

pub use build_log::BuildLogVerdict;
pub use config::{ConfigError, JarboxConfig};
pub use engine::{BuildResult, ContainerEngine, Deployment, DockerEngine, EngineError};
pub use staging::{LocalTempManager, StagedProject, StagingError, TempManager};
pub use status::{ChannelStatusStream, StatusEvent, StatusLevel, StatusMessage, StatusStream};
pub use template::{
    DeployContext, DeployError, DeployOutcome, DeployTemplate, JavaTemplate, TemplateRegistry,
};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
