//! Test doubles for the collaborators a template drives

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use jarbox::engine::{BuildRequest, BuildResult, ContainerEngine, Deployment, EngineError, StartRequest};
use jarbox::staging::TempManager;
use jarbox::status::{StatusEvent, StatusStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct Recorded {
    pub events: Vec<StatusEvent>,
    pub ends: Vec<String>,
}

/// Status stream that keeps everything written to it
#[derive(Clone, Default)]
pub struct RecordingStatusStream {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingStatusStream {
    pub fn new() -> (Box<dyn StatusStream>, Arc<Mutex<Recorded>>) {
        let stream = Self::default();
        let recorded = stream.recorded.clone();
        (Box::new(stream), recorded)
    }
}

impl StatusStream for RecordingStatusStream {
    fn write_status(&self, event: StatusEvent) {
        self.recorded.lock().unwrap().events.push(event);
    }

    fn end(self: Box<Self>, payload: &str) {
        self.recorded.lock().unwrap().ends.push(payload.to_string());
    }
}

pub fn build_ok(log: &[&str]) -> Result<BuildResult, EngineError> {
    Ok(BuildResult {
        image: "jarbox-alice-app:latest".to_string(),
        name: "jarbox-alice-app".to_string(),
        log: log.iter().map(|l| l.to_string()).collect(),
    })
}

pub fn deployment(id: &str) -> Deployment {
    Deployment {
        id: id.to_string(),
        name: format!("jarbox-alice-app-{}", id),
        image: "jarbox-alice-app:latest".to_string(),
        user: "alice".to_string(),
    }
}

/// Engine returning canned results and counting calls
pub struct MockEngine {
    build_result: Result<BuildResult, EngineError>,
    start_result: Result<Deployment, EngineError>,
    pub build_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub seen_user: Mutex<Option<String>>,
    pub seen_existing: Mutex<Vec<Deployment>>,
    pub descriptor_at_build: Mutex<Option<String>>,
}

impl MockEngine {
    pub fn new(
        build_result: Result<BuildResult, EngineError>,
        start_result: Result<Deployment, EngineError>,
    ) -> Self {
        Self {
            build_result,
            start_result,
            build_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            seen_user: Mutex::new(None),
            seen_existing: Mutex::new(Vec::new()),
            descriptor_at_build: Mutex::new(None),
        }
    }

    pub fn builds(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn build(&self, request: BuildRequest<'_>) -> Result<BuildResult, EngineError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_user.lock().unwrap() = Some(request.username.to_string());
        *self.descriptor_at_build.lock().unwrap() =
            std::fs::read_to_string(request.context_dir.join("Dockerfile")).ok();
        self.build_result.clone()
    }

    async fn start(&self, request: StartRequest<'_>) -> Result<Deployment, EngineError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_existing.lock().unwrap() = request.existing.to_vec();
        self.start_result.clone()
    }
}

/// Temp manager that only counts calls
#[derive(Default)]
pub struct CountingTempManager {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl CountingTempManager {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TempManager for CountingTempManager {
    async fn clean_temp(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(anyhow!("device busy"))
        } else {
            Ok(())
        }
    }
}
