//! In-memory runtime
//!
//! Models images and containers in a table instead of talking to an engine.
//! Backs `serve --dry-run` and the test suites; every call is recorded.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use super::{ContainerRuntime, RuntimeError, RuntimeResult};

/// One recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(String, String, String),
    Run(String, String, String),
    List(String),
    Stop(String),
    Remove(String),
    RemoveImage(String, String),
    Exec(String, String),
}

#[derive(Debug, Clone)]
struct ContainerEntry {
    running: bool,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    images: BTreeSet<String>,
    containers: BTreeMap<String, ContainerEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryRuntime {
    state: Mutex<State>,
    exec_output: String,
    fail: bool,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose every operation fails after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Text returned by every successful exec.
    pub fn with_exec_output(mut self, output: impl Into<String>) -> Self {
        self.exec_output = output.into();
        self
    }

    /// Pretend a container with this name is already running.
    pub fn with_running(self, container_name: impl Into<String>) -> Self {
        self.lock()
            .containers
            .insert(container_name.into(), ContainerEntry { running: true });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn has_image(&self, image: &str, tag: &str) -> bool {
        self.lock().images.contains(&format!("{}:{}", image, tag))
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.lock().containers.contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: Call) -> RuntimeResult<MutexGuard<'_, State>> {
        info!(?call, "dry-run runtime call");
        let mut state = self.lock();
        state.calls.push(call.clone());
        if self.fail {
            return Err(RuntimeError::CommandFailed {
                command: format!("{:?}", call),
                message: "simulated failure".to_string(),
            });
        }
        Ok(state)
    }
}

/// `name=<re>` is matched the way docker does: an unanchored regex over the
/// container name, tried with and without the leading `/`. Any other filter,
/// or an invalid regex, matches nothing.
fn matching(state: &State, filter: &str, running_only: bool) -> Vec<String> {
    let Some(pattern) = filter.strip_prefix("name=") else {
        return Vec::new();
    };
    let Ok(re) = Regex::new(pattern) else {
        return Vec::new();
    };
    state
        .containers
        .iter()
        .filter(|(_, entry)| entry.running || !running_only)
        .filter(|(name, _)| re.is_match(name) || re.is_match(&format!("/{}", name)))
        .map(|(name, _)| name.clone())
        .collect()
}

#[async_trait]
impl ContainerRuntime for MemoryRuntime {
    async fn build(&self, dockerfile: &str, image: &str, tag: &str) -> RuntimeResult<()> {
        let mut state = self.record(Call::Build(dockerfile.into(), image.into(), tag.into()))?;
        state.images.insert(format!("{}:{}", image, tag));
        Ok(())
    }

    async fn run(&self, container_name: &str, image: &str, tag: &str) -> RuntimeResult<()> {
        let mut state = self.record(Call::Run(container_name.into(), image.into(), tag.into()))?;
        if !state.images.contains(&format!("{}:{}", image, tag)) {
            return Err(RuntimeError::CommandFailed {
                command: "run".to_string(),
                message: format!("image {}:{} not found", image, tag),
            });
        }
        if state.containers.contains_key(container_name) {
            return Err(RuntimeError::CommandFailed {
                command: "run".to_string(),
                message: format!("name {} is already in use", container_name),
            });
        }
        state
            .containers
            .insert(container_name.to_string(), ContainerEntry { running: true });
        Ok(())
    }

    async fn list(&self, filter: &str) -> RuntimeResult<Vec<String>> {
        let state = self.record(Call::List(filter.into()))?;
        Ok(matching(&state, filter, true))
    }

    async fn stop(&self, filter: &str) -> RuntimeResult<()> {
        let mut state = self.record(Call::Stop(filter.into()))?;
        for name in matching(&state, filter, true) {
            if let Some(entry) = state.containers.get_mut(&name) {
                entry.running = false;
            }
        }
        Ok(())
    }

    async fn remove(&self, filter: &str) -> RuntimeResult<()> {
        let mut state = self.record(Call::Remove(filter.into()))?;
        for name in matching(&state, filter, false) {
            state.containers.remove(&name);
        }
        Ok(())
    }

    async fn remove_image(&self, image: &str, tag: &str) -> RuntimeResult<()> {
        let mut state = self.record(Call::RemoveImage(image.into(), tag.into()))?;
        state.images.remove(&format!("{}:{}", image, tag));
        Ok(())
    }

    async fn exec(&self, filter: &str, command: &str) -> RuntimeResult<String> {
        let state = self.record(Call::Exec(filter.into(), command.into()))?;
        if matching(&state, filter, true).is_empty() {
            return Err(RuntimeError::ContainerNotFound(filter.to_string()));
        }
        Ok(self.exec_output.clone())
    }
}
