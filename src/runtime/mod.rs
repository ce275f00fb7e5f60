//! Container runtime adapter
//!
//! The gateway never talks to a container engine directly. Handlers go
//! through [`ContainerRuntime`], a narrow async interface over the engine's
//! lifecycle and exec facilities. [`DockerCli`] drives the `docker` (or a
//! CLI-compatible) binary.
//!
//! Containers are addressed by *filter expressions*: runtime-native queries
//! such as `name=^/?centos_demo_h1$` that resolve to zero or more container IDs.

mod docker;
mod memory;

pub use docker::{DockerCli, DEFAULT_EXEC_SHELL};
pub use memory::{Call, MemoryRuntime};

use async_trait::async_trait;
use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Errors raised by the container runtime adapter.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The runtime command ran but reported failure.
    #[error("container {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    /// No running container matched the filter expression.
    #[error("no container matches filter '{0}'")]
    ContainerNotFound(String),

    /// Input rejected before reaching the runtime.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The runtime binary could not be spawned.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle and exec operations the instance handlers need.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Build `image:tag` from the given build-definition file.
    async fn build(&self, dockerfile: &str, image: &str, tag: &str) -> RuntimeResult<()>;

    /// Start a detached container named `container_name` from `image:tag`.
    async fn run(&self, container_name: &str, image: &str, tag: &str) -> RuntimeResult<()>;

    /// IDs of the running containers matching `filter`.
    async fn list(&self, filter: &str) -> RuntimeResult<Vec<String>>;

    /// Stop every container matching `filter`. An empty match is a no-op.
    async fn stop(&self, filter: &str) -> RuntimeResult<()>;

    /// Remove every container matching `filter`. An empty match is a no-op.
    async fn remove(&self, filter: &str) -> RuntimeResult<()>;

    /// Force-remove the image `image:tag`.
    async fn remove_image(&self, image: &str, tag: &str) -> RuntimeResult<()>;

    /// Run `command` inside the first container matching `filter` and
    /// return its combined output.
    async fn exec(&self, filter: &str, command: &str) -> RuntimeResult<String>;
}
