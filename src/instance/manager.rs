//! Lifecycle handler: CREATE and DELETE

use std::sync::Arc;

use tracing::{info, warn};

use super::Instance;
use crate::error::{GatewayError, Result};
use crate::protocol::{Command, Response};
use crate::runtime::{ContainerRuntime, RuntimeResult};

/// Creates and deletes the container behind one instance.
///
/// Runtime failures are logged and suppressed: `[0]` means the create was
/// issued, not that the container is running.
pub struct InstanceManager {
    command: Command,
    instance: Instance,
    runtime: Arc<dyn ContainerRuntime>,
}

impl InstanceManager {
    pub fn new(command: Command, instance: Instance, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            command,
            instance,
            runtime,
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Build the image, then start a detached container from it.
    pub async fn create(&self) {
        let i = &self.instance;
        info!(container = %i.container_name, image = %i.image_ref(), "creating instance");

        suppress(
            "build",
            i,
            self.runtime.build(&i.dockerfile, &i.image, &i.tag).await,
        );
        suppress(
            "run",
            i,
            self.runtime.run(&i.container_name, &i.image, &i.tag).await,
        );
    }

    /// Stop and remove matching containers, then remove the image. Each
    /// step runs even if an earlier one failed.
    pub async fn delete(&self) {
        let i = &self.instance;
        info!(container = %i.container_name, filter = %i.filter, "deleting instance");

        suppress("stop", i, self.runtime.stop(&i.filter).await);
        suppress("rm", i, self.runtime.remove(&i.filter).await);
        suppress(
            "rmi",
            i,
            self.runtime.remove_image(&i.image, &i.tag).await,
        );
    }

    pub async fn handle(&self) -> Result<Response> {
        match self.command {
            Command::Create => {
                self.create().await;
                Ok(Response::created())
            }
            Command::Delete => {
                self.delete().await;
                Ok(Response::deleted())
            }
            other => Err(GatewayError::UnsupportedCommand(other.to_string())),
        }
    }
}

fn suppress(step: &str, instance: &Instance, result: RuntimeResult<()>) {
    if let Err(e) = result {
        warn!(
            step,
            container = %instance.container_name,
            error = %e,
            "runtime step failed, continuing"
        );
    }
}
