//! Instance handlers
//!
//! An instance is one container, addressed by `(os, instance_hash)`. Two
//! handler families act on it:
//! - [`InstanceManager`] for CREATE and DELETE
//! - [`InstanceExec`] for EXEC
//!
//! A handler is built for a single request, handled once, then dropped.
//! Construction only expands name templates, so handlers need no locking.

mod exec;
mod manager;

pub use exec::InstanceExec;
pub use manager::InstanceManager;

use std::sync::Arc;

use serde::Serialize;

use crate::config::OsProfile;
use crate::error::Result;
use crate::protocol::{Command, Response};
use crate::runtime::ContainerRuntime;
use crate::session::Session;

/// Fully expanded addressing data for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub os: String,
    pub instance_hash: String,
    pub image: String,
    pub tag: String,
    pub dockerfile: String,
    pub container_name: String,
    pub filter: String,
}

impl Instance {
    pub fn new(os: &str, profile: &OsProfile, instance_hash: &str) -> Self {
        let container_name = profile.container_name_for(instance_hash);
        Self {
            os: os.to_string(),
            instance_hash: instance_hash.to_string(),
            image: profile.image.clone(),
            tag: profile.tag.clone(),
            dockerfile: profile.dockerfile.clone(),
            filter: profile.filter_for(&container_name),
            container_name,
        }
    }

    /// `image:tag`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

/// The handler resolved for one request.
pub enum InstanceHandler {
    Manager(InstanceManager),
    Exec(InstanceExec),
}

impl InstanceHandler {
    /// CREATE and DELETE go to the lifecycle family, EXEC to the exec family.
    pub fn resolve(
        command: Command,
        instance: Instance,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Self {
        match command {
            Command::Create | Command::Delete => {
                InstanceHandler::Manager(InstanceManager::new(command, instance, runtime))
            }
            Command::Exec => InstanceHandler::Exec(InstanceExec::new(instance, runtime)),
        }
    }

    pub fn instance(&self) -> &Instance {
        match self {
            InstanceHandler::Manager(m) => m.instance(),
            InstanceHandler::Exec(e) => e.instance(),
        }
    }

    /// Handle the request. Consumes the handler.
    pub async fn handle(self, session: &mut Session, exec_command: Option<&str>) -> Result<Response> {
        match self {
            InstanceHandler::Manager(manager) => manager.handle().await,
            InstanceHandler::Exec(exec) => exec.handle(session, exec_command).await,
        }
    }
}
