//! Exec handler: EXEC

use std::sync::Arc;

use tracing::debug;

use super::Instance;
use crate::error::{GatewayError, Result};
use crate::protocol::{parse_lines, Command, Response};
use crate::runtime::ContainerRuntime;
use crate::session::{parse_cd, Session};

/// Runs commands inside the container behind one instance.
pub struct InstanceExec {
    instance: Instance,
    runtime: Arc<dyn ContainerRuntime>,
}

impl InstanceExec {
    pub fn new(instance: Instance, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { instance, runtime }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Run `command` in the container and return its raw output.
    pub async fn exec(&self, command: &str) -> Result<String> {
        debug!(container = %self.instance.container_name, command, "exec");
        Ok(self.runtime.exec(&self.instance.filter, command).await?)
    }

    pub fn parse(&self, raw: &str) -> Vec<String> {
        parse_lines(raw)
    }

    /// Directory changes are tracked in the session and answered with the
    /// resulting directory; everything else runs in the container.
    pub async fn handle(&self, session: &mut Session, command: Option<&str>) -> Result<Response> {
        let command =
            command.ok_or_else(|| GatewayError::MissingExecCommand(Command::Exec.to_string()))?;

        if let Some(target) = parse_cd(command) {
            let cwd = session.directory_mut().change_directory(&target);
            return Ok(Response::Lines(vec![cwd.display().to_string()]));
        }

        let raw = self.exec(command).await?;
        Ok(Response::Lines(self.parse(&raw)))
    }
}
