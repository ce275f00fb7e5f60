//! Request dispatcher
//!
//! Turns one raw inbound message into one reply:
//!
//! 1. validate the schema
//! 2. decode the request
//! 3. reject unknown OS variants, then unknown commands, then instance
//!    hashes that are not valid container-name characters
//! 4. resolve the handler family for the command
//! 5. build the handler from the OS profile and instance hash
//! 6. run it
//! 7. send the serialized reply
//!
//! Every failure is reported twice: its peer text goes back over the
//! channel, and the typed error is returned to the caller.

mod channel;

pub use channel::{MemoryChannel, MessageChannel};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::OsRegistry;
use crate::error::{GatewayError, Result};
use crate::instance::{Instance, InstanceHandler};
use crate::protocol::{self, Command, Request, Response};
use crate::runtime::ContainerRuntime;
use crate::session::Session;

/// What a message resolves to before anything is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub command: Command,
    pub instance: Instance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_command: Option<String>,
}

/// Shared by every connection; holds no per-request state.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<OsRegistry>,
    runtime: Arc<dyn ContainerRuntime>,
}

impl Dispatcher {
    pub fn new(registry: OsRegistry, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            registry: Arc::new(registry),
            runtime,
        }
    }

    /// Validate, decode and resolve `raw` without running anything.
    pub fn plan(&self, raw: &str) -> Result<Plan> {
        if !protocol::validate(raw)? {
            return Err(GatewayError::InvalidFormat);
        }

        let Request {
            instance_os,
            command,
            instance_hash,
            exec_command,
        } = protocol::decode(raw)?;

        let profile = self
            .registry
            .get(&instance_os)
            .ok_or_else(|| GatewayError::UnsupportedOs(instance_os.clone()))?;
        let command: Command = command.parse()?;
        if !protocol::is_valid_instance_hash(&instance_hash) {
            return Err(GatewayError::InvalidInstanceHash(instance_hash));
        }

        Ok(Plan {
            command,
            instance: Instance::new(&instance_os, profile, &instance_hash),
            exec_command,
        })
    }

    /// Run one message against `session` and return the reply.
    pub async fn dispatch(&self, session: &mut Session, raw: &str) -> Result<Response> {
        let Plan {
            command,
            instance,
            exec_command,
        } = self.plan(raw)?;

        debug!(
            session = session.id(),
            %command,
            container = %instance.container_name,
            "dispatching"
        );

        let handler = InstanceHandler::resolve(command, instance, self.runtime.clone());
        handler.handle(session, exec_command.as_deref()).await
    }

    /// Handle one inbound message and send exactly one reply on `channel`.
    ///
    /// On failure the peer gets the error's peer text and the error is
    /// returned as well.
    pub async fn handle_connection_message<C>(
        &self,
        channel: &mut C,
        session: &mut Session,
        raw: &str,
    ) -> Result<()>
    where
        C: MessageChannel + ?Sized,
    {
        session.record_message();

        let reply = match self.dispatch(session, raw).await {
            Ok(response) => response.to_json(),
            Err(e) => Err(e),
        };

        match reply {
            Ok(text) => channel.send(text).await,
            Err(e) => {
                error!(session = session.id(), error = %e, "request failed");
                if let Err(send_err) = channel.send(e.peer_message()).await {
                    warn!(session = session.id(), error = %send_err, "could not report error to peer");
                }
                Err(e)
            }
        }
    }

    /// Serve messages from `channel` one at a time until the peer leaves.
    ///
    /// Request failures have already been reported and logged, so they do
    /// not end the session. Transport failures do.
    pub async fn serve_session<C>(&self, channel: &mut C, session: &mut Session) -> Result<()>
    where
        C: MessageChannel + ?Sized,
    {
        while let Some(raw) = channel.recv().await? {
            match self.handle_connection_message(channel, session, &raw).await {
                Ok(()) => {}
                Err(e @ GatewayError::Transport(_)) => return Err(e),
                Err(_) => {}
            }
        }
        Ok(())
    }
}
