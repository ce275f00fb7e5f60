//! Shellgate - a WebSocket gateway to per-user docker containers
//!
//! Clients send JSON requests naming an OS variant, a command and an
//! instance hash. The gateway builds and starts a container for `CREATE`,
//! tears it down for `DELETE`, and runs shell commands inside it for
//! `EXEC`. Each connection tracks a logical working directory that `cd`
//! commands move without touching the container.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shellgate::{Dispatcher, MemoryRuntime, OsRegistry, Session};
//!
//! # async fn demo() -> shellgate::Result<()> {
//! let dispatcher = Dispatcher::new(OsRegistry::default(), Arc::new(MemoryRuntime::new()));
//! let mut session = Session::new("local", ".");
//! let reply = dispatcher
//!     .dispatch(&mut session, r#"{"instance_os":"centos","command":"CREATE","instance_hash":"abc"}"#)
//!     .await?;
//! println!("{}", reply.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod output;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod session;

pub use config::{GatewayConfig, OsProfile, OsRegistry};
pub use dispatch::{Dispatcher, MemoryChannel, MessageChannel, Plan};
pub use error::{GatewayError, Result};
pub use instance::{Instance, InstanceHandler};
pub use output::{format_output, OutputFormat, Report};
pub use protocol::{Command, Request, Response};
pub use runtime::{ContainerRuntime, DockerCli, MemoryRuntime, RuntimeError};
pub use server::Server;
pub use session::Session;
