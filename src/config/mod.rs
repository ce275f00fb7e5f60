//! Gateway configuration
//!
//! Settings come from three layers, lowest first: built-in defaults, an
//! optional TOML file, then command-line flags (see [`crate::cli`]).
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8888"
//! runtime_binary = "podman"
//!
//! [os.alpine]
//! image = "alpine-demo"
//! tag = "latest"
//! dockerfile = "Dockerfile.alpine"
//! container_name = "alpine_demo_{}"
//! filter = "name=^/?{}$"
//! ```

mod registry;

pub use registry::{expand, OsProfile, OsRegistry, CENTOS, EXACT_NAME_FILTER, PLACEHOLDER};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::runtime::DEFAULT_EXEC_SHELL;

pub const DEFAULT_BIND: &str = "0.0.0.0:8888";

/// The `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the WebSocket listener binds to.
    pub bind: String,
    /// Initial logical directory of every session. Defaults to the
    /// process working directory at startup.
    pub base_dir: Option<PathBuf>,
    /// Docker-compatible CLI used for container operations.
    pub runtime_binary: String,
    /// Build context handed to `image build`.
    pub build_context: PathBuf,
    /// Shell that interprets exec commands inside the container.
    pub exec_shell: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            base_dir: None,
            runtime_binary: "docker".to_string(),
            build_context: PathBuf::from("."),
            exec_shell: DEFAULT_EXEC_SHELL.to_string(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerSettings,
    /// Extra or replacement OS rows, merged over the built-in registry.
    pub os: BTreeMap<String, OsProfile>,
}

impl GatewayConfig {
    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Built-in registry with this file's `[os.*]` rows applied.
    pub fn registry(&self) -> OsRegistry {
        let mut registry = OsRegistry::default();
        for (name, profile) in &self.os {
            registry.insert(name.clone(), profile.clone());
        }
        registry
    }

    /// The configured base directory, or the current working directory.
    pub fn base_dir(&self) -> Result<PathBuf> {
        match &self.server.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}
