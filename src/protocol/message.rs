//! Inbound request schema

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

pub const INSTANCE_OS: &str = "instance_os";
pub const COMMAND: &str = "command";
pub const INSTANCE_HASH: &str = "instance_hash";
pub const EXEC_COMMAND: &str = "exec_command";

const MANDATORY_FIELDS: [&str; 3] = [INSTANCE_OS, COMMAND, INSTANCE_HASH];

/// A decoded request. `instance_os` and `command` stay raw strings until the
/// dispatcher resolves them, so unsupported values can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub instance_os: String,
    pub command: String,
    pub instance_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_command: Option<String>,
}

/// Supported request commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Create,
    Exec,
    Delete,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Create, Command::Exec, Command::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Create => "CREATE",
            Command::Exec => "EXEC",
            Command::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GatewayError::UnsupportedCommand(s.to_string()))
    }
}

/// Check that `raw` carries the three mandatory fields.
///
/// Unparseable input is a hard [`GatewayError::Decode`]. Parseable input
/// that is not an object, or lacks any mandatory field (absent, not a
/// string, or empty), is a soft `false`.
pub fn validate(raw: &str) -> Result<bool> {
    let value: Value = serde_json::from_str(raw)?;
    let Some(object) = value.as_object() else {
        return Ok(false);
    };

    Ok(MANDATORY_FIELDS.iter().all(|field| {
        object
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }))
}

/// Characters docker accepts in a container name.
const INSTANCE_HASH_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.-]*$";

fn instance_hash_regex() -> &'static Regex {
    static HASH: OnceLock<Regex> = OnceLock::new();
    HASH.get_or_init(|| Regex::new(INSTANCE_HASH_PATTERN).expect("hash pattern is valid"))
}

/// Whether `hash` can be embedded in a container name as-is.
pub fn is_valid_instance_hash(hash: &str) -> bool {
    instance_hash_regex().is_match(hash)
}

/// Decode `raw` into a [`Request`]. Call [`validate`] first.
pub fn decode(raw: &str) -> Result<Request> {
    Ok(serde_json::from_str(raw)?)
}
