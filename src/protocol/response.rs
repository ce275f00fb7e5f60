//! Outbound response shapes

use serde::Serialize;

use crate::error::Result;

/// Status code returned for CREATE.
pub const CREATED: i32 = 0;
/// Status code returned for DELETE.
pub const DELETED: i32 = 2;

/// A successful reply. The shape depends only on the request command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Lifecycle status codes, e.g. `[0]`.
    Status(Vec<i32>),
    /// Output lines of an EXEC, e.g. `["bin", "etc", ""]`.
    Lines(Vec<String>),
}

impl Response {
    pub fn created() -> Self {
        Response::Status(vec![CREATED])
    }

    pub fn deleted() -> Self {
        Response::Status(vec![DELETED])
    }

    /// Wire form of the response.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Split captured output into lines.
///
/// Unlike [`str::lines`], a terminal newline yields a trailing empty
/// element: `"bin\netc\n"` becomes `["bin", "etc", ""]`.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
