//! Message protocol
//!
//! Requests are JSON objects:
//!
//! ```json
//! { "instance_os": "centos", "command": "EXEC",
//!   "instance_hash": "h1", "exec_command": "ls" }
//! ```
//!
//! Successful replies are JSON arrays (`[0]`, `[2]`, or output lines).
//! Failures are sent as plain text.

pub mod message;
pub mod response;

pub use message::{decode, is_valid_instance_hash, validate, Command, Request};
pub use response::{parse_lines, Response, CREATED, DELETED};
