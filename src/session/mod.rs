//! Session state
//!
//! A session lives as long as one transport connection. It owns the only
//! mutable state in the gateway, the logical working directory, and is
//! never shared between connections.

pub mod classifier;
pub mod directory;

pub use classifier::parse_cd;
pub use directory::{DirectoryChange, DirectoryTracker};

use std::path::PathBuf;

use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    messages: u64,
    directory: DirectoryTracker,
}

impl Session {
    pub fn new(id: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            started_at: Utc::now(),
            messages: 0,
            directory: DirectoryTracker::new(base_dir),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of messages dispatched on this session.
    pub fn messages(&self) -> u64 {
        self.messages
    }

    pub(crate) fn record_message(&mut self) {
        self.messages += 1;
    }

    pub fn directory(&self) -> &DirectoryTracker {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut DirectoryTracker {
        &mut self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_diagnostics() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let before = Utc::now();
        let mut session = Session::new("peer", tmp.path());

        session.record_message();
        session.directory_mut().change_directory("sub");
        session.directory_mut().change_directory("missing");

        assert_eq!(session.id(), "peer");
        assert!(session.started_at() >= before);
        assert!(session.started_at() <= Utc::now());
        assert_eq!(session.messages(), 1);
        assert_eq!(session.directory().history().len(), 1);
        assert_eq!(
            session.directory().history()[0].to,
            tmp.path().join("sub").canonicalize().unwrap()
        );
    }
}
