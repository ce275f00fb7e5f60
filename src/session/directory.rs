//! Per-session logical working directory
//!
//! The tracker resolves directory changes against its own state and the
//! local filesystem. It never calls `set_current_dir`, so any number of
//! sessions can share the process safely.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GatewayError, Result};

/// A successful directory change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryChange {
    pub from: PathBuf,
    pub to: PathBuf,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DirectoryTracker {
    base: PathBuf,
    current: PathBuf,
    history: Vec<DirectoryChange>,
}

impl DirectoryTracker {
    /// Start tracking at `base`. A relative base is anchored at the
    /// process working directory once, here.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let base = if base.is_absolute() {
            base
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&base))
                .unwrap_or(base)
        };
        let base = base.canonicalize().unwrap_or(base);

        Self {
            current: base.clone(),
            base,
            history: Vec::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The session's logical current directory.
    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn history(&self) -> &[DirectoryChange] {
        &self.history
    }

    /// Resolve `target` against the current directory without touching
    /// the filesystem.
    pub fn resolve_path(&self, target: &str) -> PathBuf {
        let path = Path::new(target);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current.join(path)
        }
    }

    /// Resolve `target` to an existing directory.
    pub fn locate(&self, target: &str) -> Result<PathBuf> {
        let path = self.resolve_path(target);
        let canonical = path.canonicalize()?;

        if !canonical.is_dir() {
            return Err(GatewayError::Generic(format!(
                "'{}' is not a directory",
                canonical.display()
            )));
        }

        Ok(canonical)
    }

    /// Move to `target` if it names an existing directory. A failed change
    /// leaves the state untouched and is not an error. Returns the current
    /// directory afterwards.
    pub fn change_directory(&mut self, target: &str) -> &Path {
        match self.locate(target) {
            Ok(dir) => {
                self.history.push(DirectoryChange {
                    from: self.current.clone(),
                    to: dir.clone(),
                    timestamp: Utc::now(),
                });
                self.current = dir;
            }
            Err(e) => {
                debug!(path = target, error = %e, "no such directory, keeping current");
            }
        }
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tracker(dir: &TempDir) -> DirectoryTracker {
        DirectoryTracker::new(dir.path())
    }

    #[test]
    fn test_starts_at_base() {
        let tmp = TempDir::new().unwrap();
        let t = tracker(&tmp);
        assert_eq!(t.current(), tmp.path().canonicalize().unwrap());
        assert_eq!(t.current(), t.base());
    }

    #[test]
    fn test_relative_change() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        let mut t = tracker(&tmp);

        let now = t.change_directory("a/b").to_path_buf();
        assert_eq!(now, tmp.path().join("a/b").canonicalize().unwrap());

        let now = t.change_directory("..").to_path_buf();
        assert_eq!(now, tmp.path().join("a").canonicalize().unwrap());
        assert_eq!(t.history().len(), 2);
    }

    #[test]
    fn test_absolute_change() {
        let tmp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let mut t = tracker(&tmp);

        t.change_directory(other.path().to_str().unwrap());
        assert_eq!(t.current(), other.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        let mut t = tracker(&tmp);
        let before = t.current().to_path_buf();

        let after = t.change_directory("does/not/exist").to_path_buf();
        assert_eq!(before, after);
        assert!(t.history().is_empty());
    }

    #[test]
    fn test_file_target_is_noop() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        let mut t = tracker(&tmp);
        let before = t.current().to_path_buf();

        t.change_directory("notes.txt");
        assert_eq!(t.current(), before);
    }

    #[test]
    fn test_process_cwd_untouched() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        let cwd = std::env::current_dir().unwrap();

        let mut t = tracker(&tmp);
        t.change_directory("sub");
        assert_eq!(std::env::current_dir().unwrap(), cwd);
    }
}
