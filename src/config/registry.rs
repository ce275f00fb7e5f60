//! Operating-system profiles
//!
//! Each supported OS variant is a single row of naming data. The handlers
//! derive every address they need (image reference, container name, filter
//! expression) from the row plus the caller's instance hash.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder substituted by [`expand`].
pub const PLACEHOLDER: &str = "{}";

pub const CENTOS: &str = "centos";

/// Matches exactly one container name, with or without docker's leading `/`.
pub const EXACT_NAME_FILTER: &str = "name=^/?{}$";

/// Naming data for one OS variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsProfile {
    /// Image name built for this OS.
    pub image: String,
    /// Image tag.
    pub tag: String,
    /// Build-definition file handed to the runtime.
    pub dockerfile: String,
    /// Container name template, `{}` is the instance hash.
    pub container_name: String,
    /// Filter template, `{}` is the regex-escaped container name. Docker
    /// matches `name=` filters as unanchored regexes, so templates should
    /// anchor the name.
    pub filter: String,
}

impl OsProfile {
    pub fn centos() -> Self {
        Self {
            image: "centos-demo".to_string(),
            tag: "latest".to_string(),
            dockerfile: "Dockerfile.centos".to_string(),
            container_name: "centos_demo_{}".to_string(),
            filter: EXACT_NAME_FILTER.to_string(),
        }
    }

    pub fn container_name_for(&self, instance_hash: &str) -> String {
        expand(&self.container_name, instance_hash)
    }

    pub fn filter_for(&self, container_name: &str) -> String {
        expand(&self.filter, &regex::escape(container_name))
    }
}

/// Replace every `{}` in `template` with `value`.
pub fn expand(template: &str, value: &str) -> String {
    template.replace(PLACEHOLDER, value)
}

/// The set of supported OS variants, keyed by the `instance_os` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRegistry {
    profiles: BTreeMap<String, OsProfile>,
}

impl Default for OsRegistry {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(CENTOS.to_string(), OsProfile::centos());
        Self { profiles }
    }
}

impl OsRegistry {
    /// A registry with no rows at all.
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Insert or replace a row.
    pub fn insert(&mut self, os: impl Into<String>, profile: OsProfile) {
        self.profiles.insert(os.into(), profile);
    }

    pub fn get(&self, os: &str) -> Option<&OsProfile> {
        self.profiles.get(os)
    }

    pub fn contains(&self, os: &str) -> bool {
        self.profiles.contains_key(os)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_centos() {
        let registry = OsRegistry::default();
        assert!(registry.contains(CENTOS));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_addressing_is_deterministic() {
        let profile = OsProfile::centos();
        let a = profile.container_name_for("h1");
        let b = profile.container_name_for("h1");
        assert_eq!(a, "centos_demo_h1");
        assert_eq!(a, b);
        assert_eq!(profile.filter_for(&a), "name=^/?centos_demo_h1$");
    }

    #[test]
    fn test_filter_escapes_name() {
        let profile = OsProfile::centos();
        assert_eq!(profile.filter_for("centos_demo_a.b"), r"name=^/?centos_demo_a\.b$");
    }

    #[test]
    fn test_insert_replaces_row() {
        let mut registry = OsRegistry::default();
        let mut custom = OsProfile::centos();
        custom.tag = "7".to_string();
        registry.insert(CENTOS, custom);
        assert_eq!(registry.get(CENTOS).unwrap().tag, "7");
        assert_eq!(registry.len(), 1);
    }
}
