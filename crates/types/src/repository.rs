//! Repository descriptors supplied per build plan

use serde::{Deserialize, Serialize};

/// One repository a package may be found in.
///
/// Regular descriptors name a distribution whose mirrors come from the
/// registry. A descriptor carrying `ppa = "owner/name"` points at a single
/// personal package archive instead and is resolved on its own path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(default)]
    pub distro: String,
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default = "default_components")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppa: Option<String>,
}

fn default_components() -> Vec<String> {
    vec!["main".to_string()]
}

impl Default for RepositoryDescriptor {
    fn default() -> Self {
        Self {
            distro: String::new(),
            release: String::new(),
            arch: String::new(),
            components: default_components(),
            ppa: None,
        }
    }
}

impl RepositoryDescriptor {
    /// Create a distribution descriptor with the `main` component
    pub fn new(
        distro: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            distro: distro.into(),
            release: release.into(),
            arch: arch.into(),
            ..Self::default()
        }
    }

    /// Create a PPA descriptor for `owner/name`
    pub fn ppa(
        id: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            release: release.into(),
            arch: arch.into(),
            ppa: Some(id.into()),
            ..Self::default()
        }
    }

    /// Replace the component list
    #[must_use]
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_ppa(&self) -> bool {
        self.ppa.is_some()
    }

    /// Names of required fields that are empty
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.distro.trim().is_empty() && !self.is_ppa() {
            missing.push("distro");
        }
        if self.release.trim().is_empty() {
            missing.push("release");
        }
        if self.arch.trim().is_empty() {
            missing.push("arch");
        }
        missing
    }

    /// Split a PPA identifier into `(owner, name)`
    #[must_use]
    pub fn ppa_parts(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.ppa.as_deref()?.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((owner, name))
    }
}
