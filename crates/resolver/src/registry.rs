//! Mirror lists per distribution

use std::collections::BTreeMap;

const DEBIAN_MIRRORS: &[&str] = &[
    "https://ftp.debian.org/debian",
    "https://uk.mirrors.clouvider.net/debian",
    "https://atl.mirrors.clouvider.net/debian",
    "https://ftp.tu-clausthal.de/debian",
];

const UBUNTU_MIRRORS: &[&str] = &[
    "https://archive.ubuntu.com/ubuntu",
    "https://security.ubuntu.com/ubuntu",
    "https://mirrors.kernel.org/ubuntu",
];

const DEVUAN_MIRRORS: &[&str] = &["http://deb.devuan.org/merged"];

const NITRUX_MIRRORS: &[&str] = &["https://packagecloud.io/nitrux/mauikit/debian"];

/// Maps a distribution name to the mirrors that serve it.
///
/// Lookups are case-insensitive. The registry is read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRegistry {
    mirrors: BTreeMap<String, Vec<String>>,
}

impl MirrorRegistry {
    /// Registry with no distributions
    #[must_use]
    pub fn empty() -> Self {
        Self {
            mirrors: BTreeMap::new(),
        }
    }

    /// Registry with the built-in distributions
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (distro, mirrors) in [
            ("debian", DEBIAN_MIRRORS),
            ("ubuntu", UBUNTU_MIRRORS),
            ("devuan", DEVUAN_MIRRORS),
            ("nitrux", NITRUX_MIRRORS),
        ] {
            registry.insert(distro, mirrors.iter().map(|m| (*m).to_string()).collect());
        }
        registry
    }

    /// Built-in registry with configured lists layered on top.
    ///
    /// A configured distro replaces the built-in list of the same name; an
    /// empty configured list removes the distro.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        let mut registry = Self::builtin();
        for (distro, mirrors) in overrides {
            if mirrors.is_empty() {
                registry.mirrors.remove(&distro.to_ascii_lowercase());
            } else {
                registry.insert(distro, mirrors.clone());
            }
        }
        registry
    }

    /// Add or replace the mirror list of `distro`
    pub fn insert(&mut self, distro: &str, mirrors: Vec<String>) {
        self.mirrors.insert(distro.trim().to_ascii_lowercase(), mirrors);
    }

    /// Mirrors serving `distro`, `None` for unknown distributions
    #[must_use]
    pub fn mirrors_for(&self, distro: &str) -> Option<&[String]> {
        self.mirrors
            .get(&distro.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .filter(|mirrors| !mirrors.is_empty())
    }

    /// Known distributions in name order
    pub fn distros(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.mirrors
            .iter()
            .map(|(distro, mirrors)| (distro.as_str(), mirrors.as_slice()))
    }
}

impl Default for MirrorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
