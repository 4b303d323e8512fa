//! Debian package versions
//!
//! Versions have the form `[epoch:]upstream[-revision]` and are ordered with
//! the dpkg algorithm: epochs numerically, then upstream and revision with
//! alternating non-digit/digit runs. In non-digit runs letters sort before
//! other characters and `~` sorts before anything, even the end of the string.

use nbs_errors::VersionError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed, totally ordered Debian version.
///
/// Equality follows the ordering, so `1.0` and `1.0-0` are the same version.
#[derive(Debug, Clone)]
pub struct DebVersion {
    epoch: u32,
    upstream: String,
    revision: String,
    raw: String,
}

impl DebVersion {
    /// Parse a version string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, the epoch is not numeric, or
    /// the upstream or revision parts contain characters Debian does not allow.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(VersionError::InvalidVersion {
                input: input.to_string(),
            });
        }

        let (epoch, rest) = match raw.split_once(':') {
            Some((epoch, rest)) => {
                if epoch.is_empty() || !epoch.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::InvalidEpoch {
                        input: raw.to_string(),
                    });
                }
                let epoch = epoch.parse::<u32>().map_err(|_| VersionError::InvalidEpoch {
                    input: raw.to_string(),
                })?;
                (epoch, rest)
            }
            None => (0, raw),
        };

        // A trailing part that is not a valid revision stays in the upstream
        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision))
                if !revision.is_empty()
                    && revision
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'~')) =>
            {
                (upstream, revision)
            }
            _ => (rest, ""),
        };

        let valid_upstream = !upstream.is_empty()
            && upstream
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'~' | b'-' | b':'));
        if !valid_upstream {
            return Err(VersionError::InvalidVersion {
                input: raw.to_string(),
            });
        }

        Ok(Self {
            epoch,
            upstream: upstream.to_string(),
            revision: revision.to_string(),
            raw: raw.to_string(),
        })
    }

    #[must_use]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    #[must_use]
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Debian revision, empty for native packages
    #[must_use]
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// The string this version was parsed from
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Weight of a single character inside a non-digit run.
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

/// dpkg's `verrevcmp`, applied to an upstream or revision fragment.
fn compare_fragment(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while i < a.len() && a[i].is_ascii_digit() && j < b.len() && b[j].is_ascii_digit() {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        if i < a.len() && a[i].is_ascii_digit() {
            return Ordering::Greater;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

impl Ord for DebVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_fragment(&self.upstream, &other.upstream))
            .then_with(|| compare_fragment(&self.revision, &other.revision))
    }
}

impl PartialOrd for DebVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DebVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DebVersion {}

impl FromStr for DebVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DebVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for DebVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for DebVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
