//! Build plan: which packages to fetch and where to look for them

use nbs_errors::{ConfigError, Error};
use nbs_types::RepositoryDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::constants::DEFAULT_CACHE_NAME;

/// A TOML build plan.
///
/// ```toml
/// packages = ["base-files", "bash"]
/// cache_name = "bootstrap"
///
/// [[repositories]]
/// distro = "debian"
/// release = "bookworm"
/// arch = "amd64"
/// components = ["main", "contrib"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub cache_name: Option<String>,
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,
}

impl BuildPlan {
    /// Parse a plan from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or does not match the
    /// plan layout.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load a plan from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it
    /// lists no packages.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let plan = Self::from_toml(&contents)?;
        if plan.packages.is_empty() {
            return Err(ConfigError::MissingField {
                field: "packages".to_string(),
            }
            .into());
        }
        Ok(plan)
    }

    /// Cache namespace, falling back to the default
    #[must_use]
    pub fn cache_name(&self) -> &str {
        self.cache_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CACHE_NAME)
    }
}
