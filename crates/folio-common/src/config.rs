use miette::Result;
use miette::miette;
use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use crate::error::{FolioError, ParseError};

pub const DEFAULT_DATASET: &str = "production";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";

/// Where posts and images come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanityConfig {
    /// Sanity project id. Empty means "not configured".
    pub project_id: String,
    /// Dataset name within the project.
    pub dataset: String,
    /// Dated API version, without the leading `v`.
    pub api_version: String,
    /// Query through the API CDN instead of the live API.
    pub use_cdn: bool,
}

impl SanityConfig {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader
            .load()
            .await
            .map(Self::normalized)
            .map_err(|e| miette!("Failed to load configuration: {e}"))
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver
            .save(self)
            .await
            .map_err(|e| miette!("Failed to save configuration: {e}"))
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// `SANITY_*` names win; the `VITE_SANITY_*` names the web frontend uses
    /// are read as fallbacks so one `.env` serves both.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::default().overlay_lookup(lookup)
    }

    /// Replaces the fields the process environment sets.
    pub fn overlay_env(self) -> Self {
        self.overlay_lookup(|name| std::env::var(name).ok())
    }

    /// Replaces the fields `lookup` has a non-blank value for; the rest keep
    /// their current values.
    pub fn overlay_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(&format!("SANITY_{name}"))
                .or_else(|| lookup(&format!("VITE_SANITY_{name}")))
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        Self {
            project_id: var("PROJECT_ID").unwrap_or(self.project_id),
            dataset: var("DATASET").unwrap_or(self.dataset),
            api_version: var("API_VERSION").unwrap_or(self.api_version),
            use_cdn: var("USE_CDN")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(self.use_cdn),
        }
    }

    /// Trims fields and restores defaults for blank ones.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let or_default = |value: String, default: String| {
            let value = value.trim();
            if value.is_empty() {
                default
            } else {
                value.to_owned()
            }
        };
        Self {
            project_id: self.project_id.trim().to_owned(),
            dataset: or_default(self.dataset, defaults.dataset),
            api_version: or_default(
                self.api_version.trim_start_matches('v').to_owned(),
                defaults.api_version,
            ),
            use_cdn: self.use_cdn,
        }
    }

    /// Whether a project id is present.
    pub fn is_configured(&self) -> bool {
        !self.project_id.trim().is_empty()
    }
}

impl Default for SanityConfig {
    /// Unconfigured project, `production` dataset, API version `2024-01-01`.
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: DEFAULT_DATASET.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            use_cdn: false,
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<
            SanityConfig,
            Box<dyn std::error::Error + Send + Sync + 'static>,
        >,
    > + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(
        &self,
        config: &SanityConfig,
    ) -> impl Future<Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>>
    + Send;
}

/// A [`Loader`] backed by the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvLoader;

impl Loader for EnvLoader {
    async fn load(
        &self,
    ) -> core::result::Result<SanityConfig, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        Ok(SanityConfig::from_env())
    }
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format follows the file extension: `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn unsupported(&self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        Box::new(FolioError::Config(format!(
            "unsupported config file format: {}",
            self.path.display()
        )))
    }
}

impl Loader for FileStore {
    async fn load(
        &self,
    ) -> core::result::Result<SanityConfig, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let text = std::fs::read_to_string(&self.path)?;
                Ok(serde_json::from_str(&text).map_err(ParseError::from)?)
            }
            Some("toml") => {
                let text = std::fs::read_to_string(&self.path)?;
                Ok(toml::from_str(&text).map_err(ParseError::from)?)
            }
            _ => Err(self.unsupported()),
        }
    }
}

impl Saver for FileStore {
    async fn save(
        &self,
        config: &SanityConfig,
    ) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(self.unsupported()),
        }
    }
}
