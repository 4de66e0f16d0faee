// Runtime settings: backend base URL and the local files the client reads.
// Defaults can be overridden from the environment and then from CLI flags.

use crate::error::{CatalogError, Result};
use crate::transport::parse_base_url;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://backend.localhost/api/v3";
pub const DEFAULT_SECRETS: &str = ".secrets";
pub const DEFAULT_PROPOSAL: &str = "proposal.json";
pub const DEFAULT_METADATA: &str = "metadata.json";

pub const ENV_BASE_URL: &str = "SCICAT_BASE_URL";
pub const ENV_SECRETS: &str = "SCICAT_SECRETS";
pub const ENV_PROPOSAL: &str = "SCICAT_PROPOSAL";
pub const ENV_METADATA: &str = "SCICAT_METADATA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the catalog API, without trailing slash.
    pub base_url: String,
    /// Two-line `key=value` credentials file.
    pub secrets_path: PathBuf,
    pub proposal_path: PathBuf,
    pub metadata_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secrets_path: PathBuf::from(DEFAULT_SECRETS),
            proposal_path: PathBuf::from(DEFAULT_PROPOSAL),
            metadata_path: PathBuf::from(DEFAULT_METADATA),
        }
    }
}

/// Optional values coming from the command line; `None` keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub secrets_path: Option<PathBuf>,
    pub proposal_path: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
}

impl Settings {
    /// Defaults overlaid with `SCICAT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable lookup supplied by the caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            settings.base_url = url;
        }
        if let Some(p) = lookup(ENV_SECRETS) {
            settings.secrets_path = PathBuf::from(p);
        }
        if let Some(p) = lookup(ENV_PROPOSAL) {
            settings.proposal_path = PathBuf::from(p);
        }
        if let Some(p) = lookup(ENV_METADATA) {
            settings.metadata_path = PathBuf::from(p);
        }
        settings.normalized()
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(p) = overrides.secrets_path {
            self.secrets_path = p;
        }
        if let Some(p) = overrides.proposal_path {
            self.proposal_path = p;
        }
        if let Some(p) = overrides.metadata_path {
            self.metadata_path = p;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CatalogError::InvalidConfig("base URL is empty".into()));
        }
        parse_base_url(trimmed)?;
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}
