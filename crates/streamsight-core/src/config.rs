//! Platform configuration and shared constants.
//!
//! All endpoint paths and fragment names live here so the gateway and the
//! directory never hard-code pieces of the platform contract.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Paths of the platform HTTP surface consumed by this workspace.
///
/// These are owned by the external backend; changing them here only breaks
/// the client.
pub mod paths {
    /// Engine service root.
    pub const ENGINE_BASE: &str = "/service/cep";
    /// Localized correlator documents (metadata + per-extension details).
    pub const ENGINE_LOCALE_BASE: &str = "/service/cep/apamacorrelator/EN";
    /// Metadata document listing the currently loaded extension files.
    pub const ENGINE_METADATA: &str = "/service/cep/apamacorrelator/EN/metadata.json";
    /// Engine diagnostic status document.
    pub const ENGINE_STATUS: &str = "/service/cep/diag/apamaCtrlStatus";
    /// Engine restart endpoint (PUT, empty body).
    pub const ENGINE_RESTART: &str = "/service/cep/restart";
    /// Companion microservice root.
    pub const BACKEND_BASE: &str = "/service/analytics-ext-service";
    /// Engine endpoint name below [`BACKEND_BASE`].
    pub const ENGINE_ENDPOINT: &str = "cep";
    /// Managed-object inventory.
    pub const INVENTORY: &str = "/inventory/managedObjects";
    /// Binary store for extension archives.
    pub const BINARIES: &str = "/inventory/binaries";
    /// Alarm collection.
    pub const ALARMS: &str = "/alarm/alarms";
    /// Event collection.
    pub const EVENTS: &str = "/event/events";
    /// Push channel for a managed object.
    pub fn managed_object_channel(id: &str) -> String {
        format!("/managedobjects/{id}")
    }
}

/// Fragment type marking inventory entries as analytics extensions.
pub const EXTENSION_FRAGMENT: &str = "pas_extension";

/// Suffix of per-extension files in the engine metadata document.
pub const METADATA_FILE_SUFFIX: &str = ".json";

/// Id prefix of blocks shipped with the engine; anything else is custom.
pub const BUILTIN_BLOCK_PREFIX: &str = "apama.";

/// Status value the engine reports while it is going down for a restart.
pub const ENGINE_STATUS_DOWN: &str = "Down";

/// Inventory page size used when listing extensions.
pub const EXTENSION_PAGE_SIZE: u32 = 100;

/// Page size of the monitoring alarm/event lists.
pub const MONITOR_PAGE_SIZE: u32 = 5;

/// Default sample-catalog listing endpoint (repository contents API).
pub const DEFAULT_SAMPLES_REPO: &str =
    "https://api.github.com/repos/streamsight/community-blocks/contents/samples/blocks";

/// Environment variable names understood by the CLI.
pub mod env_vars {
    pub const BASE_URL: &str = "STREAMSIGHT_BASE_URL";
    pub const USERNAME: &str = "STREAMSIGHT_USER";
    pub const PASSWORD: &str = "STREAMSIGHT_PASSWORD";
    pub const TOKEN: &str = "STREAMSIGHT_TOKEN";
    pub const SAMPLES_REPO: &str = "STREAMSIGHT_SAMPLES_REPO";
    pub const SAMPLES_TOKEN: &str = "STREAMSIGHT_SAMPLES_TOKEN";
    pub const LOG_JSON: &str = "STREAMSIGHT_LOG_JSON";
}

/// How the engine's managed-object id is resolved.
///
/// Chosen at configuration time; there is no runtime toggle between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineIdStrategy {
    /// Ask the companion microservice: `GET <backend>/<endpoint>/id`.
    #[default]
    DirectEndpoint,
    /// Read the diagnostic status document and look the microservice up in
    /// the inventory by name and application id.
    InventoryLookup,
}

/// Default request timeout in seconds.
fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the platform gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform base URL, e.g. `https://tenant.example.com`.
    pub base_url: String,
    /// Basic-auth username.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// Bearer token; takes precedence over basic auth when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Engine-id resolution strategy.
    #[serde(default)]
    pub engine_id_strategy: EngineIdStrategy,
    /// Sample-catalog listing endpoint.
    #[serde(default)]
    pub samples_repo: Option<String>,
    /// Token for the sample-catalog endpoint.
    #[serde(default)]
    pub samples_token: Option<String>,
}

impl PlatformConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            username: None,
            password: None,
            token: None,
            timeout_secs: default_timeout_secs(),
            engine_id_strategy: EngineIdStrategy::default(),
            samples_repo: None,
            samples_token: None,
        }
    }

    /// Set basic-auth credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the engine-id resolution strategy.
    pub fn with_engine_id_strategy(mut self, strategy: EngineIdStrategy) -> Self {
        self.engine_id_strategy = strategy;
        self
    }

    /// Set the sample-catalog endpoint.
    pub fn with_samples_repo(mut self, repo: impl Into<String>) -> Self {
        self.samples_repo = Some(repo.into());
        self
    }

    /// Get the timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sample-catalog endpoint, falling back to the public default.
    pub fn samples_repo(&self) -> &str {
        self.samples_repo.as_deref().unwrap_or(DEFAULT_SAMPLES_REPO)
    }

    /// Build a configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(env_vars::BASE_URL).map_err(|_| {
            Error::Config(format!("{} is not set", env_vars::BASE_URL))
        })?;
        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var(env_vars::TOKEN) {
            config = config.with_token(token);
        } else if let (Ok(user), Ok(pass)) = (
            std::env::var(env_vars::USERNAME),
            std::env::var(env_vars::PASSWORD),
        ) {
            config = config.with_basic_auth(user, pass);
        }
        if let Ok(repo) = std::env::var(env_vars::SAMPLES_REPO) {
            config = config.with_samples_repo(repo);
        }
        if let Ok(token) = std::env::var(env_vars::SAMPLES_TOKEN) {
            config.samples_token = Some(token);
        }
        Ok(config)
    }
}

/// Strip trailing slashes so path joining stays predictable.
pub fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://tenant.example.com/".to_string()),
            "https://tenant.example.com"
        );
        assert_eq!(
            normalize_base_url("https://tenant.example.com".to_string()),
            "https://tenant.example.com"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = PlatformConfig::new("https://tenant.example.com/")
            .with_basic_auth("alice", "secret")
            .with_timeout_secs(5)
            .with_engine_id_strategy(EngineIdStrategy::InventoryLookup);
        assert_eq!(config.base_url, "https://tenant.example.com");
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.engine_id_strategy, EngineIdStrategy::InventoryLookup);
        assert_eq!(config.samples_repo(), DEFAULT_SAMPLES_REPO);
    }

    #[test]
    fn test_managed_object_channel() {
        assert_eq!(paths::managed_object_channel("42"), "/managedobjects/42");
    }
}
