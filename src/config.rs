use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::clients::itunes::{CatalogConfig, DEFAULT_FALLBACK_TERMS};
use crate::clients::retry::RetryPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub catalog: CatalogSettings,

    pub retry: RetryConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/podseek.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// Public origin of this application, used in logs and CORS defaults.
    pub base_url: String,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub search_url: String,

    pub lookup_url: String,

    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    pub country: String,

    pub lang: String,

    pub user_agent: String,

    /// Generic terms tried in order when the original term keeps failing.
    pub fallback_terms: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_url: "https://itunes.apple.com/search".to_string(),
            lookup_url: "https://itunes.apple.com/lookup".to_string(),
            request_timeout_seconds: 10,
            country: "US".to_string(),
            lang: "en_us".to_string(),
            user_agent: "Podseek/1.0".to_string(),
            fallback_terms: DEFAULT_FALLBACK_TERMS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,

    pub initial_delay_ms: u64,

    /// Growth factor between consecutive delays (observed 1.5 - 2.0)
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1000,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `PODSEEK_DATABASE_URL` (or `DATABASE_URL`) and `PODSEEK_BASE_URL`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("PODSEEK_DATABASE_URL").or_else(|| non_empty("DATABASE_URL"))
        {
            self.general.database_url = url;
        }

        if let Some(base_url) = non_empty("PODSEEK_BASE_URL") {
            self.server.base_url = base_url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("podseek").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".podseek").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }

        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            anyhow::bail!("retry.multiplier must be >= 1.0");
        }

        if !(1..=60).contains(&self.catalog.request_timeout_seconds) {
            anyhow::bail!("catalog.request_timeout_seconds must be between 1 and 60");
        }

        url::Url::parse(&self.catalog.search_url).context("Invalid catalog.search_url")?;
        url::Url::parse(&self.catalog.lookup_url).context("Invalid catalog.lookup_url")?;

        if self.catalog.fallback_terms.iter().all(|t| t.trim().is_empty()) {
            anyhow::bail!("catalog.fallback_terms must contain at least one term");
        }

        Ok(())
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            multiplier: self.retry.multiplier,
        }
    }

    /// Builds the immutable settings handed to the catalog client.
    #[must_use]
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            search_url: self.catalog.search_url.clone(),
            lookup_url: self.catalog.lookup_url.clone(),
            timeout: Duration::from_secs(self.catalog.request_timeout_seconds),
            country: self.catalog.country.clone(),
            lang: self.catalog.lang.clone(),
            user_agent: self.catalog.user_agent.clone(),
            retry: self.retry_policy(),
            fallback_terms: self
                .catalog
                .fallback_terms
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}
