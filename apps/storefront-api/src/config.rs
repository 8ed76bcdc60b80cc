//! Storefront API configuration.
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file: `--config <path>`, else `TOOHOT_CONFIG`, else
//!    `storefront.toml` in the platform config directory
//! 3. Environment variables
//!
//! ## Example Config File
//! ```toml
//! environment = "production"
//! port = 8080
//! database_url = "/var/lib/toohot/toohot.db"
//! tax_rate_bps = 700
//! order_prefix = "TH"
//! enforce_status_transitions = true
//! stripe_publishable_key = "pk_live_..."
//! ```
//!
//! Payment keys are usually supplied through the environment rather than the
//! file. They are checked when first used, not at startup, so the menu stays
//! browsable on a box without keys.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use toohot_core::validation::validate_tax_rate_bps;
use toohot_core::{TaxRate, DEFAULT_ORDER_NUMBER_PREFIX, DEFAULT_TAX_RATE_BPS};
use toohot_payments::stripe::DEFAULT_API_BASE;
use toohot_payments::StripeConfig;

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read config file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Environment
// =============================================================================

/// Deployment environment. Controls whether error details reach clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue("TOOHOT_ENV".to_string())),
        }
    }
}

// =============================================================================
// StorefrontConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite file path. A `sqlite://` prefix is accepted and stripped.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Combined sales tax in basis points (700 = 7%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    #[serde(default = "default_order_prefix")]
    pub order_prefix: String,

    /// Reject admin status changes outside the transition table.
    #[serde(default)]
    pub enforce_status_transitions: bool,

    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    #[serde(default)]
    pub stripe_publishable_key: Option<String>,

    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: String,

    /// Sent as `Stripe-Version` when set.
    #[serde(default)]
    pub stripe_api_version: Option<String>,

    #[serde(default)]
    pub analytics_id: Option<String>,

    #[serde(default = "default_read_timeout_secs")]
    pub provider_read_timeout_secs: u64,

    #[serde(default = "default_write_timeout_secs")]
    pub provider_write_timeout_secs: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "./toohot.db".to_string()
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

fn default_order_prefix() -> String {
    DEFAULT_ORDER_NUMBER_PREFIX.to_string()
}

fn default_stripe_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_read_timeout_secs() -> u64 {
    10
}

fn default_write_timeout_secs() -> u64 {
    30
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            environment: Environment::default(),
            bind_address: default_bind_address(),
            port: default_port(),
            database_url: default_database_url(),
            tax_rate_bps: default_tax_rate_bps(),
            order_prefix: default_order_prefix(),
            enforce_status_transitions: false,
            stripe_secret_key: None,
            stripe_publishable_key: None,
            stripe_api_base: default_stripe_api_base(),
            stripe_api_version: None,
            analytics_id: None,
            provider_read_timeout_secs: default_read_timeout_secs(),
            provider_write_timeout_secs: default_write_timeout_secs(),
        }
    }
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let path = config_path
            .or_else(|| std::env::var("TOOHOT_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading storefront config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("TOOHOT_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(addr) = lookup("TOOHOT_BIND_ADDR") {
            self.bind_address = addr;
        }
        if let Some(port) = lookup("TOOHOT_PORT") {
            self.port = parse_var("TOOHOT_PORT", &port)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(bps) = lookup("TOOHOT_TAX_RATE_BPS") {
            self.tax_rate_bps = parse_var("TOOHOT_TAX_RATE_BPS", &bps)?;
        }
        if let Some(prefix) = lookup("TOOHOT_ORDER_PREFIX") {
            self.order_prefix = prefix;
        }
        if let Some(flag) = lookup("TOOHOT_ENFORCE_TRANSITIONS") {
            self.enforce_status_transitions = parse_var("TOOHOT_ENFORCE_TRANSITIONS", &flag)?;
        }
        if let Some(key) = lookup("STRIPE_SECRET_KEY") {
            self.stripe_secret_key = Some(key);
        }
        if let Some(key) = lookup("STRIPE_PUBLISHABLE_KEY") {
            self.stripe_publishable_key = Some(key);
        }
        if let Some(base) = lookup("STRIPE_API_BASE") {
            self.stripe_api_base = base;
        }
        if let Some(id) = lookup("GA_MEASUREMENT_ID") {
            self.analytics_id = Some(id);
        }
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }

        validate_tax_rate_bps(self.tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("tax_rate_bps".to_string()))?;

        if self.order_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("order_prefix".to_string()));
        }

        Url::parse(&self.stripe_api_base)
            .map_err(|_| ConfigError::InvalidValue("stripe_api_base".to_string()))?;

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "toohot", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn bind_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Filesystem path of the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        let url = self.database_url.as_str();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        PathBuf::from(path)
    }

    pub fn payment_secret_key(&self) -> ConfigResult<&str> {
        non_empty(self.stripe_secret_key.as_deref())
            .ok_or_else(|| ConfigError::MissingRequired("STRIPE_SECRET_KEY".to_string()))
    }

    pub fn publishable_key(&self) -> ConfigResult<&str> {
        non_empty(self.stripe_publishable_key.as_deref())
            .ok_or_else(|| ConfigError::MissingRequired("STRIPE_PUBLISHABLE_KEY".to_string()))
    }

    /// Builds the payment client configuration. Requires the secret key.
    pub fn stripe_config(&self) -> ConfigResult<StripeConfig> {
        let secret = self.payment_secret_key()?;
        let mut config = StripeConfig::new(secret)
            .and_then(|c| c.api_base(&self.stripe_api_base))
            .map_err(|_| ConfigError::InvalidValue("stripe_api_base".to_string()))?
            .read_timeout(Duration::from_secs(self.provider_read_timeout_secs))
            .write_timeout(Duration::from_secs(self.provider_write_timeout_secs));

        if let Some(version) = &self.stripe_api_version {
            config = config.api_version(version.clone());
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.tax_rate_bps, 700);
        assert_eq!(config.order_prefix, "TH");
        assert!(!config.enforce_status_transitions);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StorefrontConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("TOOHOT_ENV", "production"),
                ("TOOHOT_PORT", "8080"),
                ("TOOHOT_TAX_RATE_BPS", "825"),
                ("TOOHOT_ENFORCE_TRANSITIONS", "true"),
                ("DATABASE_URL", "sqlite:///var/lib/toohot.db"),
            ]))
            .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.tax_rate().bps(), 825);
        assert!(config.enforce_status_transitions);
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/toohot.db"));
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = StorefrontConfig::default();
        let result = config.apply_overrides(lookup_from(&[("TOOHOT_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = StorefrontConfig::default();
        config.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.order_prefix = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.stripe_api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keys_checked_at_first_use() {
        let mut config = StorefrontConfig::default();
        assert!(matches!(
            config.payment_secret_key(),
            Err(ConfigError::MissingRequired(_))
        ));
        assert!(config.stripe_config().is_err());

        config.stripe_secret_key = Some("sk_test_123".to_string());
        let stripe = config.stripe_config().unwrap();
        assert_eq!(stripe.read_timeout, Duration::from_secs(10));
        assert_eq!(stripe.write_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_toml_parsing_fills_defaults() {
        let config: StorefrontConfig = toml::from_str(
            r#"
            environment = "production"
            port = 8080
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.tax_rate_bps, 700);
        assert_eq!(config.stripe_api_base, "https://api.stripe.com");
    }
}
