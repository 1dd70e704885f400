//! Configuration module
//!
//! This module handles configuration loading from TOML files, `.env` files
//! and environment variables, and provides structured configuration types.

use crate::errors::{MplxError, MplxResult};
use crate::rpc::ConfirmationLevel;
use crate::tx_builder::ConfirmOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_RPC_URL: &str = "MPLX_RPC_URL";
pub const ENV_COMMITMENT: &str = "MPLX_COMMITMENT";
pub const ENV_KEYPAIR_PATH: &str = "MPLX_KEYPAIR_PATH";
pub const ENV_CONFIRM_TIMEOUT_SECS: &str = "MPLX_CONFIRM_TIMEOUT_SECS";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Confirmation waits for submitted transactions
    #[serde(default)]
    pub confirm: ConfirmConfig,

    /// Off-chain JSON metadata fetching
    #[serde(default)]
    pub json_metadata: JsonMetadataConfig,

    /// Monitoring and logging
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,

    /// Commitment used for reads
    #[serde(default)]
    pub commitment: ConfirmationLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to keypair file; an ephemeral identity is used when unset
    #[serde(default)]
    pub keypair_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmConfig {
    #[serde(default)]
    pub level: ConfirmationLevel,

    #[serde(default = "default_confirm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMetadataConfig {
    /// HTTP timeout in seconds
    #[serde(default = "default_json_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Print Prometheus metrics after each CLI command
    #[serde(default)]
    pub print_metrics: bool,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

// Default value functions
fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_rpc_timeout() -> u64 {
    30
}
fn default_confirm_timeout() -> u64 {
    60
}
fn default_poll_interval() -> u64 {
    500
}
fn default_json_timeout() -> u64 {
    10
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_rpc_timeout(),
            commitment: ConfirmationLevel::default(),
        }
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            level: ConfirmationLevel::default(),
            timeout_secs: default_confirm_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for JsonMetadataConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_json_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            wallet: WalletConfig::default(),
            confirm: ConfirmConfig::default(),
            json_metadata: JsonMetadataConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` (or defaults when `None`), then `.env` and environment overrides, then validate
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MPLX_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> MplxResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc.url = url;
        }
        if let Some(commitment) = lookup(ENV_COMMITMENT) {
            self.rpc.commitment = commitment.parse().map_err(|_| {
                MplxError::Configuration(format!("{}: unknown commitment '{}'", ENV_COMMITMENT, commitment))
            })?;
        }
        if let Some(path) = lookup(ENV_KEYPAIR_PATH) {
            self.wallet.keypair_path = Some(path);
        }
        if let Some(secs) = lookup(ENV_CONFIRM_TIMEOUT_SECS) {
            self.confirm.timeout_secs = secs.parse().map_err(|_| {
                MplxError::Configuration(format!(
                    "{}: expected whole seconds, got '{}'",
                    ENV_CONFIRM_TIMEOUT_SECS, secs
                ))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> MplxResult<()> {
        if !(self.rpc.url.starts_with("http://") || self.rpc.url.starts_with("https://")) {
            return Err(MplxError::Configuration(format!(
                "rpc.url must be an http(s) URL, got '{}'",
                self.rpc.url
            )));
        }
        if self.rpc.timeout_secs == 0 {
            return Err(MplxError::Configuration("rpc.timeout_secs must be > 0".to_string()));
        }
        if self.confirm.timeout_secs == 0 {
            return Err(MplxError::Configuration("confirm.timeout_secs must be > 0".to_string()));
        }
        if self.confirm.poll_interval_ms == 0 {
            return Err(MplxError::Configuration(
                "confirm.poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.json_metadata.timeout_secs == 0 {
            return Err(MplxError::Configuration(
                "json_metadata.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            level: self.confirm.level,
            timeout: Duration::from_secs(self.confirm.timeout_secs),
            poll_interval: Duration::from_millis(self.confirm.poll_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.confirm_options(), ConfirmOptions::default());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rpc]
url = "http://127.0.0.1:8899"
commitment = "finalized"

[confirm]
timeout_secs = 15
"#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(config.rpc.commitment, ConfirmationLevel::Finalized);
        assert_eq!(config.rpc.timeout_secs, 30);
        assert_eq!(config.confirm.timeout_secs, 15);
        assert_eq!(config.confirm.poll_interval_ms, 500);
        assert_eq!(config.wallet.keypair_path, None);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_RPC_URL, "https://devnet.example"),
            (ENV_COMMITMENT, "processed"),
            (ENV_KEYPAIR_PATH, "/tmp/id.json"),
            (ENV_CONFIRM_TIMEOUT_SECS, "90"),
        ]);

        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.rpc.url, "https://devnet.example");
        assert_eq!(config.rpc.commitment, ConfirmationLevel::Processed);
        assert_eq!(config.wallet.keypair_path.as_deref(), Some("/tmp/id.json"));
        assert_eq!(config.confirm_options().timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_bad_overrides_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == ENV_COMMITMENT).then(|| "eventually".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("unknown commitment"));

        let err = config
            .apply_overrides(|name| (name == ENV_CONFIRM_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, MplxError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.rpc.url = "ftp://nope".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.confirm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
