use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::LOCAL_CHAIN_ID;
use crate::infrastructure::WorkerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: Vec<EndpointConfig>,

    /// Deployed contracts file (chain id -> name -> address/abi)
    pub contracts_path: Option<String>,

    pub target_chain_id: u64,

    /// Index into the node's accounts used as the faucet
    pub faucet_account_index: usize,

    /// USD per native token; 0 disables the USD display
    pub native_currency_price: f64,

    pub log_limit: usize,
    pub poll_interval_ms: u64,
    pub storage_scan_limit: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            contracts_path: None,
            target_chain_id: LOCAL_CHAIN_ID,
            faucet_account_index: 0,
            native_currency_price: 0.0,
            log_limit: crate::modules::logs::DEFAULT_LOG_LIMIT,
            poll_interval_ms: 1000,
            storage_scan_limit: crate::modules::storage::DEFAULT_SCAN_LIMIT,
            receipt_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn worker(&self) -> WorkerConfig {
        WorkerConfig {
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs.max(1)),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(100)),
            log_limit: self.log_limit.max(1),
            storage_scan_limit: self.storage_scan_limit,
            faucet_account_index: self.faucet_account_index,
        }
    }

    /// Contracts file, defaulting to `contracts.json` in the working directory
    pub fn contracts_file(&self) -> PathBuf {
        self.contracts_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("contracts.json"))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

/// Invalid files fall back to the defaults
pub fn parse(content: &str) -> Config {
    match toml::from_str::<Config>(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("ignoring invalid config: {err}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SCAFFOLD_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("scaffold").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("scaffold").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "scaffold", "scaffold")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("scaffold"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("scaffold"));
    }
    directories::ProjectDirs::from("io", "scaffold", "scaffold")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("scaffold.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.target_chain_id, LOCAL_CHAIN_ID);
        assert_eq!(config.log_limit, 100);
        assert_eq!(config.contracts_file(), PathBuf::from("contracts.json"));
        assert_eq!(config.worker().poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_parse_full() {
        let config = parse(
            r#"
contracts_path = "deployments/contracts.json"
target_chain_id = 11155111
native_currency_price = 2500.0
log_limit = 20
receipt_timeout_secs = 5

[[endpoints]]
name = "local"
rpc = "http://127.0.0.1:8545"
"#,
        );
        assert_eq!(config.target_chain_id, 11155111);
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.endpoints[0].rpc.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(
            config.contracts_file(),
            PathBuf::from("deployments/contracts.json")
        );
        let worker = config.worker();
        assert_eq!(worker.log_limit, 20);
        assert_eq!(worker.receipt_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_falls_back() {
        let config = parse("log_limit = \"many\"");
        assert_eq!(config.log_limit, 100);
    }
}
