use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Full generateContent endpoint used unless overridden by config or flags.
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

fn default_http_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().expect("valid default address")
}

fn default_gemini_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP surface binds to.
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
    /// Full `…/models/<model>:generateContent` URL.
    #[serde(default = "default_gemini_endpoint")]
    pub gemini_endpoint: String,
    /// Location of the persisted property store; defaults to the per-user
    /// config directory when unset.
    #[serde(default)]
    pub properties_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            http_addr: default_http_addr(),
            gemini_endpoint: default_gemini_endpoint(),
            properties_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file if it exists, otherwise
    /// returns the defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Resolved property-store location.
    pub fn resolved_properties_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.properties_path {
            return Ok(path.clone());
        }
        advisor_core::props::default_properties_path("standards-advisor")
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http_addr.port(), 8080);
        assert!(config.gemini_endpoint.contains("gemini-2.5-flash:generateContent"));
        assert!(config.properties_path.is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.gemini_endpoint, DEFAULT_GEMINI_ENDPOINT);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "http_addr = \"0.0.0.0:9090\"\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.http_addr.port(), 9090);
        assert_eq!(config.gemini_endpoint, DEFAULT_GEMINI_ENDPOINT);
    }
}
