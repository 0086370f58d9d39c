//! Configuration management for fleetcam.
//!
//! Provides configuration loading, saving, and validation for the media
//! gateway endpoint, stream negotiation, the control-room overlay, and the
//! picture-in-picture player.

use crate::errors::StreamError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetcamConfig {
    pub gateway: GatewayConfig,
    pub stream: StreamSettings,
    pub control_room: ControlRoomConfig,
    pub pip: PipConfig,
}

/// Media gateway endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the media gateway, e.g. "http://gateway.local:8889"
    pub base_url: String,
    /// Value of the X-Api-Key request header
    pub api_key: String,
    /// Optional bearer token forwarded from the console's auth layer
    pub bearer_token: Option<String>,
    /// Per-request timeout in milliseconds; also bounds the signaling exchange
    pub request_timeout_ms: u64,
}

/// Stream negotiation and supervision settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    /// STUN/TURN server URLs offered to every peer connection
    pub ice_servers: Vec<String>,
    /// Retry strategy applied by orchestrators to failed sessions:
    /// "none", "fixed", or "backoff"
    pub retry_policy: String,
    /// Delay before a retry (fixed), or the backoff base
    pub retry_delay_ms: u64,
    /// Upper bound for backoff delays
    pub retry_max_delay_ms: u64,
    /// Retry budget per camera; ignored when the policy is "none"
    pub retry_max_attempts: u32,
}

/// Control-room overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRoomConfig {
    /// Keyboard shortcut that toggles the overlay
    pub hotkey: String,
    /// chrono format string for the overlay clock
    pub clock_format: String,
}

/// Picture-in-picture player settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipConfig {
    /// Snapshot refresh cadence in milliseconds
    pub snapshot_interval_ms: u64,
    /// Inset from the viewport edges for the initial bottom-right position
    pub margin: f64,
}

impl Default for FleetcamConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url: "http://127.0.0.1:8889".to_string(),
                api_key: String::new(),
                bearer_token: None,
                request_timeout_ms: 10_000,
            },
            stream: StreamSettings {
                ice_servers: vec!["stun:stun.l.google.com:19302".to_string()],
                retry_policy: "none".to_string(),
                retry_delay_ms: 2_000,
                retry_max_delay_ms: 30_000,
                retry_max_attempts: 5,
            },
            control_room: ControlRoomConfig {
                hotkey: "F10".to_string(),
                clock_format: "%H:%M:%S".to_string(),
            },
            pip: PipConfig {
                snapshot_interval_ms: 1_000,
                margin: 24.0,
            },
        }
    }
}

impl FleetcamConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StreamError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| StreamError::config(format!("Failed to read config file: {}", e)))?;

        let config: FleetcamConfig = toml::from_str(&contents)
            .map_err(|e| StreamError::config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StreamError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StreamError::config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| StreamError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| StreamError::config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("fleetcam.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.gateway.base_url.trim().is_empty() {
            return Err("Gateway base URL must not be empty".to_string());
        }
        if self.gateway.request_timeout_ms == 0 {
            return Err("Gateway request timeout must be nonzero".to_string());
        }

        match self.stream.retry_policy.as_str() {
            "none" => {}
            "fixed" | "backoff" => {
                if self.stream.retry_delay_ms == 0 {
                    return Err("Retry delay must be nonzero".to_string());
                }
                if self.stream.retry_max_attempts == 0 {
                    return Err("Retry attempts must be nonzero".to_string());
                }
                if self.stream.retry_max_delay_ms < self.stream.retry_delay_ms {
                    return Err("Retry max delay must not be below the base delay".to_string());
                }
            }
            other => {
                return Err(format!(
                    "Unknown retry policy '{}' (expected none, fixed, or backoff)",
                    other
                ));
            }
        }

        if self.control_room.hotkey.trim().is_empty() {
            return Err("Control room hotkey must not be empty".to_string());
        }
        if self.control_room.clock_format.trim().is_empty() {
            return Err("Control room clock format must not be empty".to_string());
        }

        if self.pip.snapshot_interval_ms == 0 {
            return Err("PiP snapshot interval must be nonzero".to_string());
        }
        if !self.pip.margin.is_finite() || self.pip.margin < 0.0 {
            return Err("PiP margin must be a non-negative number".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FleetcamConfig::default();
        assert_eq!(config.gateway.request_timeout_ms, 10_000);
        assert_eq!(config.stream.retry_policy, "none");
        assert_eq!(config.control_room.hotkey, "F10");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad_url = FleetcamConfig::default();
        bad_url.gateway.base_url = "  ".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_policy = FleetcamConfig::default();
        bad_policy.stream.retry_policy = "eventually".to_string();
        assert!(bad_policy.validate().is_err());

        let mut zero_delay = FleetcamConfig::default();
        zero_delay.stream.retry_policy = "fixed".to_string();
        zero_delay.stream.retry_delay_ms = 0;
        assert!(zero_delay.validate().is_err());

        let mut inverted_backoff = FleetcamConfig::default();
        inverted_backoff.stream.retry_policy = "backoff".to_string();
        inverted_backoff.stream.retry_max_delay_ms = 100;
        inverted_backoff.stream.retry_delay_ms = 500;
        assert!(inverted_backoff.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("fleetcam.toml");

        let mut config = FleetcamConfig::default();
        config.gateway.api_key = "farm-key".to_string();
        config.stream.retry_policy = "fixed".to_string();
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = FleetcamConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.gateway.api_key, "farm-key");
        assert_eq!(loaded.stream.retry_policy, "fixed");
        assert_eq!(loaded.pip.snapshot_interval_ms, config.pip.snapshot_interval_ms);
    }

    #[test]
    fn test_config_toml_format() {
        let config = FleetcamConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[gateway]"));
        assert!(toml_string.contains("[stream]"));
        assert!(toml_string.contains("[control_room]"));
        assert!(toml_string.contains("[pip]"));
        assert!(toml_string.contains("base_url"));
        assert!(toml_string.contains("retry_policy"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = FleetcamConfig::load_from_file("nonexistent_fleetcam.toml");
        assert!(result.is_ok()); // Should return default
        assert_eq!(result.unwrap().stream.retry_policy, "none");
    }
}
