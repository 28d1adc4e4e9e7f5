//! Configuration (§4.10/§6.3): the fields of the core relevant to the
//! CLI/config layer (itself out of scope). Grounded on
//! `huginn-proxy-lib/src/config/{root,loader}.rs` — a `serde`-deserialized
//! struct loaded from TOML, validated once at startup.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Inputs to the core, independent of how the CLI/config layer assembled
/// them.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub client_name: String,
    pub screen_width: u32,
    pub screen_height: u32,
    #[serde(default)]
    pub abs_mouse_move: bool,
    #[serde(default = "default_mouse_move_threshold")]
    pub mouse_move_threshold: u32,
    #[serde(default = "default_mouse_pos_sync_freq")]
    pub mouse_pos_sync_freq: u32,
}

fn default_port() -> u16 {
    24800
}

fn default_mouse_move_threshold() -> u32 {
    16
}

fn default_mouse_pos_sync_freq() -> u32 {
    30
}

impl Config {
    /// The handler's throttle interval for `DMMV` smoothing (§4.7).
    pub fn mouse_move_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.mouse_move_threshold))
    }
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let text = fs::read_to_string(path)
        .map_err(|e| ClientError::Config(format!("failed to read config file: {e}")))?;
    let cfg: Config =
        toml::from_str(&text).map_err(|e| ClientError::Config(format!("failed to parse config: {e}")))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.server.trim().is_empty() {
        return Err(ClientError::Config("server must not be empty".into()));
    }
    if cfg.client_name.trim().is_empty() {
        return Err(ClientError::Config("client_name must not be empty".into()));
    }
    if cfg.screen_width == 0 || cfg.screen_height == 0 {
        return Err(ClientError::Config("screen dimensions must be non-zero".into()));
    }
    if cfg.mouse_pos_sync_freq == 0 {
        return Err(ClientError::Config("mouse_pos_sync_freq must be non-zero".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_server() {
        let cfg = Config {
            server: "".into(),
            port: 24800,
            client_name: "Pynergy".into(),
            screen_width: 1920,
            screen_height: 1080,
            abs_mouse_move: false,
            mouse_move_threshold: 16,
            mouse_pos_sync_freq: 30,
        };
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let toml = r#"
            server = "192.168.1.50"
            client_name = "Pynergy"
            screen_width = 1920
            screen_height = 1080
        "#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.port, 24800);
        assert_eq!(cfg.mouse_move_threshold, 16);
        assert_eq!(cfg.mouse_pos_sync_freq, 30);
        assert!(!cfg.abs_mouse_move);
    }
}
