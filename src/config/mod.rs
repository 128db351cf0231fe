pub mod env;

use crate::speech::Locale;
use crate::state::{ParkingMap, SlotStatus};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "smartmall.toml";

/// Complete Smart Mall configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MallConfig {
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Mall hub (server) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Where uploaded videos are stored
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Slots and their status at startup, in display order
    #[serde(default = "default_parking")]
    pub parking: ParkingMap,
    /// Pending push events per websocket client before it is resynced
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_parking() -> ParkingMap {
    [
        ("A1", SlotStatus::Free),
        ("A2", SlotStatus::Booked),
        ("A3", SlotStatus::Free),
        ("A4", SlotStatus::Free),
        ("A5", SlotStatus::Booked),
        ("A6", SlotStatus::Free),
    ]
    .into_iter()
    .collect()
}

fn default_broadcast_capacity() -> usize {
    256
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            parking: default_parking(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Which dashboard a client shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Parking controls, upload, crowd summary and charts
    #[default]
    Admin,
    /// Read-only parking grid and the chat assistant
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Dashboard client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Hub base URL; the websocket URL is derived from it
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub role: Role,
    /// Wait before reconnecting a dropped channel (milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            role: Role::default(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Locale selected for speech recognition at startup
    #[serde(default)]
    pub recognition_locale: Locale,
    /// The only locale replies are spoken in
    #[serde(default)]
    pub narration_locale: Locale,
    /// Characters of user input considered by the dialogue engine
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_max_input_chars() -> usize {
    crate::dialogue::DEFAULT_MAX_INPUT_CHARS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            recognition_locale: Locale::default(),
            narration_locale: Locale::default(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<MallConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: MallConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load from `path` when it exists, defaults otherwise; then apply env
/// overrides.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<MallConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        MallConfig::default()
    };
    config.apply_env();
    Ok(config)
}
