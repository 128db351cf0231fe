use super::{MallConfig, Role};
use crate::speech::Locale;
use tracing::warn;

pub const ENV_CONFIG_PATH: &str = "SMARTMALL_CONFIG";
pub const ENV_BIND_ADDR: &str = "SMARTMALL_BIND_ADDR";
pub const ENV_SERVER_URL: &str = "SMARTMALL_SERVER_URL";
pub const ENV_UPLOAD_DIR: &str = "SMARTMALL_UPLOAD_DIR";
pub const ENV_ROLE: &str = "SMARTMALL_ROLE";
pub const ENV_NARRATION_LOCALE: &str = "SMARTMALL_NARRATION_LOCALE";
pub const ENV_RECOGNITION_LOCALE: &str = "SMARTMALL_RECOGNITION_LOCALE";

/// Config file path from `SMARTMALL_CONFIG`, falling back to
/// `smartmall.toml`.
pub fn config_path() -> String {
    std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| super::DEFAULT_CONFIG_PATH.to_string())
}

impl MallConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` for each variable. Empty and
    /// unparseable values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_BIND_ADDR) {
            self.hub.bind_addr = v;
        }
        if let Some(v) = get(ENV_UPLOAD_DIR) {
            self.hub.upload_dir = v;
        }
        if let Some(v) = get(ENV_SERVER_URL) {
            self.dashboard.server_url = v;
        }
        if let Some(v) = get(ENV_ROLE) {
            match v.parse::<Role>() {
                Ok(role) => self.dashboard.role = role,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_ROLE),
            }
        }
        if let Some(v) = get(ENV_NARRATION_LOCALE) {
            self.chat.narration_locale = Locale::new(v);
        }
        if let Some(v) = get(ENV_RECOGNITION_LOCALE) {
            self.chat.recognition_locale = Locale::new(v);
        }
    }
}
