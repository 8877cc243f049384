use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::network::{ClientSettings, room_url};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `host[:port]` serving the `/room` endpoint.
    pub host: String,
    /// Origin is HTTPS, so the socket must be `wss`.
    pub secure: bool,
    /// Fixed display name; a random `UserNNN` is generated when absent.
    pub display_name: Option<String>,
    pub reconnect_delay_ms: u64,
    pub typing_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8080".to_string(),
            secure: false,
            display_name: None,
            reconnect_delay_ms: 5000,
            typing_debounce_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> Result<ClientSettings, ChatError> {
        let mut settings = ClientSettings::new(room_url(&self.host, self.secure)?);
        settings.reconnect_delay = Duration::from_millis(self.reconnect_delay_ms);
        settings.typing_debounce = Duration::from_millis(self.typing_debounce_ms);
        Ok(settings)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
