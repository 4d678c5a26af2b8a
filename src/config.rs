use std::path::PathBuf;

use clap::Args;
use derive_setters::Setters;

use crate::domain::CFError;

pub const DEFAULT_SETTINGS_PATH: &str = "~/.config/colfilter/settings.json";

#[derive(Debug, Clone, Args, Setters)]
#[setters(prefix = "with_", into)]
pub struct AppConfig {
    /// JSON file the column selections are saved in.
    #[arg(long, env = "COLFILTER_SETTINGS", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings_path: String,

    /// Number of commands the controller queues before senders wait.
    #[arg(long, default_value_t = 64)]
    pub command_buffer: usize,

    /// Number of actions kept for slow action listeners.
    #[arg(long, default_value_t = 256)]
    pub action_buffer: usize,

    /// Tracking server. Events are only logged when not set.
    #[arg(long, env = "TRACKING_URL")]
    #[setters(strip_option)]
    pub tracking_url: Option<String>,

    #[arg(long, env = "TRACKING_SITE_ID", default_value = "1")]
    pub tracking_site_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: DEFAULT_SETTINGS_PATH.to_string(),
            command_buffer: 64,
            action_buffer: 256,
            tracking_url: None,
            tracking_site_id: "1".to_string(),
        }
    }
}

impl AppConfig {
    /// Settings path with `~` and environment variables expanded.
    pub fn settings_file(&self) -> Result<PathBuf, CFError> {
        let expanded = shellexpand::full(&self.settings_path)
            .map_err(|e| CFError::InvalidConfiguration(format!("settings path: {e}")))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_override_defaults() {
        let config = AppConfig::default()
            .with_settings_path("/tmp/settings.json")
            .with_command_buffer(8usize)
            .with_tracking_url("https://tracking.example.com");
        assert_eq!(config.settings_path, "/tmp/settings.json");
        assert_eq!(config.command_buffer, 8);
        assert_eq!(config.tracking_url.as_deref(), Some("https://tracking.example.com"));
        assert_eq!(config.action_buffer, 256);
    }

    #[test]
    fn plain_settings_path_is_kept() {
        let config = AppConfig::default().with_settings_path("/var/lib/colfilter/settings.json");
        assert_eq!(
            config.settings_file().unwrap(),
            PathBuf::from("/var/lib/colfilter/settings.json")
        );
    }

    #[test]
    fn default_settings_path_points_into_config_dir() {
        let config = AppConfig::default();
        let path = config.settings_file().unwrap();
        assert!(path.ends_with(".config/colfilter/settings.json"));
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let config = AppConfig::default().with_settings_path("$COLFILTER_SURELY_UNSET_VARIABLE/settings.json");
        assert!(matches!(
            config.settings_file(),
            Err(CFError::InvalidConfiguration(_))
        ));
    }
}
