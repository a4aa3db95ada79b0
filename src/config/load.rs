use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ENCORE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ENCORE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return Err("audio.initial_volume must be within 0.0..=1.0".to_string());
        }
        if !(self.audio.volume_step > 0.0 && self.audio.volume_step <= 1.0) {
            return Err("audio.volume_step must be within (0.0, 1.0]".to_string());
        }
        if !(self.audio.seek_step > 0.0 && self.audio.seek_step <= 1.0) {
            return Err("audio.seek_step must be within (0.0, 1.0]".to_string());
        }
        if let Some(url) = &self.backend.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err("backend.base_url must start with http:// or https://".to_string());
            }
        }
        if self.log.level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("log.level {:?} is not a log level", self.log.level));
        }
        Ok(())
    }
}

/// Resolve the config path from `ENCORE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ENCORE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/encore/config.toml`
/// or `~/.config/encore/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("encore").join("config.toml"))
}
