use crate::config;

/// Load and validate settings. Runs before the logger exists, so problems are
/// reported on stderr (the terminal is still in normal mode at this point).
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("encore: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("encore: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
