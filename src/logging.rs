use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

use log::LevelFilter;

use crate::config::LogSettings;

/// Where log output goes when `log.file` is not configured.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("encore.log")
}

/// Route `log` records to a file. The terminal belongs to the TUI, so
/// nothing is written to stdout.
pub fn setup_logger(settings: &LogSettings) -> Result<(), fern::InitError> {
    let level = LevelFilter::from_str(&settings.level).unwrap_or(LevelFilter::Info);
    let path = settings.file.clone().unwrap_or_else(default_log_path);

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(level)
        .level_for("symphonia_bundle_mp3", LevelFilter::Error)
        .level_for("symphonia_core", LevelFilter::Error)
        .level_for("rustls", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(fern::log_file(path)?)
        .apply()?;
    Ok(())
}
