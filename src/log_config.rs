use chrono::Local;
use fern::{
    Dispatch,
    colors::{Color, ColoredLevelConfig},
};
use log::LevelFilter;
use std::io;
use std::path::Path;

/// Transport crates that are noisy below `warn`.
const QUIET_TARGETS: [&str; 3] = ["hyper", "hyper_util", "reqwest"];

/// Make sure the directory holding `log_file` exists.
pub fn prepare_log_file(log_file: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Initialize logging to file and stdout with timestamps and colored levels.
pub fn init_logging(log_file: &str, level: LevelFilter) -> anyhow::Result<()> {
    prepare_log_file(log_file)?;

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let mut dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} - {} - {} - {}",
                Local::now().to_rfc3339(),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level);
    for target in QUIET_TARGETS {
        dispatch = dispatch.level_for(target, level.min(LevelFilter::Warn));
    }

    dispatch
        .chain(fern::log_file(log_file)?)
        .chain(io::stdout())
        .apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prepare_creates_missing_directories() {
        let temp_dir = tempdir().unwrap();
        let log_file = temp_dir.path().join("nested/logs/proofgate.log");

        prepare_log_file(log_file.to_str().unwrap()).unwrap();

        assert!(temp_dir.path().join("nested/logs").is_dir());
        assert!(!log_file.exists());
    }

    #[test]
    fn test_prepare_accepts_bare_file_name() {
        prepare_log_file("proofgate.log").unwrap();
    }
}
