use anyhow::Context;
use log::info;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{load_config, Config, General};
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {m}{n}";

/// Loads the configuration and sets up logging
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn init(config_path: &str) -> anyhow::Result<Config> {
    let config = load_config(config_path)
        .with_context(|| format!("failed to load configuration '{}'", config_path))?;

    setup_logger(&config.general).context("failed to set up logging")?;

    info!("skyboard version: {}", env!("CARGO_PKG_VERSION"));
    info!("configuration loaded from {}", config_path);

    Ok(config)
}

/// Sets up log4rs with a file appender and optionally a stdout appender
///
/// # Arguments
///
/// * 'general' - the general configuration section
fn setup_logger(general: &General) -> Result<(), LoggingError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let log_config = builder
        .build(root.build(general.log_level))
        .map_err(|e| LoggingError(e.to_string()))?;

    log4rs::init_config(log_config)?;

    Ok(())
}
