use std::fs;
use chrono::{Locale, NaiveDate};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub long: f64,
    pub timezone: String,
    pub source_timezone: Option<String>,
    #[serde(skip, default = "utc")]
    pub tz: Tz,
    #[serde(skip, default = "utc")]
    pub source_tz: Tz,
}

#[derive(Deserialize)]
pub struct Display {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_hour_format")]
    pub hour_format: String,
    #[serde(default = "default_day_format")]
    pub day_format: String,
    pub selected_day: Option<String>,
    #[serde(skip, default = "posix")]
    pub chrono_locale: Locale,
    #[serde(skip)]
    pub selected_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct Files {
    pub data_dir: String,
    pub snapshot_name: String,
    pub secondary_snapshot_name: Option<String>,
    pub metadata_name: String,
    pub output_dir: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub location: Location,
    pub display: Display,
    pub files: Files,
    pub general: General,
}

fn utc() -> Tz { Tz::UTC }
fn posix() -> Locale { Locale::POSIX }
fn default_locale() -> String { "en_US".to_string() }
fn default_hour_format() -> String { "%H:%M".to_string() }
fn default_day_format() -> String { "%a %d %b".to_string() }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates a configuration document.
///
/// Timezone names are resolved against the IANA database shipped with chrono-tz and the
/// locale against chrono's locale tables. If no source timezone is given, naive timestamps
/// in snapshots are taken to be in the display timezone.
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(toml)?;

    config.location.tz = parse_timezone(&config.location.timezone)?;
    config.location.source_tz = match &config.location.source_timezone {
        Some(name) => parse_timezone(name)?,
        None => config.location.tz,
    };

    config.display.chrono_locale = Locale::try_from(config.display.locale.as_str())
        .map_err(|_| ConfigError::Locale(config.display.locale.clone()))?;

    check_format(&config.display.hour_format)?;
    check_format(&config.display.day_format)?;

    if let Some(day) = &config.display.selected_day {
        config.display.selected_date = Some(NaiveDate::parse_from_str(day, "%Y-%m-%d")?);
    }

    Ok(config)
}

/// Resolves an IANA timezone name
///
/// # Arguments
///
/// * 'name' - timezone name, e.g. Europe/Vienna
fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>().map_err(|_| ConfigError::Timezone(name.to_string()))
}

/// Checks that a label format only holds valid strftime specifiers
///
/// # Arguments
///
/// * 'format' - strftime style format
fn check_format(format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Format(format.to_string()));
    }

    Ok(())
}
