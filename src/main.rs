use std::env;
use std::process::ExitCode;
use log::error;
use crate::dashboard::run;
use crate::initialization::init;

mod config;
mod dashboard;
mod day_buckets;
mod errors;
mod initialization;
mod models;
mod mood;
mod normalizer;
mod series;
mod snapshots;
mod summary;
mod timestamps;
mod unit_value;
mod wind;

const DEFAULT_CONFIG: &str = "config/skyboard.toml";

fn main() -> ExitCode {
    let config_path = env::args().nth(1)
        .or_else(|| env::var("SKYBOARD_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = match init(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error during initialization: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("render cycle failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
