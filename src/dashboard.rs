use std::fs;
use std::path::PathBuf;
use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use crate::config::Config;
use crate::day_buckets::{bucket_by_day, find_current_hour_index};
use crate::errors::SnapshotError;
use crate::models::dashboard::{Dashboard, DashboardStatus, DayView, FetchInfo, HourView, SummaryView};
use crate::models::forecast::{HourlySample, Unplaceable};
use crate::models::snapshot::{FetchMetadata, PrimarySnapshot, SecondarySnapshot};
use crate::normalizer::{aggregate_hourly, merge_by_time, normalize_current, normalize_daily, normalize_hourly, normalize_secondary, ProviderSchema};
use crate::series::{build_series, LabelFormat, SeriesSource};
use crate::snapshots::SnapshotStore;
use crate::summary::summarize;

const DASHBOARD_FILE: &str = "dashboard.json";

/// Runs one render cycle: loads the latest snapshots, renders the dashboard and writes it
/// to the output directory. If the primary snapshot can't be loaded an unavailable
/// document is written instead.
///
/// # Arguments
///
/// * 'config' - the configuration
pub fn run(config: &Config) -> anyhow::Result<PathBuf> {
    let now = Utc::now().with_timezone(&config.location.tz);
    let store = SnapshotStore::new(&config.files.data_dir);

    let dashboard = match store.load::<PrimarySnapshot>(&config.files.snapshot_name) {
        Ok((path, primary)) => {
            info!("rendering dashboard from {}", path.display());
            let secondary = load_secondary(&store, config);
            let metadata = store.load_metadata(&config.files.metadata_name);

            render(config, &primary, secondary.as_ref(), metadata, &now)
        }
        Err(e) => {
            let reason = format!("{:#}", anyhow::Error::new(e));
            error!("no forecast data available: {}", reason);

            Dashboard::unavailable(now.fixed_offset(), &config.location, reason)
        }
    };

    write_dashboard(&config.files.output_dir, &dashboard)
}

/// Renders the dashboard document from already loaded snapshots
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'primary' - the primary provider's snapshot
/// * 'secondary' - the secondary provider's snapshot, if any
/// * 'metadata' - the fetch job's metadata, if any
/// * 'now' - current time in the display timezone
pub fn render(
    config: &Config,
    primary: &PrimarySnapshot,
    secondary: Option<&SecondarySnapshot>,
    metadata: Option<FetchMetadata>,
    now: &DateTime<Tz>) -> Dashboard {

    let source_tz = &config.location.source_tz;
    let mut unplaceable: Vec<Unplaceable> = Vec::new();

    let hourly = normalize_hourly(primary.hourly_records(), &ProviderSchema::Primary, source_tz);
    unplaceable.extend(hourly.unplaceable);
    let hours: Vec<HourlySample> = match secondary {
        Some(snapshot) => {
            let secondary_hourly = normalize_secondary(snapshot, source_tz);
            unplaceable.extend(secondary_hourly.unplaceable);

            // Nowcast quarter hours are folded into hours first, then primary values take
            // precedence over secondary ones for the same hour
            let mut samples = aggregate_hourly(&secondary_hourly.samples, &config.location.tz);
            samples.extend(hourly.samples);
            merge_by_time(samples)
        }
        None => hourly.samples,
    };

    let daily = normalize_daily(primary.daily_records(), &ProviderSchema::Primary);
    unplaceable.extend(daily.unplaceable);

    for u in &unplaceable {
        warn!("unplaceable {} record #{} ({}): {}", u.section, u.index, u.raw_time.as_deref().unwrap_or("no time"), u.reason);
    }

    let current = normalize_current(primary.current_weather.as_ref(), source_tz);
    if current.is_none() {
        warn!("snapshot has no current weather");
    }

    let labels = LabelFormat {
        locale: config.display.chrono_locale,
        hour_format: config.display.hour_format.clone(),
        day_format: config.display.day_format.clone(),
    };
    let buckets = bucket_by_day(&hours, &config.location.tz);
    debug!("{} hourly samples in {} days, {} daily samples", hours.len(), buckets.len(), daily.samples.len());

    let days: Vec<DayView> = buckets.values()
        .map(|bucket| DayView {
            date: bucket.date,
            mood_gradient: bucket.mood_gradient.clone(),
            current_hour_index: find_current_hour_index(bucket, now),
            hours: bucket.hours.iter().map(HourView::from).collect(),
            series: build_series(SeriesSource::Hourly { buckets: &buckets, selected_day: Some(bucket.date) }, now, &labels),
            summary: summarize(&bucket.hours),
        })
        .collect();

    let selected_day = config.display.selected_date.unwrap_or_else(|| now.date_naive());
    let hourly_series = build_series(SeriesSource::Hourly { buckets: &buckets, selected_day: Some(selected_day) }, now, &labels);
    let daily_source = SeriesSource::Daily(&daily.samples);
    debug!("building {:?} series for {} days", daily_source.granularity(), daily.samples.len());
    let daily_series = build_series(daily_source, now, &labels);

    let summary = SummaryView {
        today: buckets.get(&now.date_naive()).map(|b| summarize(&b.hours)),
        horizon: summarize(&hours),
    };

    let last_updated = primary.last_updated.clone()
        .or_else(|| metadata.as_ref().and_then(|m| m.last_update.clone()))
        .or_else(|| secondary.and_then(|s| s.last_updated()).map(str::to_string));

    Dashboard {
        status: DashboardStatus::Ok,
        reason: None,
        generated_at: now.fixed_offset(),
        location: config.location.name.clone(),
        latitude: config.location.lat,
        longitude: config.location.long,
        timezone: config.location.timezone.clone(),
        last_updated,
        fetch: metadata.map(|m| FetchInfo { source: m.source, status: m.status, error_message: m.error_message }),
        current,
        selected_day,
        hourly_series,
        days,
        daily: daily.samples,
        daily_series,
        summary: Some(summary),
        unplaceable: unplaceable.len(),
    }
}

/// Loads the secondary snapshot if one is configured. Failing to load it is only logged.
///
/// # Arguments
///
/// * 'store' - the snapshot store
/// * 'config' - the configuration
fn load_secondary(store: &SnapshotStore, config: &Config) -> Option<SecondarySnapshot> {
    let name = config.files.secondary_snapshot_name.as_deref()?;

    match store.load::<SecondarySnapshot>(name) {
        Ok((path, snapshot)) => {
            info!("merging secondary snapshot {} for {}", path.display(), snapshot.location().unwrap_or("unknown location"));
            Some(snapshot)
        }
        Err(SnapshotError::NotFound { .. }) => {
            warn!("secondary snapshot '{}' not found", name);
            None
        }
        Err(e) => {
            warn!("ignoring secondary snapshot: {:#}", anyhow::Error::new(e));
            None
        }
    }
}

/// Writes the dashboard document as pretty printed JSON
///
/// # Arguments
///
/// * 'output_dir' - directory to write to, created if missing
/// * 'dashboard' - the document
fn write_dashboard(output_dir: &str, dashboard: &Dashboard) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory '{}'", output_dir))?;

    let path = PathBuf::from(output_dir).join(DASHBOARD_FILE);
    let json = serde_json::to_string_pretty(dashboard)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write '{}'", path.display()))?;

    info!("dashboard written to {}", path.display());

    Ok(path)
}
