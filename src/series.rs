use chrono::{DateTime, Locale, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use crate::day_buckets::DayBuckets;
use crate::models::forecast::DailySample;

/// Whether a series is per hour or per day
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

/// One x position of a chart, missing values are kept as gaps
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub wind: Option<f64>,
}

/// How chart labels are rendered
pub struct LabelFormat {
    pub locale: Locale,
    pub hour_format: String,
    pub day_format: String,
}

/// What to build a series from
pub enum SeriesSource<'a> {
    /// One day out of the day buckets, today if no day is selected
    Hourly {
        buckets: &'a DayBuckets,
        selected_day: Option<NaiveDate>,
    },
    /// All days of the daily forecast
    Daily(&'a [DailySample]),
}

impl SeriesSource<'_> {
    pub fn granularity(&self) -> Granularity {
        match self {
            SeriesSource::Hourly { .. } => Granularity::Hourly,
            SeriesSource::Daily(_) => Granularity::Daily,
        }
    }
}

/// Builds an ordered chart series.
///
/// Hourly series cover the selected day only (an unknown day gives an empty series) and are
/// labelled with the local hour. Daily series cover all days, are labelled with the local
/// weekday/date and never carry cloud cover or wind since the daily forecast has neither.
/// Nothing is interpolated.
///
/// # Arguments
///
/// * 'source' - buckets and selected day, or the daily forecast
/// * 'now' - current time in the display timezone
/// * 'labels' - label formats and locale
pub fn build_series(source: SeriesSource, now: &DateTime<Tz>, labels: &LabelFormat) -> Vec<ChartPoint> {
    let tz = now.timezone();

    match source {
        SeriesSource::Hourly { buckets, selected_day } => {
            let day = selected_day.unwrap_or_else(|| now.date_naive());
            buckets.get(&day)
                .map(|bucket| bucket.hours.iter()
                    .map(|h| ChartPoint {
                        label: h.timestamp_utc
                            .with_timezone(&tz)
                            .format_localized(&labels.hour_format, labels.locale)
                            .to_string(),
                        temperature: h.temperature_c,
                        precipitation: h.precipitation_mm,
                        cloud_cover: h.cloud_cover_pct,
                        wind: h.wind_speed,
                    })
                    .collect())
                .unwrap_or_default()
        }

        SeriesSource::Daily(days) => days.iter()
            .map(|d| ChartPoint {
                label: day_label(d.date, &tz, labels),
                temperature: d.temperature_max_c,
                precipitation: d.precipitation_sum_mm,
                cloud_cover: None,
                wind: None,
            })
            .collect(),
    }
}

/// Renders a calendar date with the day format, anchored at local noon
///
/// # Arguments
///
/// * 'date' - the date
/// * 'tz' - the display timezone
/// * 'labels' - label formats and locale
fn day_label(date: NaiveDate, tz: &Tz, labels: &LabelFormat) -> String {
    match date.and_hms_opt(12, 0, 0).and_then(|noon| tz.from_local_datetime(&noon).earliest()) {
        Some(noon) => noon.format_localized(&labels.day_format, labels.locale).to_string(),
        None => date.format(&labels.day_format).to_string(),
    }
}
