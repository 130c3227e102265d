use std::collections::BTreeMap;
use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use crate::models::forecast::HourlySample;
use crate::mood::{weather_mood, WeatherMood};

/// One stop of a day's mood gradient
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GradientStop {
    pub position_pct: f64,
    pub mood: WeatherMood,
    pub color: &'static str,
}

/// The hourly samples of one calendar day in the display timezone
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    pub hours: Vec<HourlySample>,
    pub mood_gradient: Vec<GradientStop>,
}

/// Day buckets ordered by date
pub type DayBuckets = BTreeMap<NaiveDate, DayBucket>;

/// Groups hourly samples by calendar day in the given timezone.
///
/// Within a day hours are ordered by time. Should two samples fall on the same local
/// hour, the one coming last in the input replaces the earlier.
///
/// # Arguments
///
/// * 'samples' - normalized hourly samples in any order
/// * 'tz' - the display timezone
pub fn bucket_by_day(samples: &[HourlySample], tz: &Tz) -> DayBuckets {
    let mut days: BTreeMap<NaiveDate, BTreeMap<u32, &HourlySample>> = BTreeMap::new();

    for sample in samples {
        let local = sample.timestamp_utc.with_timezone(tz);
        days.entry(local.date_naive())
            .or_default()
            .insert(local.hour(), sample);
    }

    days.into_iter()
        .map(|(date, hours)| {
            let mut hours: Vec<HourlySample> = hours.into_values().cloned().collect();
            hours.sort_by_key(|h| h.timestamp_utc);
            let mood_gradient = mood_gradient(&hours, tz);

            (date, DayBucket { date, hours, mood_gradient })
        })
        .collect()
}

/// Returns the index of the sample for the current hour, or None if the bucket isn't
/// today's in the timezone of 'now' or has no sample for the current hour
///
/// # Arguments
///
/// * 'bucket' - the day bucket
/// * 'now' - current time in the display timezone
pub fn find_current_hour_index<T: TimeZone>(bucket: &DayBucket, now: &DateTime<T>) -> Option<usize> {
    if bucket.date != now.date_naive() {
        return None;
    }

    let tz = now.timezone();
    bucket.hours
        .iter()
        .position(|h| h.timestamp_utc.with_timezone(&tz).hour() == now.hour())
}

/// Derives the 24 stop mood gradient of a day.
///
/// Every hour slot gets a stop at hour/23 of the way, hours without a sample, or without
/// precipitation or cloud cover, count as dry and clear.
///
/// # Arguments
///
/// * 'hours' - samples of the day
/// * 'tz' - the display timezone
pub fn mood_gradient(hours: &[HourlySample], tz: &Tz) -> Vec<GradientStop> {
    let mut slots: [(f64, f64); 24] = [(0.0, 0.0); 24];
    for h in hours {
        let hour = h.timestamp_utc.with_timezone(tz).hour() as usize;
        slots[hour] = (h.precipitation_mm.unwrap_or(0.0), h.cloud_cover_pct.unwrap_or(0.0));
    }

    slots.iter()
        .enumerate()
        .map(|(hour, (precipitation, cloud))| {
            let mood = weather_mood(*precipitation, *cloud);
            GradientStop {
                position_pct: hour as f64 / 23.0 * 100.0,
                mood,
                color: mood.color(),
            }
        })
        .collect()
}
