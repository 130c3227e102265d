use std::collections::BTreeMap;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use crate::models::forecast::{CurrentConditions, DailySample, ForecastParameter, HourlySample, Normalized, Unplaceable};
use crate::models::snapshot::{RawSample, SecondarySnapshot};
use crate::timestamps::{parse_date, parse_instant, parse_naive};
use crate::unit_value::{extract, field_value, ValueKey};
use crate::wind::SpeedUnit;

/// The upstream JSON shapes the normalizer knows about
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProviderSchema {
    /// Nested `{value, unit}` objects (or bare numbers) per quantity, wind as `{speed, direction, gusts}`
    Primary,
    /// Flat numeric fields per parameter on records sharing a `time` field. If a parameter is
    /// selected, only that parameter is read from the records.
    Secondary {
        parameter: Option<ForecastParameter>,
        wind_unit: SpeedUnit,
    },
}

/// Normalizes hourly records into canonical samples.
///
/// Records are kept in input order. A record whose time can't be parsed is left out and
/// reported as unplaceable, a malformed value only blanks that field.
///
/// # Arguments
///
/// * 'raw' - the raw hourly records
/// * 'schema' - the provider schema the records follow
/// * 'source_tz' - timezone of timestamps given without offset
pub fn normalize_hourly(raw: &[RawSample], schema: &ProviderSchema, source_tz: &Tz) -> Normalized<HourlySample> {
    let mut result: Normalized<HourlySample> = Normalized::default();

    for (index, record) in raw.iter().enumerate() {
        let timestamp = match place_in_time("hourly", index, record, "time", |s| parse_instant(s, source_tz)) {
            Ok(t) => t,
            Err(u) => { result.unplaceable.push(u); continue; }
        };

        let sample = match schema {
            ProviderSchema::Primary => primary_hourly(timestamp, record),
            ProviderSchema::Secondary { parameter, wind_unit } =>
                secondary_hourly(timestamp, record, *parameter, *wind_unit),
        };
        result.samples.push(sample);
    }

    result
}

/// Normalizes daily records into canonical samples. An empty or absent daily section gives
/// an empty result.
///
/// # Arguments
///
/// * 'raw' - the raw daily records
/// * 'schema' - the provider schema the records follow
pub fn normalize_daily(raw: &[RawSample], schema: &ProviderSchema) -> Normalized<DailySample> {
    let mut result: Normalized<DailySample> = Normalized::default();

    for (index, record) in raw.iter().enumerate() {
        let date_key = if record.get("date").is_some() { "date" } else { "time" };
        let date = match place_in_time("daily", index, record, date_key, parse_date) {
            Ok(d) => d,
            Err(u) => { result.unplaceable.push(u); continue; }
        };

        let sample = match schema {
            ProviderSchema::Primary => {
                let temperature = record.get("temperature");
                let sun = record.get("sun");
                DailySample {
                    date,
                    temperature_max_c: extract(temperature, ValueKey::Max),
                    temperature_min_c: extract(temperature, ValueKey::Min),
                    precipitation_sum_mm: field_value(record, "precipitation_sum"),
                    uv_index_max: field_value(record, "uv_index_max"),
                    sunrise: naive_field(sun, "sunrise"),
                    sunset: naive_field(sun, "sunset"),
                    daylight_duration_s: sun.and_then(|s| field_value(s, "daylight_duration")),
                }
            }
            ProviderSchema::Secondary { .. } => DailySample {
                date,
                temperature_max_c: field_value(record, "temperature_max"),
                temperature_min_c: field_value(record, "temperature_min"),
                precipitation_sum_mm: field_value(record, "precipitation_sum"),
                uv_index_max: field_value(record, "uv_index_max"),
                sunrise: naive_field(Some(record), "sunrise"),
                sunset: naive_field(Some(record), "sunset"),
                daylight_duration_s: field_value(record, "daylight_duration"),
            },
        };
        result.samples.push(sample);
    }

    result
}

/// Normalizes the primary provider's current weather block. Returns None if the block is
/// absent or not a record.
///
/// # Arguments
///
/// * 'raw' - the current weather block
/// * 'source_tz' - timezone of a timestamp given without offset
pub fn normalize_current(raw: Option<&RawSample>, source_tz: &Tz) -> Option<CurrentConditions> {
    let record = raw.filter(|r| r.is_object())?;
    let temperature = record.get("temperature");
    let wind = record.get("wind");

    let time = record.get("time")
        .and_then(Value::as_str)
        .and_then(|s| parse_instant(s, source_tz).ok());

    Some(CurrentConditions::new(
        time,
        extract(temperature, ValueKey::Value),
        extract(temperature, ValueKey::FeelsLike),
        field_value(record, "precipitation"),
        field_value(record, "cloud_cover"),
        extract(wind, ValueKey::Speed),
        extract(wind, ValueKey::Direction),
        extract(wind, ValueKey::Gusts),
    ))
}

/// Normalizes every series of a secondary snapshot and merges them into one hourly sequence
/// ordered by time. Samples for the same instant are merged field by field, later series
/// win where both have a value.
///
/// # Arguments
///
/// * 'snapshot' - the secondary snapshot
/// * 'source_tz' - timezone of timestamps given without offset
pub fn normalize_secondary(snapshot: &SecondarySnapshot, source_tz: &Tz) -> Normalized<HourlySample> {
    let mut samples: Vec<HourlySample> = Vec::new();
    let mut unplaceable: Vec<Unplaceable> = Vec::new();

    for series in snapshot.series() {
        let schema = ProviderSchema::Secondary { parameter: series.parameter, wind_unit: series.wind_unit };
        let normalized = normalize_hourly(series.records, &schema, source_tz);
        let section = format!("secondary {}", series.parameter.map_or("forecast_data", |p| p.key()));
        samples.extend(normalized.samples);
        unplaceable.extend(normalized.unplaceable.into_iter().map(|u| Unplaceable { section: section.clone(), ..u }));
    }

    Normalized { samples: merge_by_time(samples), unplaceable }
}

/// Merges samples sharing an instant, see normalize_secondary
///
/// # Arguments
///
/// * 'samples' - samples in precedence order, later ones win
pub fn merge_by_time(samples: Vec<HourlySample>) -> Vec<HourlySample> {
    let mut merged: BTreeMap<DateTime<Utc>, HourlySample> = BTreeMap::new();

    for sample in samples {
        match merged.get_mut(&sample.timestamp_utc) {
            Some(existing) => existing.overlay(&sample),
            None => { merged.insert(sample.timestamp_utc, sample); }
        }
    }

    merged.into_values().collect()
}

/// Aggregates sub-hourly samples, e.g. a 15 minute nowcast, to one sample per hour of the
/// given timezone stamped at the start of that hour.
///
/// Precipitation is summed, gusts take the maximum and wind direction the vector mean. All
/// other values are averaged. Values missing in every sample of an hour stay missing.
///
/// # Arguments
///
/// * 'samples' - samples in any order
/// * 'tz' - timezone whose hours the samples are grouped by
pub fn aggregate_hourly(samples: &[HourlySample], tz: &Tz) -> Vec<HourlySample> {
    let mut hours: BTreeMap<DateTime<Utc>, Vec<&HourlySample>> = BTreeMap::new();
    for sample in samples {
        hours.entry(hour_start(sample.timestamp_utc, tz)).or_default().push(sample);
    }

    hours.into_iter()
        .map(|(start, group)| {
            let values = |f: fn(&HourlySample) -> Option<f64>| group.iter().filter_map(move |s| f(s));

            HourlySample {
                timestamp_utc: start,
                temperature_c: mean(values(|s| s.temperature_c)),
                precipitation_mm: values(|s| s.precipitation_mm).reduce(|a, b| a + b),
                cloud_cover_pct: mean(values(|s| s.cloud_cover_pct)),
                wind_speed: mean(values(|s| s.wind_speed)),
                wind_direction_deg: mean_direction(values(|s| s.wind_direction_deg)),
                wind_gust_speed: values(|s| s.wind_gust_speed).reduce(f64::max),
                visibility_m: mean(values(|s| s.visibility_m)),
                dew_point_c: mean(values(|s| s.dew_point_c)),
            }
        })
        .collect()
}

fn hour_start(timestamp: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    timestamp.with_timezone(tz)
        .duration_trunc(TimeDelta::hours(1))
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(timestamp)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Mean of angles in degrees via unit vectors, so 350 and 10 average to north
fn mean_direction(degrees: impl Iterator<Item = f64>) -> Option<f64> {
    let (x, y, count) = degrees.fold((0.0_f64, 0.0_f64, 0usize), |(x, y, count), d| {
        (x + d.to_radians().cos(), y + d.to_radians().sin(), count + 1)
    });
    if count == 0 {
        return None;
    }

    Some(y.atan2(x).to_degrees().rem_euclid(360.0))
}

fn primary_hourly(timestamp: DateTime<Utc>, record: &Value) -> HourlySample {
    let wind = record.get("wind");

    HourlySample {
        timestamp_utc: timestamp,
        temperature_c: field_value(record, "temperature"),
        precipitation_mm: field_value(record, "rain").or_else(|| field_value(record, "precipitation")),
        cloud_cover_pct: field_value(record, "cloud_cover"),
        wind_speed: extract(wind, ValueKey::Speed),
        wind_direction_deg: extract(wind, ValueKey::Direction),
        wind_gust_speed: extract(wind, ValueKey::Gusts),
        visibility_m: field_value(record, "visibility"),
        dew_point_c: field_value(record, "dew_point"),
    }
}

fn secondary_hourly(
    timestamp: DateTime<Utc>,
    record: &Value,
    parameter: Option<ForecastParameter>,
    wind_unit: SpeedUnit) -> HourlySample {

    let read = |p: ForecastParameter| -> Option<f64> {
        if parameter.is_none_or(|selected| selected == p) {
            field_value(record, p.key())
        } else {
            None
        }
    };

    HourlySample {
        timestamp_utc: timestamp,
        temperature_c: read(ForecastParameter::Temperature),
        precipitation_mm: read(ForecastParameter::Precipitation),
        cloud_cover_pct: None,
        wind_speed: read(ForecastParameter::WindSpeed).map(|s| wind_unit.to_kmh(s)),
        wind_direction_deg: read(ForecastParameter::WindDirection),
        wind_gust_speed: read(ForecastParameter::WindGust).map(|s| wind_unit.to_kmh(s)),
        visibility_m: None,
        dew_point_c: read(ForecastParameter::DewPoint),
    }
}

/// Reads and parses the time field of a record, or describes why it can't be placed
///
/// # Arguments
///
/// * 'section' - name of the section the record belongs to
/// * 'index' - index of the record in its section
/// * 'record' - the record
/// * 'key' - name of the time field
/// * 'parse' - parser for the field
fn place_in_time<T, E: ToString>(
    section: &str,
    index: usize,
    record: &Value,
    key: &str,
    parse: impl Fn(&str) -> Result<T, E>) -> Result<T, Unplaceable> {

    match record.get(key) {
        Some(Value::String(s)) => parse(s.as_str()).map_err(|e| Unplaceable {
            section: section.to_string(),
            index,
            raw_time: Some(s.clone()),
            reason: e.to_string(),
        }),
        Some(other) => Err(Unplaceable {
            section: section.to_string(),
            index,
            raw_time: Some(other.to_string()),
            reason: format!("'{}' is not a string", key),
        }),
        None => Err(Unplaceable {
            section: section.to_string(),
            index,
            raw_time: None,
            reason: format!("missing '{}'", key),
        }),
    }
}

fn naive_field(record: Option<&Value>, key: &str) -> Option<chrono::NaiveDateTime> {
    record?.get(key)?.as_str().and_then(parse_naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;
    use crate::mood::WeatherMood;
    use crate::wind::CompassDirection;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, h, m, 0).unwrap()
    }

    fn as_records(v: Value) -> Vec<Value> {
        v.as_array().unwrap().clone()
    }

    #[test]
    fn primary_hourly_shapes() {
        let raw = as_records(json!([
            {"time": "2025-06-01T00:00:00Z", "temperature": 18, "rain": 0, "cloud_cover": 10,
             "wind": {"speed": 12.0, "direction": 200, "gusts": 25.0}, "visibility": 24000},
            {"time": "2025-06-01T01:00:00Z", "temperature": {"value": 17.5, "unit": "°C"},
             "precipitation": {"value": 0.4, "unit": "mm"}, "cloud_cover": {"value": 55}}
        ]));

        let result = normalize_hourly(&raw, &ProviderSchema::Primary, &Tz::UTC);

        assert!(result.unplaceable.is_empty());
        assert_eq!(result.samples.len(), 2);

        let first = &result.samples[0];
        assert_eq!(first.timestamp_utc, utc(1, 0, 0));
        assert_eq!(first.temperature_c, Some(18.0));
        assert_eq!(first.precipitation_mm, Some(0.0));
        assert_eq!(first.cloud_cover_pct, Some(10.0));
        assert_eq!(first.wind_speed, Some(12.0));
        assert_eq!(first.wind_direction_deg, Some(200.0));
        assert_eq!(first.wind_gust_speed, Some(25.0));
        assert_eq!(first.visibility_m, Some(24000.0));

        let second = &result.samples[1];
        assert_eq!(second.temperature_c, Some(17.5));
        assert_eq!(second.precipitation_mm, Some(0.4));
        assert_eq!(second.cloud_cover_pct, Some(55.0));
        assert_eq!(second.wind_speed, None);
    }

    #[test]
    fn malformed_fields_degrade_per_field() {
        let raw = as_records(json!([
            {"time": "2025-06-01T00:00:00Z", "temperature": "warm", "rain": null, "cloud_cover": 40,
             "wind": 7}
        ]));

        let result = normalize_hourly(&raw, &ProviderSchema::Primary, &Tz::UTC);
        let sample = &result.samples[0];

        assert_eq!(sample.temperature_c, None);
        assert_eq!(sample.precipitation_mm, None);
        assert_eq!(sample.cloud_cover_pct, Some(40.0));
        // bare numeric wind is taken as the speed
        assert_eq!(sample.wind_speed, Some(7.0));
        assert_eq!(sample.wind_direction_deg, Some(7.0));
    }

    #[test]
    fn unparsable_times_are_reported_not_fatal() {
        let raw = as_records(json!([
            {"time": "2025-06-01T00:00:00Z", "temperature": 18},
            {"time": "soon", "temperature": 19},
            {"temperature": 20},
            {"time": 1748736000, "temperature": 21},
            "not a record",
            {"time": "2025-06-01T02:00:00Z", "temperature": 22}
        ]));

        let result = normalize_hourly(&raw, &ProviderSchema::Primary, &Tz::UTC);

        assert_eq!(result.samples.len(), 2);
        assert_eq!(result.samples[1].temperature_c, Some(22.0));
        assert_eq!(result.unplaceable.iter().map(|u| u.index).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(result.unplaceable[0].raw_time.as_deref(), Some("soon"));
        assert_eq!(result.unplaceable[1].raw_time, None);
        assert!(result.unplaceable.iter().all(|u| u.section == "hourly"));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let hourly = normalize_hourly(&[], &ProviderSchema::Primary, &Tz::UTC);
        let daily = normalize_daily(&[], &ProviderSchema::Primary);

        assert!(hourly.samples.is_empty() && hourly.unplaceable.is_empty());
        assert!(daily.samples.is_empty() && daily.unplaceable.is_empty());
    }

    #[test]
    fn primary_daily() {
        let raw = as_records(json!([
            {"date": "2025-06-01", "temperature": {"max": 25, "min": 14}, "precipitation_sum": 0,
             "uv_index_max": 7.1,
             "sun": {"sunrise": "2025-06-01T04:55", "sunset": "2025-06-01T20:51", "daylight_duration": 57360.0}},
            {"date": "2025-06-02", "temperature": {"max": null}},
            {"date": "June 3rd"}
        ]));

        let result = normalize_daily(&raw, &ProviderSchema::Primary);

        assert_eq!(result.samples.len(), 2);
        assert_eq!(result.unplaceable.len(), 1);

        let first = &result.samples[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(first.temperature_max_c, Some(25.0));
        assert_eq!(first.temperature_min_c, Some(14.0));
        assert_eq!(first.precipitation_sum_mm, Some(0.0));
        assert_eq!(first.uv_index_max, Some(7.1));
        assert_eq!(first.sunrise.map(|s| s.format("%H:%M").to_string()).as_deref(), Some("04:55"));
        assert_eq!(first.daylight_duration_s, Some(57360.0));

        let second = &result.samples[1];
        assert_eq!(second.temperature_max_c, None);
        assert_eq!(second.precipitation_sum_mm, None);
        assert_eq!(second.sunrise, None);
    }

    #[test]
    fn secondary_selected_parameter_only() {
        let raw = as_records(json!([
            {"time": "2025-06-01T12:00+00:00", "temperature": 21.0, "wind_speed": 5.0, "dew_point": 11.0}
        ]));
        let schema = ProviderSchema::Secondary {
            parameter: Some(ForecastParameter::Temperature),
            wind_unit: SpeedUnit::MetersPerSecond,
        };

        let result = normalize_hourly(&raw, &schema, &Tz::UTC);
        let sample = &result.samples[0];

        assert_eq!(sample.temperature_c, Some(21.0));
        assert_eq!(sample.wind_speed, None);
        assert_eq!(sample.dew_point_c, None);
    }

    #[test]
    fn secondary_wind_converted_to_kmh() {
        let raw = as_records(json!([
            {"time": "2025-06-01T12:00+00:00", "wind_speed": 5.0, "wind_gust": 10.0, "wind_direction": 90}
        ]));
        let schema = ProviderSchema::Secondary { parameter: None, wind_unit: SpeedUnit::MetersPerSecond };

        let sample = &normalize_hourly(&raw, &schema, &Tz::UTC).samples[0];

        assert_eq!(sample.wind_speed, Some(18.0));
        assert_eq!(sample.wind_gust_speed, Some(36.0));
        assert_eq!(sample.wind_direction_deg, Some(90.0));
        assert_eq!(sample.cloud_cover_pct, None);
    }

    #[test]
    fn secondary_series_are_merged_by_time() {
        let snapshot: SecondarySnapshot = serde_json::from_value(json!({
            "temperature": {
                "forecast_data": [
                    {"time": "2025-06-01T12:15+00:00", "temperature": 21.5},
                    {"time": "2025-06-01T12:00+00:00", "temperature": 21.0}
                ],
                "units": {"temperature": "°C"}
            },
            "precipitation": {
                "forecast_data": [
                    {"time": "2025-06-01T12:00+00:00", "precipitation": 0.3},
                    {"time": "bad", "precipitation": 9.9}
                ],
                "units": {"precipitation": "kg m-2"}
            }
        })).unwrap();

        let result = normalize_secondary(&snapshot, &Tz::UTC);

        assert_eq!(result.samples.len(), 2);
        assert_eq!(result.unplaceable.len(), 1);
        assert_eq!(result.unplaceable[0].section, "secondary precipitation");
        assert_eq!(result.unplaceable[0].index, 1);
        assert_eq!(result.samples[0].timestamp_utc, utc(1, 12, 0));
        assert_eq!(result.samples[0].temperature_c, Some(21.0));
        assert_eq!(result.samples[0].precipitation_mm, Some(0.3));
        assert_eq!(result.samples[1].timestamp_utc, utc(1, 12, 15));
        assert_eq!(result.samples[1].precipitation_mm, None);
    }

    #[test]
    fn current_conditions() {
        let raw = json!({
            "time": "2025-06-01T14:00",
            "temperature": {"value": 24.3, "unit": "°C", "feels_like": 25.1},
            "precipitation": {"value": 0.0, "unit": "mm"},
            "wind": {"speed": 14.0, "gusts": 31.0, "direction": 305, "unit": "km/h"},
            "cloud_cover": {"value": 12, "unit": "%"}
        });

        let current = normalize_current(Some(&raw), &chrono_tz::Europe::Vienna).unwrap();

        assert_eq!(current.time, Some(utc(1, 12, 0)));
        assert_eq!(current.temperature_c, Some(24.3));
        assert_eq!(current.feels_like_c, Some(25.1));
        assert_eq!(current.wind_gust_speed, Some(31.0));
        assert_eq!(current.wind_direction, CompassDirection::NW);
        assert_eq!(current.mood, WeatherMood::Sunny);

        assert_eq!(normalize_current(None, &Tz::UTC), None);
        assert_eq!(normalize_current(Some(&json!([1, 2])), &Tz::UTC), None);
    }

    #[test]
    fn mood_rederived_after_normalization() {
        let raw = as_records(json!([
            {"time": "2025-06-01T12:00:00Z", "rain": 12, "cloud_cover": 95}
        ]));

        let sample = &normalize_hourly(&raw, &ProviderSchema::Primary, &Tz::UTC).samples[0];

        assert_eq!(sample.mood(), WeatherMood::Thunderstorm);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let raw = as_records(json!([
            {"time": "2025-06-01T00:00", "temperature": 18, "rain": 0.2, "cloud_cover": 85}
        ]));

        let a = normalize_hourly(&raw, &ProviderSchema::Primary, &chrono_tz::Europe::Vienna);
        let b = normalize_hourly(&raw, &ProviderSchema::Primary, &chrono_tz::Europe::Vienna);

        assert_eq!(a, b);
    }

    #[test]
    fn quarter_hours_aggregate_to_hours() {
        let snapshot: SecondarySnapshot = serde_json::from_value(json!({
            "forecast_data": [
                {"time": "2025-06-01T12:00+00:00", "temperature": 20.0, "precipitation": 0.25, "wind_gust": 5.0, "wind_direction": 350},
                {"time": "2025-06-01T12:15+00:00", "temperature": 20.5, "precipitation": 0.25, "wind_gust": 8.0, "wind_direction": 10},
                {"time": "2025-06-01T12:30+00:00", "temperature": 21.0, "precipitation": 0.25, "wind_gust": 6.0},
                {"time": "2025-06-01T12:45+00:00", "temperature": 21.5, "precipitation": 0.25},
                {"time": "2025-06-01T13:00+00:00", "temperature": 22.0}
            ],
            "units": {"wind_gust": "m/s"}
        })).unwrap();

        let quarters = normalize_secondary(&snapshot, &Tz::UTC).samples;
        let hours = aggregate_hourly(&quarters, &chrono_tz::Europe::Vienna);

        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].timestamp_utc, utc(1, 12, 0));
        assert_eq!(hours[0].temperature_c, Some(20.75));
        assert_eq!(hours[0].precipitation_mm, Some(1.0));
        assert_eq!(hours[0].wind_gust_speed, Some(8.0 * 3.6));
        assert_eq!(crate::wind::wind_direction_label(hours[0].wind_direction_deg), CompassDirection::N);
        assert_eq!(hours[0].cloud_cover_pct, None);
        assert_eq!(hours[1].timestamp_utc, utc(1, 13, 0));
        assert_eq!(hours[1].precipitation_mm, None);
    }
}
