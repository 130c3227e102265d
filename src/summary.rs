use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::models::forecast::HourlySample;

/// Temperature difference (°C) between first and last hour below which the trend is steady
const STEADY_TREND: f64 = 0.5;

/// Mean spread between temperature and dew point (°C) above which humidity risk is low
const LOW_HUMIDITY_SPREAD: f64 = 2.0;

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureTrend {
    Rising,
    Falling,
    Steady,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HumidityRisk {
    Low,
    Moderate,
}

#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PeakPrecipitation {
    pub time: DateTime<Utc>,
    pub amount_mm: f64,
}

/// Key figures over a set of hourly samples
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub temperature_min_c: Option<f64>,
    pub temperature_max_c: Option<f64>,
    pub total_precipitation_mm: f64,
    pub peak_precipitation: Option<PeakPrecipitation>,
    pub mean_wind_speed: Option<f64>,
    pub max_wind_gust: Option<f64>,
    pub temperature_trend: Option<TemperatureTrend>,
    pub humidity_comfort_c: Option<f64>,
    pub humidity_risk: Option<HumidityRisk>,
}

/// Summarizes hourly samples. Missing values are skipped, figures without any
/// underlying value are None.
///
/// # Arguments
///
/// * 'hours' - samples ordered by time
pub fn summarize(hours: &[HourlySample]) -> ForecastSummary {
    let temperatures: Vec<f64> = hours.iter().filter_map(|h| h.temperature_c).collect();
    let winds: Vec<f64> = hours.iter().filter_map(|h| h.wind_speed).collect();

    let peak_precipitation = hours.iter()
        .filter_map(|h| h.precipitation_mm.map(|p| (h.timestamp_utc, p)))
        .filter(|(_, p)| *p > 0.0)
        .fold(None, |peak: Option<(DateTime<Utc>, f64)>, (t, p)| match peak {
            Some((_, max)) if max >= p => peak,
            _ => Some((t, p)),
        })
        .map(|(time, amount_mm)| PeakPrecipitation { time, amount_mm });

    let spreads: Vec<f64> = hours.iter()
        .filter_map(|h| Some(h.temperature_c? - h.dew_point_c?))
        .collect();
    let humidity_comfort_c = mean(&spreads);

    ForecastSummary {
        temperature_min_c: temperatures.iter().copied().reduce(f64::min),
        temperature_max_c: temperatures.iter().copied().reduce(f64::max),
        total_precipitation_mm: hours.iter().filter_map(|h| h.precipitation_mm).sum(),
        peak_precipitation,
        mean_wind_speed: mean(&winds),
        max_wind_gust: hours.iter().filter_map(|h| h.wind_gust_speed).reduce(f64::max),
        temperature_trend: trend(&temperatures),
        humidity_comfort_c,
        humidity_risk: humidity_comfort_c.map(|c| {
            if c > LOW_HUMIDITY_SPREAD { HumidityRisk::Low } else { HumidityRisk::Moderate }
        }),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn trend(temperatures: &[f64]) -> Option<TemperatureTrend> {
    let (first, last) = (temperatures.first()?, temperatures.last()?);
    if temperatures.len() < 2 {
        return None;
    }

    let diff = last - first;
    if diff.abs() < STEADY_TREND {
        Some(TemperatureTrend::Steady)
    } else if diff > 0.0 {
        Some(TemperatureTrend::Rising)
    } else {
        Some(TemperatureTrend::Falling)
    }
}
