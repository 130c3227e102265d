use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use crate::mood::{weather_icon, weather_mood, WeatherIcon, WeatherMood};
use crate::wind::{wind_direction_label, CompassDirection};

/// One hour of forecast in canonical shape. Wind speeds are in km/h.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HourlySample {
    pub timestamp_utc: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub wind_gust_speed: Option<f64>,
    pub visibility_m: Option<f64>,
    pub dew_point_c: Option<f64>,
}

impl HourlySample {
    /// Returns a sample for the given instant with all values missing
    ///
    /// # Arguments
    ///
    /// * 'timestamp_utc' - the instant the sample is valid for
    pub fn empty(timestamp_utc: DateTime<Utc>) -> HourlySample {
        HourlySample {
            timestamp_utc,
            temperature_c: None,
            precipitation_mm: None,
            cloud_cover_pct: None,
            wind_speed: None,
            wind_direction_deg: None,
            wind_gust_speed: None,
            visibility_m: None,
            dew_point_c: None,
        }
    }

    /// Weather mood for the hour, missing precipitation or cloud cover counts as zero
    pub fn mood(&self) -> WeatherMood {
        weather_mood(self.precipitation_mm.unwrap_or(0.0), self.cloud_cover_pct.unwrap_or(0.0))
    }

    /// Weather icon for the hour, missing precipitation or cloud cover counts as zero
    pub fn icon(&self) -> WeatherIcon {
        weather_icon(self.precipitation_mm.unwrap_or(0.0), self.cloud_cover_pct.unwrap_or(0.0))
    }

    /// Overlays another sample for the same instant, values present in 'other' win
    ///
    /// # Arguments
    ///
    /// * 'other' - the later sample
    pub fn overlay(&mut self, other: &HourlySample) {
        self.temperature_c = other.temperature_c.or(self.temperature_c);
        self.precipitation_mm = other.precipitation_mm.or(self.precipitation_mm);
        self.cloud_cover_pct = other.cloud_cover_pct.or(self.cloud_cover_pct);
        self.wind_speed = other.wind_speed.or(self.wind_speed);
        self.wind_direction_deg = other.wind_direction_deg.or(self.wind_direction_deg);
        self.wind_gust_speed = other.wind_gust_speed.or(self.wind_gust_speed);
        self.visibility_m = other.visibility_m.or(self.visibility_m);
        self.dew_point_c = other.dew_point_c.or(self.dew_point_c);
    }
}

/// One day of forecast in canonical shape
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DailySample {
    pub date: NaiveDate,
    pub temperature_max_c: Option<f64>,
    pub temperature_min_c: Option<f64>,
    pub precipitation_sum_mm: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub daylight_duration_s: Option<f64>,
}

/// Current conditions at fetch time
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub time: Option<DateTime<Utc>>,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub wind_gust_speed: Option<f64>,
    pub wind_direction: CompassDirection,
    pub mood: WeatherMood,
    pub icon: WeatherIcon,
}

/// Parameters the secondary provider delivers as separate series
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ForecastParameter {
    Temperature,
    Precipitation,
    DewPoint,
    WindSpeed,
    WindGust,
    WindDirection,
}

impl ForecastParameter {
    pub const ALL: [ForecastParameter; 6] = [
        ForecastParameter::Temperature,
        ForecastParameter::Precipitation,
        ForecastParameter::DewPoint,
        ForecastParameter::WindSpeed,
        ForecastParameter::WindGust,
        ForecastParameter::WindDirection,
    ];

    /// Field/document key of the parameter
    pub fn key(&self) -> &'static str {
        match self {
            ForecastParameter::Temperature => "temperature",
            ForecastParameter::Precipitation => "precipitation",
            ForecastParameter::DewPoint => "dew_point",
            ForecastParameter::WindSpeed => "wind_speed",
            ForecastParameter::WindGust => "wind_gust",
            ForecastParameter::WindDirection => "wind_direction",
        }
    }
}

/// A record that couldn't be placed in time
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Unplaceable {
    /// Snapshot section the record came from, e.g. hourly or secondary wind_speed
    pub section: String,
    pub index: usize,
    pub raw_time: Option<String>,
    pub reason: String,
}

/// Output of a normalization pass: the samples that could be placed and a report
/// of those that couldn't
#[derive(Clone, PartialEq, Debug)]
pub struct Normalized<T> {
    pub samples: Vec<T>,
    pub unplaceable: Vec<Unplaceable>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Normalized { samples: Vec::new(), unplaceable: Vec::new() }
    }
}

impl CurrentConditions {
    /// Builds current conditions, deriving compass label, mood and icon from the values
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: Option<DateTime<Utc>>,
        temperature_c: Option<f64>,
        feels_like_c: Option<f64>,
        precipitation_mm: Option<f64>,
        cloud_cover_pct: Option<f64>,
        wind_speed: Option<f64>,
        wind_direction_deg: Option<f64>,
        wind_gust_speed: Option<f64>) -> CurrentConditions {

        let precipitation = precipitation_mm.unwrap_or(0.0);
        let cloud = cloud_cover_pct.unwrap_or(0.0);

        CurrentConditions {
            time,
            temperature_c,
            feels_like_c,
            precipitation_mm,
            cloud_cover_pct,
            wind_speed,
            wind_direction_deg,
            wind_gust_speed,
            wind_direction: wind_direction_label(wind_direction_deg),
            mood: weather_mood(precipitation, cloud),
            icon: weather_icon(precipitation, cloud),
        }
    }
}
