use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use crate::config::Location;
use crate::day_buckets::GradientStop;
use crate::models::forecast::{CurrentConditions, DailySample, HourlySample};
use crate::mood::{WeatherIcon, WeatherMood};
use crate::series::ChartPoint;
use crate::summary::ForecastSummary;
use crate::wind::{wind_direction_label, CompassDirection};

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum DashboardStatus {
    Ok,
    Unavailable,
}

/// An hourly sample together with what the dashboard derives from it
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HourView {
    #[serde(flatten)]
    pub sample: HourlySample,
    pub mood: WeatherMood,
    pub icon: WeatherIcon,
    pub wind_direction: CompassDirection,
}

impl From<&HourlySample> for HourView {
    fn from(sample: &HourlySample) -> Self {
        HourView {
            sample: sample.clone(),
            mood: sample.mood(),
            icon: sample.icon(),
            wind_direction: wind_direction_label(sample.wind_direction_deg),
        }
    }
}

#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub mood_gradient: Vec<GradientStop>,
    pub current_hour_index: Option<usize>,
    pub hours: Vec<HourView>,
    pub series: Vec<ChartPoint>,
    pub summary: ForecastSummary,
}

#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub today: Option<ForecastSummary>,
    pub horizon: ForecastSummary,
}

/// Where the snapshot came from according to the fetch job
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FetchInfo {
    pub source: Option<String>,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

/// The document the dashboard front end reads
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub status: DashboardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub generated_at: DateTime<FixedOffset>,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub last_updated: Option<String>,
    pub fetch: Option<FetchInfo>,
    pub current: Option<CurrentConditions>,
    pub selected_day: NaiveDate,
    pub hourly_series: Vec<ChartPoint>,
    pub days: Vec<DayView>,
    pub daily: Vec<DailySample>,
    pub daily_series: Vec<ChartPoint>,
    pub summary: Option<SummaryView>,
    pub unplaceable: usize,
}

impl Dashboard {
    /// Returns a document telling the front end that there is no data to show
    ///
    /// # Arguments
    ///
    /// * 'generated_at' - generation time in the display timezone
    /// * 'location' - the configured location
    /// * 'reason' - why there is no data
    pub fn unavailable(generated_at: DateTime<FixedOffset>, location: &Location, reason: String) -> Dashboard {
        Dashboard {
            status: DashboardStatus::Unavailable,
            reason: Some(reason),
            generated_at,
            location: location.name.clone(),
            latitude: location.lat,
            longitude: location.long,
            timezone: location.timezone.clone(),
            last_updated: None,
            fetch: None,
            current: None,
            selected_day: generated_at.date_naive(),
            hourly_series: Vec::new(),
            days: Vec::new(),
            daily: Vec::new(),
            daily_series: Vec::new(),
            summary: None,
            unplaceable: 0,
        }
    }
}
