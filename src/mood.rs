use std::fmt;
use std::fmt::Formatter;
use serde::Serialize;

/// Precipitation (mm) above which the mood is thunderstorm
const THUNDERSTORM_PRECIPITATION: f64 = 10.0;

/// Precipitation (mm) above which the mood is rain
const RAIN_PRECIPITATION: f64 = 1.0;

/// Cloud cover (%) above which the mood is cloudy
const CLOUDY_COVER: f64 = 80.0;

/// Cloud cover (%) below which the mood is sunny
const SUNNY_COVER: f64 = 30.0;

/// Cloud cover (%) above which the icon is cloudy
const ICON_CLOUDY_COVER: f64 = 60.0;

/// Cloud cover (%) above which the icon is partly cloudy
const ICON_PARTLY_COVER: f64 = 20.0;

/// Precipitation (mm) above which the icon is rain
const ICON_RAIN_PRECIPITATION: f64 = 1.0;

/// Precipitation (mm) above which the icon is at least partly cloudy
const ICON_TRACE_PRECIPITATION: f64 = 0.0;

/// Coarse weather feel, drives background and gradient colors
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMood {
    Sunny,
    Cloudy,
    Rain,
    Thunderstorm,
    Default,
}

impl WeatherMood {
    /// Returns the fixed background color for the mood
    pub fn color(&self) -> &'static str {
        match self {
            WeatherMood::Sunny => "#ffd166",
            WeatherMood::Cloudy => "#a0aec0",
            WeatherMood::Rain => "#4a90d9",
            WeatherMood::Thunderstorm => "#4b3f72",
            WeatherMood::Default => "#8ecae6",
        }
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for WeatherMood {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            WeatherMood::Sunny        => write!(f, "sunny"),
            WeatherMood::Cloudy       => write!(f, "cloudy"),
            WeatherMood::Rain         => write!(f, "rain"),
            WeatherMood::Thunderstorm => write!(f, "thunderstorm"),
            WeatherMood::Default      => write!(f, "default"),
        }
    }
}

/// Classifies the weather mood from precipitation and cloud cover.
///
/// Precipitation takes precedence over cloud cover, so a heavy shower under a full sky is
/// a thunderstorm and not cloudy.
///
/// # Arguments
///
/// * 'precipitation_mm' - precipitation in mm
/// * 'cloud_cover_pct' - cloud cover in percent
pub fn weather_mood(precipitation_mm: f64, cloud_cover_pct: f64) -> WeatherMood {
    if precipitation_mm > THUNDERSTORM_PRECIPITATION {
        WeatherMood::Thunderstorm
    } else if precipitation_mm > RAIN_PRECIPITATION {
        WeatherMood::Rain
    } else if cloud_cover_pct > CLOUDY_COVER {
        WeatherMood::Cloudy
    } else if cloud_cover_pct < SUNNY_COVER {
        WeatherMood::Sunny
    } else {
        WeatherMood::Default
    }
}

/// Weather icon shown next to current conditions and in tables
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum WeatherIcon {
    Rain,
    Cloudy,
    PartlyCloudy,
    Sunny,
}

/// Selects the weather icon from precipitation and cloud cover.
///
/// Uses its own thresholds and is not derived from the mood, both taxonomies are shown
/// side by side.
///
/// # Arguments
///
/// * 'precipitation_mm' - precipitation in mm
/// * 'cloud_cover_pct' - cloud cover in percent
pub fn weather_icon(precipitation_mm: f64, cloud_cover_pct: f64) -> WeatherIcon {
    if precipitation_mm > ICON_RAIN_PRECIPITATION {
        WeatherIcon::Rain
    } else if cloud_cover_pct > ICON_CLOUDY_COVER {
        WeatherIcon::Cloudy
    } else if cloud_cover_pct > ICON_PARTLY_COVER || precipitation_mm > ICON_TRACE_PRECIPITATION {
        WeatherIcon::PartlyCloudy
    } else {
        WeatherIcon::Sunny
    }
}
