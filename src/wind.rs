use std::fmt;
use std::fmt::Formatter;
use serde::Serialize;

/// Eight-point compass direction a wind blows from, or Unknown if there is no usable bearing
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    #[serde(rename = "-")]
    Unknown,
}

const DIRECTIONS: [CompassDirection; 8] = [
    CompassDirection::N,
    CompassDirection::NE,
    CompassDirection::E,
    CompassDirection::SE,
    CompassDirection::S,
    CompassDirection::SW,
    CompassDirection::W,
    CompassDirection::NW,
];

/// Implementation of the Display Trait for pretty print
impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CompassDirection::Unknown => write!(f, "-"),
            d => write!(f, "{:?}", d),
        }
    }
}

/// Returns the compass label for a wind direction in degrees.
///
/// Degrees outside 0..360 are wrapped before lookup, missing or non-finite degrees give
/// CompassDirection::Unknown.
///
/// # Arguments
///
/// * 'degrees' - wind direction in degrees, 0 being north
pub fn wind_direction_label(degrees: Option<f64>) -> CompassDirection {
    match degrees {
        Some(deg) if deg.is_finite() => {
            let sector = (deg.rem_euclid(360.0) / 45.0).round() as usize % 8;
            DIRECTIONS[sector]
        }
        _ => CompassDirection::Unknown,
    }
}

/// Speed units used by the providers
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpeedUnit {
    KilometersPerHour,
    MetersPerSecond,
}

impl SpeedUnit {
    /// Interprets a unit string from a snapshot's units map, anything not recognised as
    /// meters per second is taken as km/h
    ///
    /// # Arguments
    ///
    /// * 'unit' - unit string, e.g. "m/s", "m s-1" or "km/h"
    pub fn from_unit_str(unit: &str) -> SpeedUnit {
        match unit.trim().to_ascii_lowercase().as_str() {
            "m/s" | "m s-1" | "m s**-1" | "ms-1" | "m.s-1" => SpeedUnit::MetersPerSecond,
            _ => SpeedUnit::KilometersPerHour,
        }
    }

    /// Converts a speed in this unit to km/h
    ///
    /// # Arguments
    ///
    /// * 'speed' - the speed to convert
    pub fn to_kmh(&self, speed: f64) -> f64 {
        match self {
            SpeedUnit::KilometersPerHour => speed,
            SpeedUnit::MetersPerSecond => speed * 3.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_and_intercardinal() {
        assert_eq!(wind_direction_label(Some(0.0)), CompassDirection::N);
        assert_eq!(wind_direction_label(Some(45.0)), CompassDirection::NE);
        assert_eq!(wind_direction_label(Some(90.0)), CompassDirection::E);
        assert_eq!(wind_direction_label(Some(180.0)), CompassDirection::S);
        assert_eq!(wind_direction_label(Some(270.0)), CompassDirection::W);
        assert_eq!(wind_direction_label(Some(315.0)), CompassDirection::NW);
    }

    #[test]
    fn rounds_to_nearest_sector() {
        assert_eq!(wind_direction_label(Some(22.0)), CompassDirection::N);
        assert_eq!(wind_direction_label(Some(23.0)), CompassDirection::NE);
        assert_eq!(wind_direction_label(Some(350.0)), CompassDirection::N);
        assert_eq!(wind_direction_label(Some(337.5)), CompassDirection::N);
    }

    #[test]
    fn periodic_over_full_turns() {
        for deg in (-720..=720).map(|d| d as f64 * 0.75) {
            assert_eq!(
                wind_direction_label(Some(deg)),
                wind_direction_label(Some(deg + 360.0)),
                "label differs for {} and {}", deg, deg + 360.0
            );
        }
        assert_eq!(wind_direction_label(Some(-90.0)), CompassDirection::W);
        assert_eq!(wind_direction_label(Some(720.0)), CompassDirection::N);
    }

    #[test]
    fn unknown_for_missing_or_nan() {
        assert_eq!(wind_direction_label(None), CompassDirection::Unknown);
        assert_eq!(wind_direction_label(Some(f64::NAN)), CompassDirection::Unknown);
        assert_eq!(wind_direction_label(Some(f64::INFINITY)), CompassDirection::Unknown);
        assert_eq!(CompassDirection::Unknown.to_string(), "-");
        assert_eq!(CompassDirection::SW.to_string(), "SW");
    }

    #[test]
    fn speed_units() {
        assert_eq!(SpeedUnit::from_unit_str("m/s"), SpeedUnit::MetersPerSecond);
        assert_eq!(SpeedUnit::from_unit_str(" M S-1 "), SpeedUnit::MetersPerSecond);
        assert_eq!(SpeedUnit::from_unit_str("km/h"), SpeedUnit::KilometersPerHour);
        assert_eq!(SpeedUnit::MetersPerSecond.to_kmh(10.0), 36.0);
        assert_eq!(SpeedUnit::KilometersPerHour.to_kmh(10.0), 10.0);
    }
}
