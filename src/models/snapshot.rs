use serde::Deserialize;
use serde_json::Value;
use crate::models::forecast::ForecastParameter;
use crate::wind::SpeedUnit;

/// Untyped upstream record for one hour or one day
pub type RawSample = Value;

/// Snapshot written by the fetch job for the primary provider.
///
/// Forecast sections are kept as raw JSON so that a malformed section degrades to an empty
/// one instead of failing the whole document.
#[derive(Deserialize, Default, Debug)]
pub struct PrimarySnapshot {
    pub last_updated: Option<String>,
    pub current_weather: Option<Value>,
    pub hourly_forecast: Option<Value>,
    pub daily_forecast: Option<Value>,
}

impl PrimarySnapshot {
    pub fn hourly_records(&self) -> &[RawSample] {
        records(self.hourly_forecast.as_ref())
    }

    pub fn daily_records(&self) -> &[RawSample] {
        records(self.daily_forecast.as_ref())
    }
}

/// One series of the secondary provider, i.e. records sharing a `time` field
pub struct SecondarySeries<'a> {
    pub parameter: Option<ForecastParameter>,
    pub records: &'a [RawSample],
    pub wind_unit: SpeedUnit,
}

/// Snapshot written by the fetch job for the secondary provider.
///
/// Either keyed by parameter name, each parameter holding its own `forecast_data` and `units`,
/// or a single combined `forecast_data` with all parameters on each record.
#[derive(Deserialize, Default, Debug)]
#[serde(transparent)]
pub struct SecondarySnapshot(pub Value);

impl SecondarySnapshot {
    pub fn last_updated(&self) -> Option<&str> {
        self.0.get("last_updated").and_then(Value::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        self.0.get("location").and_then(Value::as_str)
    }

    /// Returns all series in the document, the combined one first
    pub fn series(&self) -> Vec<SecondarySeries<'_>> {
        let mut series: Vec<SecondarySeries> = Vec::new();

        if let Some(data) = self.0.get("forecast_data") {
            series.push(SecondarySeries {
                parameter: None,
                records: records(Some(data)),
                wind_unit: speed_unit(self.0.get("units")),
            });
        }

        for parameter in ForecastParameter::ALL {
            if let Some(doc) = self.0.get(parameter.key()).filter(|d| d.is_object()) {
                series.push(SecondarySeries {
                    parameter: Some(parameter),
                    records: records(doc.get("forecast_data")),
                    wind_unit: speed_unit(doc.get("units")),
                });
            }
        }

        series
    }
}

/// Metadata written by the fetch job alongside each snapshot
#[derive(Deserialize, Debug, Clone)]
pub struct FetchMetadata {
    pub last_update: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

/// Returns the records of a forecast section, anything but an array is treated as empty
///
/// # Arguments
///
/// * 'section' - the section as found in the document
fn records(section: Option<&Value>) -> &[RawSample] {
    section
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or(&[])
}

/// Resolves the wind speed unit from a units map. The secondary provider reports in m/s
/// unless told otherwise.
///
/// # Arguments
///
/// * 'units' - the units map
fn speed_unit(units: Option<&Value>) -> SpeedUnit {
    units
        .and_then(|u| u.get("wind_speed").or_else(|| u.get("wind_gust")))
        .and_then(Value::as_str)
        .map(SpeedUnit::from_unit_str)
        .unwrap_or(SpeedUnit::MetersPerSecond)
}
