//! Data models for air quality readings, forecasts and store metadata.
//!
//! Pollutant fields stay `None` when the store did not send them. Code that
//! needs a number (AQI, analytics) substitutes 0 at the point of use, so a
//! missing value never displays as a measured zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

// ---

const FIELD_TEMPERATURE: &str = "temperature";
const FIELD_HUMIDITY: &str = "humidity";
const FIELD_PM2_5: &str = "PM2_5";
const FIELD_CO2: &str = "CO2";
const FIELD_VOCS: &str = "VOCs";
const FIELD_NOX: &str = "NOx";

/// Measurements shared by sensor readings and forecasts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pollutants {
    // ---
    /// Temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Relative humidity in %.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    /// Fine particulate matter in µg/m³.
    #[serde(rename = "PM2_5", default, skip_serializing_if = "Option::is_none")]
    pub pm2_5: Option<f64>,

    /// Carbon dioxide in ppm.
    #[serde(rename = "CO2", default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,

    /// Volatile organic compounds in ppb.
    #[serde(rename = "VOCs", default, skip_serializing_if = "Option::is_none")]
    pub vocs: Option<f64>,

    /// Nitrogen oxides in ppb.
    #[serde(rename = "NOx", default, skip_serializing_if = "Option::is_none")]
    pub nox: Option<f64>,

    /// Any other fields the store sent, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Pollutants {
    /// Build from a raw value object.
    ///
    /// Known fields are read leniently (see [`lenient_number`]). Every other
    /// key lands in `extra`, except those listed in `reserved`, which belong
    /// to the enclosing record and are dropped.
    pub fn from_object(object: &Map<String, Value>, reserved: &[&str]) -> Self {
        // ---
        let mut values = Pollutants::default();

        for (key, value) in object {
            match key.as_str() {
                FIELD_TEMPERATURE => values.temperature = lenient_number(value),
                FIELD_HUMIDITY => values.humidity = lenient_number(value),
                FIELD_PM2_5 => values.pm2_5 = lenient_number(value),
                FIELD_CO2 => values.co2 = lenient_number(value),
                FIELD_VOCS => values.vocs = lenient_number(value),
                FIELD_NOX => values.nox = lenient_number(value),
                other if reserved.contains(&other) => {}
                other => {
                    values.extra.insert(other.to_string(), value.clone());
                }
            }
        }

        values
    }

    /// Same as [`Pollutants::from_object`], for a value that may not be an object.
    pub fn from_value(value: &Value, reserved: &[&str]) -> Self {
        // ---
        match value.as_object() {
            Some(object) => Self::from_object(object, reserved),
            None => Pollutants::default(),
        }
    }
}

/// Read a JSON number, or a string that starts with one (`"12.5ug"` reads
/// as 12.5). Anything else is absent.
pub fn lenient_number(value: &Value) -> Option<f64> {
    // ---
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_float(s),
        _ => None,
    }
}

/// Parse the longest decimal prefix of `s` after leading whitespace.
fn leading_float(s: &str) -> Option<f64> {
    // ---
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_start = end + 1 + sign;
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a store timestamp key into an instant.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` (either separator, taken
/// as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(key: &str) -> Option<DateTime<Utc>> {
    // ---
    let key = key.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(key) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(key, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One realized sensor reading, keyed by its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    // ---
    /// Store key, kept exactly as received.
    pub timestamp: String,

    #[serde(flatten)]
    pub values: Pollutants,

    /// AQI derived from `PM2_5`.
    pub aqi_calculated: u32,
}

impl SensorReading {
    /// Keys owned by the reading itself; never copied from the raw object.
    pub const RESERVED: [&'static str; 2] = ["timestamp", "aqi_calculated"];
}

/// One forecast record for a given horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    // ---
    pub prediction_timestamp: String,

    /// Horizon label, e.g. `6hours` or `week`.
    pub prediction_period: String,

    #[serde(flatten)]
    pub values: Pollutants,

    /// AQI derived from the forecast `PM2_5`.
    pub aqi_prediction: u32,

    /// Static confidence for the horizon, 0..=100.
    pub confidence_score: u8,
}

impl PredictionRecord {
    pub const RESERVED: [&'static str; 4] = [
        "prediction_timestamp",
        "prediction_period",
        "aqi_prediction",
        "confidence_score",
    ];
}

/// Free-form store metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    // ---
    /// Identifiers of upstream data sources, e.g. `outdoor_sensor`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sources: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Build from a raw metadata object, tolerating odd field types.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        // ---
        let mut metadata = Metadata::default();

        for (key, value) in object {
            match key.as_str() {
                "data_sources" => {
                    metadata.data_sources = value
                        .as_array()
                        .map(|sources| {
                            sources
                                .iter()
                                .filter_map(|s| s.as_str().map(String::from))
                                .collect()
                        })
                        .unwrap_or_default();
                }
                "last_updated" => {
                    metadata.last_updated = match value {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    };
                }
                other => {
                    metadata.extra.insert(other.to_string(), value.clone());
                }
            }
        }

        metadata
    }

    /// Parsed `last_updated`, when present and recognizable.
    pub fn last_updated_instant(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_instant)
    }

    /// Data source identifiers rendered for display: `outdoor_pm_sensor`
    /// becomes `Outdoor Pm Sensor`, `pm-sensor_v2` becomes `Pm-Sensor V2`.
    pub fn source_labels(&self) -> Vec<String> {
        self.data_sources.iter().map(|s| title_case(s)).collect()
    }
}

/// Underscores to spaces, then uppercase every ASCII word character that
/// starts a word.
fn title_case(source: &str) -> String {
    // ---
    let mut out = String::with_capacity(source.len());
    let mut in_word = false;

    for c in source.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        out.push(if is_word && !in_word {
            c.to_ascii_uppercase()
        } else {
            c
        });
        in_word = is_word;
    }

    out
}
