//! Flatten raw store JSON into ordered, typed record sequences.
//!
//! The store returns objects keyed by timestamp (and, for forecasts, by
//! period first). Key enumeration order is never trusted: every sequence is
//! sorted explicitly, newest first. Nothing here fails; shapes that do not
//! fit degrade to fewer or emptier records.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::aqi::calculate_aqi;
use crate::confidence::confidence_for_period;
use crate::models::{parse_instant, Metadata, Pollutants, PredictionRecord, SensorReading};

// ---

/// Normalize the sensor resource: `{ timestamp: { field: value, .. }, .. }`.
///
/// Null or non-object input yields an empty sequence.
pub fn normalize_sensor_data(raw: &Value) -> Vec<SensorReading> {
    // ---
    let Some(entries) = raw.as_object() else {
        if !raw.is_null() {
            tracing::debug!("sensor data is not an object, treating as empty");
        }
        return Vec::new();
    };

    let mut readings: Vec<SensorReading> = entries
        .iter()
        .map(|(timestamp, value)| {
            let values = Pollutants::from_value(value, &SensorReading::RESERVED);
            let aqi_calculated = calculate_aqi(values.pm2_5);
            SensorReading {
                timestamp: timestamp.clone(),
                values,
                aqi_calculated,
            }
        })
        .collect();

    readings.sort_by(|a, b| newest_first(&a.timestamp, &b.timestamp));
    readings
}

/// Normalize the predictions resource: `{ period: { timestamp: { .. } } }`.
///
/// Periods whose value is not an object are skipped. All periods are
/// flattened into one sequence sorted by `prediction_timestamp`, newest first.
pub fn normalize_predictions(raw: &Value) -> Vec<PredictionRecord> {
    // ---
    let Some(periods) = raw.as_object() else {
        if !raw.is_null() {
            tracing::debug!("predictions are not an object, treating as empty");
        }
        return Vec::new();
    };

    let mut predictions = Vec::new();

    for (period, period_data) in periods {
        let Some(entries) = period_data.as_object() else {
            tracing::debug!("Skipping malformed prediction period '{}'", period);
            continue;
        };

        let confidence_score = confidence_for_period(period);

        for (timestamp, value) in entries {
            let values = Pollutants::from_value(value, &PredictionRecord::RESERVED);
            let aqi_prediction = calculate_aqi(values.pm2_5);
            predictions.push(PredictionRecord {
                prediction_timestamp: timestamp.clone(),
                prediction_period: period.clone(),
                values,
                aqi_prediction,
                confidence_score,
            });
        }
    }

    predictions.sort_by(|a, b| {
        newest_first(&a.prediction_timestamp, &b.prediction_timestamp)
            .then_with(|| a.prediction_period.cmp(&b.prediction_period))
    });
    predictions
}

/// Normalize the metadata resource. Null or non-object input yields `None`.
pub fn normalize_metadata(raw: &Value) -> Option<Metadata> {
    raw.as_object().map(Metadata::from_object)
}

/// Group forecasts by period, keeping the newest-first order inside each group.
pub fn group_by_period(
    predictions: &[PredictionRecord],
) -> BTreeMap<String, Vec<PredictionRecord>> {
    // ---
    let mut groups: BTreeMap<String, Vec<PredictionRecord>> = BTreeMap::new();
    for prediction in predictions {
        groups
            .entry(prediction.prediction_period.clone())
            .or_default()
            .push(prediction.clone());
    }
    groups
}

/// Descending order on timestamp keys.
///
/// Parseable keys compare by instant and come before unparseable ones; equal
/// instants and unparseable keys fall back to the key text, also descending.
fn newest_first(a: &str, b: &str) -> Ordering {
    // ---
    let by_instant = match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_instant.then_with(|| b.cmp(a))
}
