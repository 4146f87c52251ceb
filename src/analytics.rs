//! Summary analytics over the current readings and forecasts.
//!
//! Everything here is recomputed from scratch whenever a held sequence is
//! replaced; nothing is cached between refresh cycles.

use serde::Serialize;

use crate::aqi::{gauge_percent, AqiCategory};
use crate::models::{parse_instant, PredictionRecord, SensorReading};

// ---

pub const PERIOD_6_HOURS: &str = "6hours";
pub const PERIOD_48_HOURS: &str = "48hours";
pub const PERIOD_WEEK: &str = "week";

/// Oldest and newest reading dates, formatted `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Direction of the latest AQI movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Improving,
    Worsening,
}

/// Derived values shown alongside the raw sequences.
///
/// `None` means "unavailable": no forecast exists for that horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedAnalytics {
    // ---
    #[serde(rename = "totalRecords")]
    pub total_records: usize,

    #[serde(rename = "avgAQI")]
    pub avg_aqi: u32,

    /// One decimal place.
    #[serde(rename = "peakPM25")]
    pub peak_pm25: f64,

    #[serde(rename = "dateRange")]
    pub date_range: Option<DateRange>,

    #[serde(rename = "currentAQI")]
    pub current_aqi: u32,

    #[serde(rename = "currentCategory")]
    pub current_category: AqiCategory,

    #[serde(rename = "currentDescription")]
    pub current_description: &'static str,

    /// Fill of the 0..=300 AQI gauge, one decimal place.
    #[serde(rename = "gaugePercent")]
    pub gauge_percent: f64,

    /// Percentage change between the two newest readings, one decimal place.
    #[serde(rename = "aqiTrendPercent")]
    pub aqi_trend_percent: f64,

    #[serde(rename = "next6hAQI")]
    pub next_6h_aqi: Option<u32>,

    #[serde(rename = "peak48hPM25")]
    pub peak_48h_pm25: Option<f64>,

    #[serde(rename = "weeklyTrend")]
    pub weekly_trend: Trend,

    #[serde(rename = "modelConfidence")]
    pub model_confidence: Option<u8>,
}

impl Default for DerivedAnalytics {
    fn default() -> Self {
        compute_analytics(&[], &[])
    }
}

/// Compute all analytics. Both slices must be sorted newest first.
pub fn compute_analytics(
    readings: &[SensorReading],
    predictions: &[PredictionRecord],
) -> DerivedAnalytics {
    // ---
    let current_aqi = readings.first().map_or(0, |r| r.aqi_calculated);
    let current_category = AqiCategory::from_aqi(current_aqi);
    let aqi_trend_percent = aqi_trend_percent(readings);

    let next_6h_aqi = in_period(predictions, PERIOD_6_HOURS)
        .next()
        .map(|p| p.aqi_prediction);

    let peak_48h_pm25 = in_period(predictions, PERIOD_48_HOURS)
        .map(|p| p.values.pm2_5.unwrap_or(0.0))
        .reduce(f64::max)
        .map(round_1);

    let model_confidence = in_period(predictions, PERIOD_WEEK)
        .next()
        .map(|p| p.confidence_score);

    DerivedAnalytics {
        total_records: readings.len(),
        avg_aqi: average_aqi(readings),
        peak_pm25: peak_pm25(readings),
        date_range: date_range(readings),
        current_aqi,
        current_category,
        current_description: current_category.description(),
        gauge_percent: round_1(gauge_percent(current_aqi)),
        aqi_trend_percent,
        next_6h_aqi,
        peak_48h_pm25,
        weekly_trend: if aqi_trend_percent > 0.0 {
            Trend::Worsening
        } else {
            Trend::Improving
        },
        model_confidence,
    }
}

/// Mean `aqi_calculated`, rounded; 0 for no readings.
pub fn average_aqi(readings: &[SensorReading]) -> u32 {
    // ---
    if readings.is_empty() {
        return 0;
    }
    let total: f64 = readings.iter().map(|r| f64::from(r.aqi_calculated)).sum();
    (total / readings.len() as f64).round() as u32
}

/// Highest PM2.5 among readings, one decimal place; 0 for no readings.
pub fn peak_pm25(readings: &[SensorReading]) -> f64 {
    // ---
    readings
        .iter()
        .map(|r| r.values.pm2_5.unwrap_or(0.0))
        .reduce(f64::max)
        .map_or(0.0, round_1)
}

/// `((current - previous) / previous) * 100` over the two newest readings.
///
/// 0 with fewer than two readings or a previous index of 0.
pub fn aqi_trend_percent(readings: &[SensorReading]) -> f64 {
    // ---
    let [current, previous, ..] = readings else {
        return 0.0;
    };
    if previous.aqi_calculated == 0 {
        return 0.0;
    }

    let current = f64::from(current.aqi_calculated);
    let previous = f64::from(previous.aqi_calculated);
    round_1((current - previous) / previous * 100.0)
}

fn date_range(readings: &[SensorReading]) -> Option<DateRange> {
    // ---
    let newest = readings.first()?;
    let oldest = readings.last()?;
    Some(DateRange {
        start: date_label(&oldest.timestamp),
        end: date_label(&newest.timestamp),
    })
}

fn date_label(timestamp: &str) -> String {
    parse_instant(timestamp)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn in_period<'a>(
    predictions: &'a [PredictionRecord],
    period: &'a str,
) -> impl Iterator<Item = &'a PredictionRecord> + 'a {
    predictions
        .iter()
        .filter(move |p| p.prediction_period == period)
}

fn round_1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
