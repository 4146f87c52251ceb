//! PM2.5 to Air Quality Index conversion.
//!
//! Every AQI shown by the service, realized or forecast, comes from
//! [`calculate_aqi`]. The breakpoints are the pre-2024 US EPA PM2.5 table.

use serde::Serialize;

/// One row of the breakpoint table: `(c_low, c_high, aqi_low, aqi_span, c_span)`.
///
/// `c_high` is the inclusive upper bound of the row; the last row is open-ended.
const PM25_BREAKPOINTS: [(f64, f64, f64, f64, f64); 6] = [
    (0.0, 12.0, 0.0, 50.0, 12.0),
    (12.1, 35.4, 51.0, 49.0, 23.3),
    (35.5, 55.4, 101.0, 49.0, 19.9),
    (55.5, 150.4, 151.0, 49.0, 94.9),
    (150.5, 250.4, 201.0, 99.0, 99.9),
    (250.5, f64::INFINITY, 301.0, 99.0, 99.9),
];

/// Calculate the AQI for a PM2.5 concentration in µg/m³.
///
/// Absent, negative and non-finite concentrations count as 0. Within a row
/// the index is interpolated linearly and rounded half away from zero.
pub fn calculate_aqi(pm25: Option<f64>) -> u32 {
    // ---
    let c = match pm25 {
        Some(c) if c.is_finite() && c > 0.0 => c,
        _ => 0.0,
    };

    let row = PM25_BREAKPOINTS
        .iter()
        .find(|(_, c_high, ..)| c <= *c_high)
        .unwrap_or(&PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1]);

    let (c_low, _, aqi_low, aqi_span, c_span) = *row;
    let aqi = aqi_low + (c - c_low) * aqi_span / c_span;

    aqi.round().max(0.0) as u32
}

/// Health category for an AQI value. Serializes as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive")]
    UnhealthyForSensitive,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> Self {
        // ---
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitive,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitive => "Unhealthy for Sensitive",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is satisfactory",
            AqiCategory::Moderate => "Acceptable for most people",
            AqiCategory::UnhealthyForSensitive => "May cause issues for sensitive people",
            AqiCategory::Unhealthy => "May cause health issues",
            AqiCategory::VeryUnhealthy => "Health warnings for everyone",
            AqiCategory::Hazardous => "Emergency conditions",
        }
    }
}

/// Fill level of a 0..=300 AQI gauge, in percent, capped at 100.
pub fn gauge_percent(aqi: u32) -> f64 {
    (f64::from(aqi) / 300.0 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_breakpoint_edges() {
        // ---
        assert_eq!(calculate_aqi(Some(0.0)), 0);
        assert_eq!(calculate_aqi(Some(12.0)), 50);
        assert_eq!(calculate_aqi(Some(12.1)), 51);
        assert_eq!(calculate_aqi(Some(35.4)), 100);
        assert_eq!(calculate_aqi(Some(35.5)), 101);
        assert_eq!(calculate_aqi(Some(55.4)), 150);
        assert_eq!(calculate_aqi(Some(55.5)), 151);
        assert_eq!(calculate_aqi(Some(150.4)), 200);
        assert_eq!(calculate_aqi(Some(150.5)), 201);
        assert_eq!(calculate_aqi(Some(250.4)), 300);
        assert_eq!(calculate_aqi(Some(250.5)), 301);
        assert_eq!(calculate_aqi(Some(350.4)), 400);
    }

    #[test]
    fn test_known_values() {
        // ---
        // round(10 * 50 / 12) = round(41.67)
        assert_eq!(calculate_aqi(Some(10.0)), 42);
        // round(5 * 50 / 12) = round(20.83)
        assert_eq!(calculate_aqi(Some(5.0)), 21);
        // 51 + 12.9 * 49 / 23.3 = 78.13
        assert_eq!(calculate_aqi(Some(25.0)), 78);
    }

    #[test]
    fn test_absent_and_invalid_count_as_zero() {
        // ---
        assert_eq!(calculate_aqi(None), 0);
        assert_eq!(calculate_aqi(Some(-4.0)), 0);
        assert_eq!(calculate_aqi(Some(f64::NAN)), 0);
    }

    #[test]
    fn test_segments_stay_in_range_and_monotonic() {
        // ---
        let ranges: [(f64, f64, u32, u32); 5] = [
            (0.0, 12.0, 0, 50),
            (12.1, 35.4, 51, 100),
            (35.5, 55.4, 101, 150),
            (55.5, 150.4, 151, 200),
            (150.5, 250.4, 201, 300),
        ];

        for (c_low, c_high, aqi_low, aqi_high) in ranges {
            let mut c = c_low;
            while c <= c_high {
                let aqi = calculate_aqi(Some(c));
                assert!(
                    (aqi_low..=aqi_high).contains(&aqi),
                    "AQI({c}) = {aqi} outside [{aqi_low}, {aqi_high}]"
                );
                c += 0.1;
            }
        }

        let mut previous = 0;
        for step in 0..5000 {
            let aqi = calculate_aqi(Some(f64::from(step) * 0.1));
            assert!(aqi >= previous, "AQI dropped at {}", f64::from(step) * 0.1);
            previous = aqi;
        }
    }

    #[test]
    fn test_pure() {
        // ---
        for c in [0.0, 11.9, 42.0, 300.0] {
            assert_eq!(calculate_aqi(Some(c)), calculate_aqi(Some(c)));
        }
    }

    #[test]
    fn test_category_bands() {
        // ---
        assert_eq!(AqiCategory::from_aqi(0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(150), AqiCategory::UnhealthyForSensitive);
        assert_eq!(AqiCategory::from_aqi(200), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(300), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_aqi(301), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::Hazardous.label(), "Hazardous");
    }

    #[test]
    fn test_category_serializes_as_label() {
        // ---
        for aqi in [0, 75, 120, 175, 250, 400] {
            let category = AqiCategory::from_aqi(aqi);
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                serde_json::json!(category.label())
            );
        }
    }

    #[test]
    fn test_gauge_percent() {
        // ---
        assert_eq!(gauge_percent(0), 0.0);
        assert_eq!(gauge_percent(150), 50.0);
        assert_eq!(gauge_percent(450), 100.0);
    }
}
