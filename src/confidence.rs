//! Static confidence scores for forecast horizons.

/// Confidence asserted for a horizon label missing from the table.
pub const DEFAULT_CONFIDENCE: u8 = 70;

/// Horizon label to confidence percentage. Fixed values, not measured accuracy.
const CONFIDENCE_TABLE: [(&str, u8); 7] = [
    ("6hours", 92),
    ("hour", 95),
    ("day", 88),
    ("48hours", 82),
    ("week", 75),
    ("month", 65),
    ("15days", 68),
];

/// Confidence percentage (0..=100) for a prediction period label.
pub fn confidence_for_period(period: &str) -> u8 {
    // ---
    CONFIDENCE_TABLE
        .iter()
        .find(|(label, _)| *label == period)
        .map_or(DEFAULT_CONFIDENCE, |(_, score)| *score)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_known_periods() {
        // ---
        assert_eq!(confidence_for_period("6hours"), 92);
        assert_eq!(confidence_for_period("hour"), 95);
        assert_eq!(confidence_for_period("day"), 88);
        assert_eq!(confidence_for_period("48hours"), 82);
        assert_eq!(confidence_for_period("week"), 75);
        assert_eq!(confidence_for_period("month"), 65);
        assert_eq!(confidence_for_period("15days"), 68);
    }

    #[test]
    fn test_unknown_period_uses_default() {
        // ---
        assert_eq!(confidence_for_period("fortnight"), DEFAULT_CONFIDENCE);
        assert_eq!(confidence_for_period(""), DEFAULT_CONFIDENCE);
        // Labels are matched exactly.
        assert_eq!(confidence_for_period("Week"), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_pure() {
        // ---
        assert_eq!(confidence_for_period("week"), confidence_for_period("week"));
    }
}
