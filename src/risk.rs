use ratatui::style::Color;

/// Severity tier of a fire probability. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    VeryLow,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Lower bounds are inclusive: 0.8 is critical, 0.7999 is high.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            RiskTier::Critical
        } else if probability >= 0.6 {
            RiskTier::High
        } else if probability >= 0.4 {
            RiskTier::Moderate
        } else if probability >= 0.2 {
            RiskTier::Low
        } else {
            RiskTier::VeryLow
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Critical => "Critical",
            RiskTier::High => "High",
            RiskTier::Moderate => "Moderate",
            RiskTier::Low => "Low",
            RiskTier::VeryLow => "Very Low",
        }
    }

    pub const fn hex(self) -> &'static str {
        match self {
            RiskTier::Critical => "#b91c1c",
            RiskTier::High => "#ea580c",
            RiskTier::Moderate => "#f59e0b",
            RiskTier::Low => "#65a30d",
            RiskTier::VeryLow => "#15803d",
        }
    }

    pub const fn color(self) -> Color {
        match self {
            RiskTier::Critical => Color::Rgb(0xb9, 0x1c, 0x1c),
            RiskTier::High => Color::Rgb(0xea, 0x58, 0x0c),
            RiskTier::Moderate => Color::Rgb(0xf5, 0x9e, 0x0b),
            RiskTier::Low => Color::Rgb(0x65, 0xa3, 0x0d),
            RiskTier::VeryLow => Color::Rgb(0x15, 0x80, 0x3d),
        }
    }
}

pub fn probability_label(probability: f64) -> &'static str {
    RiskTier::from_probability(probability).label()
}

pub fn probability_color(probability: f64) -> Color {
    RiskTier::from_probability(probability).color()
}

/// `42.1%`
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Marker radius in screen pixels.
pub fn marker_radius(probability: f64) -> f64 {
    7.0 + probability * 8.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_closed_at_each_boundary() {
        assert_eq!(probability_label(1.0), "Critical");
        assert_eq!(probability_label(0.8), "Critical");
        assert_eq!(probability_label(0.7999), "High");
        assert_eq!(probability_label(0.6), "High");
        assert_eq!(probability_label(0.5999), "Moderate");
        assert_eq!(probability_label(0.4), "Moderate");
        assert_eq!(probability_label(0.3999), "Low");
        assert_eq!(probability_label(0.2), "Low");
        assert_eq!(probability_label(0.1999), "Very Low");
        assert_eq!(probability_label(0.0), "Very Low");
    }

    #[test]
    fn colors_follow_the_tier() {
        assert_eq!(probability_color(0.8), Color::Rgb(0xb9, 0x1c, 0x1c));
        assert_eq!(probability_color(0.7999), RiskTier::High.color());
        assert_eq!(RiskTier::from_probability(0.05).hex(), "#15803d");
    }

    #[test]
    fn bucketing_is_monotonic() {
        let mut previous = RiskTier::from_probability(0.0);
        for step in 0..=1000 {
            let tier = RiskTier::from_probability(step as f64 / 1000.0);
            assert!(tier >= previous, "tier dropped at {step}");
            previous = tier;
        }
        assert_eq!(previous, RiskTier::Critical);
    }

    #[test]
    fn formats_and_sizes_markers() {
        assert_eq!(format_probability(0.4213), "42.1%");
        assert_eq!(format_probability(1.0), "100.0%");
        assert_eq!(marker_radius(0.0), 7.0);
        assert_eq!(marker_radius(1.0), 15.0);
    }
}
