#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

pub mod temperature {
    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
    }
}

pub mod speed {
    const MILES_PER_KM: f64 = 0.621371;

    pub fn kph2mph(kph: f64) -> f64 {
        kph * MILES_PER_KM
    }

    #[test]
    fn test_speed() {
        assert!((kph2mph(100.0) - 62.1371).abs() < 1e-9);
        assert_eq!(kph2mph(0.0), 0.0);
    }
}

pub mod length {
    pub fn mm2in(mm: f64) -> f64 {
        mm / 25.4
    }

    pub fn m2mi(m: f64) -> f64 {
        m / 1609.344
    }
}

pub mod pressure {
    pub fn pa2hpa(pa: f64) -> f64 {
        pa / 100.0
    }

    pub fn pa2inhg(pa: f64) -> f64 {
        pa / 3386.389
    }
}

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    pub fn degree_to_compass<'a>(deg: f64) -> &'a str {
        let deg = (deg % 360.0) + 360.0;
        let val = (deg / 22.5 + 0.5) as usize;
        let idx = val % 16;
        COMPASS[idx]
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
        assert_eq!(degree_to_compass(-45.0), "NW");
    }
}

pub const MISSING: &str = "--";

/// Display strings for the weather card, one per unit system.
impl Units {
    pub fn temperature(self, celsius: Option<f64>) -> String {
        match (self, celsius) {
            (_, None) => MISSING.to_string(),
            (Units::Metric, Some(c)) => format!("{c:.2} C"),
            (Units::Imperial, Some(c)) => format!("{:.2} F", temperature::c2f(c)),
        }
    }

    pub fn speed(self, kph: Option<f64>) -> String {
        match (self, kph) {
            (_, None) => MISSING.to_string(),
            (Units::Metric, Some(kph)) => format!("{kph:.2} kph"),
            (Units::Imperial, Some(kph)) => format!("{:.2} mph", speed::kph2mph(kph)),
        }
    }

    pub fn precipitation(self, mm: Option<f64>) -> String {
        match (self, mm) {
            (_, None) => MISSING.to_string(),
            (Units::Metric, Some(mm)) => format!("{mm:.2} mm"),
            (Units::Imperial, Some(mm)) => format!("{:.2} in", length::mm2in(mm)),
        }
    }

    pub fn pressure(self, pa: Option<f64>) -> String {
        match (self, pa) {
            (_, None) => MISSING.to_string(),
            (Units::Metric, Some(pa)) => format!("{:.1} hPa", pressure::pa2hpa(pa)),
            (Units::Imperial, Some(pa)) => format!("{:.2} inHg", pressure::pa2inhg(pa)),
        }
    }

    pub fn visibility(self, m: Option<f64>) -> String {
        match (self, m) {
            (_, None) => MISSING.to_string(),
            (Units::Metric, Some(m)) => format!("{:.1} km", m / 1000.0),
            (Units::Imperial, Some(m)) => format!("{:.1} mi", length::m2mi(m)),
        }
    }
}

pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}%"))
}

pub fn wind_direction(deg: Option<f64>) -> String {
    deg.map_or_else(
        || MISSING.to_string(),
        |d| format!("{} ({d:.0}°)", direction::degree_to_compass(d)),
    )
}

#[test]
fn test_display_units() {
    assert_eq!(Units::Metric.temperature(Some(21.456)), "21.46 C");
    assert_eq!(Units::Imperial.temperature(Some(100.0)), "212.00 F");
    assert_eq!(Units::Imperial.speed(None), "--");
    assert_eq!(Units::Metric.pressure(Some(101_300.0)), "1013.0 hPa");
    assert_eq!(percent(Some(12.0)), "12.00%");
    assert_eq!(wind_direction(Some(90.0)), "E (90°)");
}
