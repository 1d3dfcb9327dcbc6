use serde::{Deserialize, Serialize};

/// Display unit for temperatures. Upstream data is always Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!("Unknown unit '{value}'. Supported units: c, f.")),
        }
    }
}

/// Render a Celsius reading in `unit`.
///
/// Celsius keeps the value as delivered (`18` stays `18`, `18.4` stays `18.4`).
/// Fahrenheit is always fixed to one decimal, with halves rounded away from zero.
pub fn format_temperature(temp_c: f64, unit: TemperatureUnit) -> String {
    match unit {
        // `+ 0.0` folds -0 into 0
        TemperatureUnit::Celsius => format!("{}{}", temp_c + 0.0, unit.symbol()),
        TemperatureUnit::Fahrenheit => {
            let fahrenheit = temp_c * 9.0 / 5.0 + 32.0;
            // Rounds the scaled binary value, not the exact decimal expansion the
            // way `toFixed(1)` does. The two can disagree by 0.1 on halves that
            // are not exact in binary (1.45 here gives 1.5, `toFixed` gives 1.4).
            // Inputs with one decimal, as the service sends them, never land on one.
            let rounded = (fahrenheit * 10.0).round() / 10.0;
            format!("{rounded:.1}{}", unit.symbol())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_is_passed_through() {
        assert_eq!(format_temperature(0.0, TemperatureUnit::Celsius), "0°C");
        assert_eq!(format_temperature(18.0, TemperatureUnit::Celsius), "18°C");
        assert_eq!(format_temperature(18.4, TemperatureUnit::Celsius), "18.4°C");
        assert_eq!(format_temperature(-3.5, TemperatureUnit::Celsius), "-3.5°C");
        assert_eq!(format_temperature(-0.0, TemperatureUnit::Celsius), "0°C");
    }

    #[test]
    fn fahrenheit_has_exactly_one_decimal() {
        assert_eq!(format_temperature(0.0, TemperatureUnit::Fahrenheit), "32.0°F");
        assert_eq!(format_temperature(100.0, TemperatureUnit::Fahrenheit), "212.0°F");
        assert_eq!(format_temperature(-40.0, TemperatureUnit::Fahrenheit), "-40.0°F");
        assert_eq!(format_temperature(18.0, TemperatureUnit::Fahrenheit), "64.4°F");
        assert_eq!(format_temperature(21.3, TemperatureUnit::Fahrenheit), "70.3°F");
    }

    #[test]
    fn one_decimal_celsius_rounds_like_exact_decimal() {
        for k in -600_i64..=600 {
            let celsius = k as f64 / 10.0;
            // Exact Fahrenheit in hundredths. Always even, so never a tie at tenths.
            let hundredths = 18 * k + 3200;
            let tenths = (hundredths as f64 / 10.0).round();
            let expected = format!("{:.1}°F", tenths / 10.0);

            assert_eq!(format_temperature(celsius, TemperatureUnit::Fahrenheit), expected, "{celsius}");
        }
    }

    #[test]
    fn toggle_flips_between_units() {
        assert_eq!(TemperatureUnit::default(), TemperatureUnit::Celsius);
        assert_eq!(TemperatureUnit::Celsius.toggle(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Fahrenheit.toggle(), TemperatureUnit::Celsius);
    }

    #[test]
    fn parses_unit_names() {
        assert_eq!(TemperatureUnit::try_from("F").unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::try_from("celsius").unwrap(), TemperatureUnit::Celsius);
        let err = TemperatureUnit::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }
}
