use serde::{Deserialize, Serialize};

/// Backdrop picked from the current condition text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackgroundCategory {
    #[default]
    Clear,
    Cloudy,
    Rainy,
    Thunder,
    Snowy,
    Foggy,
}

impl BackgroundCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundCategory::Clear => "clear",
            BackgroundCategory::Cloudy => "cloudy",
            BackgroundCategory::Rainy => "rainy",
            BackgroundCategory::Thunder => "thunder",
            BackgroundCategory::Snowy => "snowy",
            BackgroundCategory::Foggy => "foggy",
        }
    }
}

impl std::fmt::Display for BackgroundCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked in order; the first rule with a matching keyword wins.
const RULES: &[(&[&str], BackgroundCategory)] = &[
    (&["cloud"], BackgroundCategory::Cloudy),
    (&["rain"], BackgroundCategory::Rainy),
    (&["thunder"], BackgroundCategory::Thunder),
    (&["snow"], BackgroundCategory::Snowy),
    (&["mist", "fog"], BackgroundCategory::Foggy),
];

/// Case-insensitive keyword match over the condition text, `Clear` if nothing matches.
pub fn classify(condition_text: &str) -> BackgroundCategory {
    let text = condition_text.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_conditions() {
        let cases = [
            ("Partly Cloudy", BackgroundCategory::Cloudy),
            ("Heavy Rain", BackgroundCategory::Rainy),
            ("Thundery outbreaks", BackgroundCategory::Thunder),
            ("Light snow", BackgroundCategory::Snowy),
            ("Fog", BackgroundCategory::Foggy),
            ("Mist", BackgroundCategory::Foggy),
            ("Freezing fog", BackgroundCategory::Foggy),
            ("Sunny", BackgroundCategory::Clear),
            ("", BackgroundCategory::Clear),
        ];

        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "condition {text:?}");
        }
    }

    #[test]
    fn cloud_wins_over_rain() {
        assert_eq!(classify("Cloudy with light rain"), BackgroundCategory::Cloudy);
        assert_eq!(classify("rain then clouds"), BackgroundCategory::Cloudy);
    }

    #[test]
    fn earlier_rules_shadow_later_ones() {
        // "Patchy light rain with thunder": rain is checked before thunder.
        assert_eq!(classify("Patchy light rain with thunder"), BackgroundCategory::Rainy);
        assert_eq!(classify("Light sleet and snow showers"), BackgroundCategory::Snowy);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("HEAVY SNOW"), BackgroundCategory::Snowy);
        assert_eq!(classify("mIsT"), BackgroundCategory::Foggy);
    }
}
