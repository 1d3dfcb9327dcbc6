//! Text rendering of [`AppState`]. Pure: same state in, same lines out.

use weather_core::{AppState, Condition, Status, TemperatureUnit};

pub fn render(state: &AppState) -> Vec<String> {
    let mut lines = vec![format!("Weather Dashboard  [{}]", unit_toggle(state.unit))];

    if state.is_loading() {
        lines.push(format!("Loading weather for {}...", state.search_text.trim()));
    }

    if let Some(error) = state.error() {
        lines.push(format!("Error: {error}"));
    }

    // Stale data stays hidden while a fetch is running.
    if state.is_loading() {
        return lines;
    }

    if let Some(snapshot) = state.snapshot() {
        lines.push(String::new());
        lines.push(snapshot.display_location());
        lines.push(format!(
            "  {}  {}",
            state.format_temperature(snapshot.temperature_c),
            snapshot.condition.text
        ));
        lines.push(format!("  Humidity: {}%", snapshot.humidity_pct));
        if let Some(icon) = icon_url(&snapshot.condition) {
            lines.push(format!("  Icon: {icon}"));
        }
        lines.push(format!("  Backdrop: {}", state.background()));
        if let Some(observed_at) = snapshot.observed_at {
            lines.push(format!("  Updated: {} UTC", observed_at.format("%Y-%m-%d %H:%M")));
        }
    }

    if !state.forecast().is_empty() {
        lines.push(String::new());
        lines.push("Forecast".to_string());
        for day in state.forecast() {
            let mut line = format!(
                "  {}  {:>8}  {}",
                day.date,
                state.format_temperature(day.avg_temperature_c),
                day.condition.text
            );
            if let Some(icon) = icon_url(&day.condition) {
                line.push_str(&format!("  ({icon})"));
            }
            lines.push(line);
        }
    }

    if state.status == Status::Idle {
        lines.push("Search for a city to get started.".to_string());
    }

    lines
}

fn icon_url(condition: &Condition) -> Option<String> {
    (!condition.icon.is_empty()).then(|| condition.icon_url())
}

fn unit_toggle(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "*°C* °F",
        TemperatureUnit::Fahrenheit => "°C *°F*",
    }
}
