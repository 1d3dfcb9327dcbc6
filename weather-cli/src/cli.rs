use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::{
    Action, Config, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Status,
    TemperatureUnit, WeatherController, provider_from_config,
};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup: current conditions and a 3-day forecast")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key in the config file.
    Configure,

    /// Search cities interactively (the default).
    Interactive,

    /// Look up one city and exit.
    Show {
        /// City name.
        city: String,

        /// Temperature unit: c or f.
        #[arg(long, short, default_value = "c")]
        unit: String,
    },
}

/// Input typed at the interactive prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Search(String),
    Unit(TemperatureUnit),
    ToggleUnit,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            ":q" | ":quit" => Input::Quit,
            ":c" => Input::Unit(TemperatureUnit::Celsius),
            ":f" => Input::Unit(TemperatureUnit::Fahrenheit),
            ":u" => Input::ToggleUnit,
            _ => Input::Search(line.to_string()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Interactive => interactive().await,
            Command::Show { city, unit } => show(&city, &unit).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let store = FilePreferenceStore::default_location()?;
    tracing::debug!(path = %store.path().display(), "Using preference file");
    let preferences: Arc<dyn PreferenceStore> = Arc::new(store);

    let mut controller = WeatherController::new(Arc::from(provider), preferences);
    controller.startup();
    print_state(&controller);

    loop {
        let initial = controller.state().search_text.clone();
        let mut prompt = tokio::task::spawn_blocking(move || {
            Text::new("City (:c/:f/:u unit, :q quit):").with_initial_value(&initial).prompt()
        });

        // The prompt blocks its own thread; fetch results keep landing meanwhile.
        let line = loop {
            tokio::select! {
                line = &mut prompt => break line.context("Prompt task failed")?,
                Some(changed) = controller.next_result(), if controller.pending() > 0 => {
                    if changed {
                        print_state(&controller);
                    }
                }
            }
        };

        let line = match line {
            Ok(line) => line,
            Err(
                inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted,
            ) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let changed = match Input::parse(&line) {
            Input::Quit => break,
            Input::Unit(unit) => controller.dispatch(Action::UnitSelect(unit)),
            Input::ToggleUnit => controller.dispatch(Action::UnitToggle),
            Input::Search(text) => controller.search(text),
        };

        if changed {
            print_state(&controller);
        }
    }

    Ok(())
}

async fn show(city: &str, unit: &str) -> anyhow::Result<()> {
    let unit = TemperatureUnit::try_from(unit)?;
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let mut controller =
        WeatherController::new(Arc::from(provider), Arc::new(MemoryPreferenceStore::new()));
    controller.dispatch(Action::UnitSelect(unit));
    controller.search(city);
    controller.settle().await;

    let state = controller.state();
    match state.status {
        Status::Success => {
            print_state(&controller);
            Ok(())
        }
        Status::Failed => bail!("{}", state.error().unwrap_or_default()),
        Status::Idle | Status::Loading => bail!("City name must not be empty"),
    }
}

fn print_state(controller: &WeatherController) {
    println!();
    for line in render(controller.state()) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_commands() {
        assert_eq!(Input::parse(":q"), Input::Quit);
        assert_eq!(Input::parse(" :f "), Input::Unit(TemperatureUnit::Fahrenheit));
        assert_eq!(Input::parse(":c"), Input::Unit(TemperatureUnit::Celsius));
        assert_eq!(Input::parse(":u"), Input::ToggleUnit);
        assert_eq!(Input::parse("  Paris "), Input::Search("  Paris ".into()));
    }

    #[test]
    fn defaults_to_interactive() {
        let cli = Cli::try_parse_from(["weather"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn show_takes_city_and_unit() {
        let cli = Cli::try_parse_from(["weather", "-v", "show", "New York", "--unit", "f"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Command::Show { city, unit }) => {
                assert_eq!(city, "New York");
                assert_eq!(unit, "f");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
