//! Core library for the `weather` lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com client behind the [`WeatherProvider`] seam
//! - Background classification and temperature formatting
//! - Last-city persistence
//! - The view state machine ([`state::reducer`]) and the controller that runs its effects
//!
//! It is used by `weather-cli`, but any other front end can drive the same controller
//! and render [`AppState`] however it likes.

pub mod background;
pub mod config;
pub mod controller;
pub mod model;
pub mod preference;
pub mod provider;
pub mod state;
pub mod units;

pub use background::{BackgroundCategory, classify};
pub use config::Config;
pub use controller::WeatherController;
pub use model::{Condition, ForecastDay, QueryError, SearchQuery, WeatherReport, WeatherSnapshot};
pub use preference::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use provider::{NETWORK_ERROR_MESSAGE, WeatherError, WeatherProvider, provider_from_config};
pub use state::{Action, AppState, Outcome, Status};
pub use units::{TemperatureUnit, format_temperature};
