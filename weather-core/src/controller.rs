//! Runs the reducer and carries out the effects it asks for.
//!
//! Fetches are spawned onto the tokio runtime so the caller can keep feeding
//! input (text edits, unit changes) while a request is in flight. Their results
//! are picked up with [`WeatherController::next_result`] or
//! [`WeatherController::settle`] and dispatched back through the reducer.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, trace, warn};

use crate::{
    preference::PreferenceStore,
    provider::{WeatherError, WeatherProvider},
    state::{Action, AppState, Effect, reducer},
};

#[derive(Debug)]
pub struct WeatherController {
    state: AppState,
    provider: Arc<dyn WeatherProvider>,
    preferences: Arc<dyn PreferenceStore>,
    tasks: JoinSet<Action>,
}

impl WeatherController {
    pub fn new(provider: Arc<dyn WeatherProvider>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { state: AppState::new(), provider, preferences, tasks: JoinSet::new() }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Number of fetches whose results have not been dispatched yet.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Restore the stored city and, if there is one, start fetching it.
    ///
    /// A failed read is logged and treated as "nothing stored".
    pub fn startup(&mut self) -> bool {
        let city = self.preferences.load_last_city().unwrap_or_else(|err| {
            warn!(error = %format_args!("{err:#}"), "Could not read last city");
            None
        });
        self.dispatch(Action::LastCityRestored(city))
    }

    /// Reduce `action` and run the resulting effects. Returns whether the view changed.
    ///
    /// Must be called from within a tokio runtime: fetch effects are spawned.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = reducer(&mut self.state, action);
        if result.has_effects() {
            trace!(count = result.effects.len(), "Running effects");
        }
        for effect in result.effects {
            self.handle_effect(effect);
        }
        result.changed
    }

    /// Set the search text and submit it, the way Enter does in the search field.
    pub fn search(&mut self, text: impl Into<String>) -> bool {
        let edited = self.dispatch(Action::SearchTextChange(text.into()));
        self.dispatch(Action::SearchSubmit) || edited
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchWeather { request_id, query } => {
                let provider = Arc::clone(&self.provider);
                self.tasks.spawn(async move {
                    match provider.fetch_weather(&query).await {
                        Ok(report) => Action::WeatherDidLoad { request_id, query, report },
                        Err(error) => Action::WeatherDidError { request_id, error },
                    }
                });
            }
            Effect::SaveLastCity(city) => {
                if let Err(err) = self.preferences.save_last_city(&city) {
                    warn!(city = %city, error = %format_args!("{err:#}"), "Could not save last city");
                }
            }
        }
    }

    /// Wait for the next fetch to finish and dispatch its result.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the view changed.
    pub async fn next_result(&mut self) -> Option<bool> {
        let joined = self.tasks.join_next().await?;

        let mut changed = match joined {
            Ok(action) => self.dispatch(action),
            Err(err) => {
                error!(error = %err, "Weather fetch task did not complete");
                false
            }
        };

        // Everything in flight has reported. Still loading means the latest
        // request's task died without a result.
        if self.tasks.is_empty() && self.state.is_loading() {
            changed |= self.dispatch(Action::WeatherDidError {
                request_id: self.state.latest_request,
                error: WeatherError::Network,
            });
        }

        Some(changed)
    }

    /// Dispatch results until no fetch is in flight.
    pub async fn settle(&mut self) -> bool {
        let mut changed = false;
        while let Some(step) = self.next_result().await {
            changed |= step;
        }
        debug!(status = ?self.state.status, "Controller settled");
        changed
    }
}
