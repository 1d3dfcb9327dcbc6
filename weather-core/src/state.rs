//! View state and the reducer that drives it.
//!
//! The reducer is a pure `(state, action) -> effects` function: it never does
//! I/O. Fetches and preference writes come back out as [`Effect`]s, and their
//! results re-enter as `WeatherDid*` actions.

use tracing::debug;

use crate::{
    background::BackgroundCategory,
    model::{ForecastDay, SearchQuery, WeatherReport, WeatherSnapshot},
    provider::WeatherError,
    units::{TemperatureUnit, format_temperature},
};

/// Identifies one fetch. Only the most recently issued id may update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// What the last finished fetch left on screen.
///
/// Report and error live in one value so a fetch outcome always replaces both at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    #[default]
    Empty,
    Report(WeatherReport),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Raw contents of the search field.
    pub search_text: String,
    pub unit: TemperatureUnit,
    pub status: Status,
    pub outcome: Outcome,
    /// Last id handed to a fetch effect.
    pub latest_request: RequestId,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.outcome {
            Outcome::Report(report) => Some(report),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.report().map(|r| &r.snapshot)
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        self.report().map(|r| r.forecast.as_slice()).unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Derived from the snapshot's condition text; `Clear` without one.
    pub fn background(&self) -> BackgroundCategory {
        self.report().map(WeatherReport::background).unwrap_or_default()
    }

    /// Temperature string in the currently selected unit.
    pub fn format_temperature(&self, temp_c: f64) -> String {
        format_temperature(temp_c, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user edited the search field. Never fetches.
    SearchTextChange(String),

    /// Search button or Enter. Ignored when the trimmed text is empty.
    SearchSubmit,

    UnitSelect(TemperatureUnit),

    UnitToggle,

    /// Startup read of the stored city; `None` leaves the view idle.
    LastCityRestored(Option<String>),

    WeatherDidLoad { request_id: RequestId, query: SearchQuery, report: WeatherReport },

    WeatherDidError { request_id: RequestId, error: WeatherError },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchWeather { request_id: RequestId, query: SearchQuery },
    SaveLastCity(String),
}

/// Whether the view changed, plus the side effects to run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult<E> {
    pub changed: bool,
    pub effects: Vec<E>,
}

impl<E> DispatchResult<E> {
    pub fn unchanged() -> Self {
        Self { changed: false, effects: Vec::new() }
    }

    pub fn changed() -> Self {
        Self { changed: true, effects: Vec::new() }
    }

    pub fn changed_with(effect: E) -> Self {
        Self { changed: true, effects: vec![effect] }
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::SearchTextChange(text) => {
            if state.search_text == text {
                return DispatchResult::unchanged();
            }
            state.search_text = text;
            DispatchResult::changed()
        }

        Action::SearchSubmit => match SearchQuery::parse(&state.search_text) {
            Ok(query) => begin_fetch(state, query),
            Err(_) => DispatchResult::unchanged(),
        },

        Action::UnitSelect(unit) => {
            if state.unit == unit {
                return DispatchResult::unchanged();
            }
            state.unit = unit;
            DispatchResult::changed()
        }

        Action::UnitToggle => {
            state.unit = state.unit.toggle();
            DispatchResult::changed()
        }

        Action::LastCityRestored(city) => {
            let Some(query) = city.as_deref().and_then(|c| SearchQuery::parse(c).ok()) else {
                return DispatchResult::unchanged();
            };
            state.search_text = query.as_str().to_string();
            begin_fetch(state, query)
        }

        Action::WeatherDidLoad { request_id, query, report } => {
            if request_id != state.latest_request {
                debug!(%request_id, latest = %state.latest_request, "Discarding stale weather result");
                return DispatchResult::unchanged();
            }
            state.status = Status::Success;
            state.outcome = Outcome::Report(report);
            DispatchResult::changed_with(Effect::SaveLastCity(query.into_inner()))
        }

        Action::WeatherDidError { request_id, error } => {
            if request_id != state.latest_request {
                debug!(%request_id, latest = %state.latest_request, "Discarding stale weather error");
                return DispatchResult::unchanged();
            }
            state.status = Status::Failed;
            state.outcome = Outcome::Error(error.user_message());
            DispatchResult::changed()
        }
    }
}

fn begin_fetch(state: &mut AppState, query: SearchQuery) -> DispatchResult<Effect> {
    let request_id = state.latest_request.next();
    state.latest_request = request_id;
    state.status = Status::Loading;
    // Old report stays until the new outcome lands; only the error goes.
    if matches!(state.outcome, Outcome::Error(_)) {
        state.outcome = Outcome::Empty;
    }

    debug!(%request_id, %query, "Fetch started");
    DispatchResult::changed_with(Effect::FetchWeather { request_id, query })
}
