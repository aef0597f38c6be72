//! Hash-fragment router for the dashboard entry point.
//!
//! Routing is split into a pure part ([`Route::from_hash`] and
//! [`transition`]) and the side-effecting [`Dashboard`] that renders the
//! content region and bootstraps team pages.

pub mod dashboard;
pub mod document;
pub mod links;
pub mod readiness;
pub mod render;

use std::fmt;
use std::sync::Arc;

pub use dashboard::Dashboard;
pub use document::{DashboardDocument, CONTENT_REGION_ID};
pub use links::rewrite_internal_links;
pub use readiness::{wait_for_library, AlwaysLoaded, LibraryProbe, ReadinessError, RetryPolicy};
pub use render::render_view;

/// Where a hash fragment points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    TeamDetail(String),
    Reports,
    Finders,
    NotFound(String),
}

impl Route {
    pub fn from_hash(hash: &str) -> Route {
        let path = hash.trim().trim_start_matches('#');
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        match segments.as_slice() {
            [] => Route::Home,
            [home] if home.eq_ignore_ascii_case("home") => Route::Home,
            [league, team, code]
                if league.eq_ignore_ascii_case("nhl") && team.eq_ignore_ascii_case("team") =>
            {
                Route::TeamDetail(code.to_string())
            }
            [reports] if reports.eq_ignore_ascii_case("reports") => Route::Reports,
            [finders] if finders.eq_ignore_ascii_case("finders") => Route::Finders,
            _ => {
                let normalized = if path.starts_with('/') {
                    path.to_string()
                } else {
                    format!("/{path}")
                };
                Route::NotFound(normalized)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeamStatus {
    /// Waiting for the grid library before bootstrapping.
    AwaitingLibrary,
    Loading,
    Loaded,
    LoadFailed,
    NotImplemented,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    Home,
    TeamDetail { code: String, status: TeamStatus },
    Reports,
    Finders,
    NotFound { path: String },
}

impl ViewState {
    pub fn team_code(&self) -> Option<&str> {
        match self {
            ViewState::TeamDetail { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::Home => f.write_str("home"),
            ViewState::TeamDetail { code, status } => write!(f, "team-detail({code}, {status:?})"),
            ViewState::Reports => f.write_str("reports"),
            ViewState::Finders => f.write_str("finders"),
            ViewState::NotFound { path } => write!(f, "not-found({path})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterEvent {
    HashChanged(String),
    LibraryReady { code: String },
    LibraryTimedOut { code: String },
    TeamLoaded { code: String },
    TeamLoadFailed { code: String },
}

/// Team codes whose detail page exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamRegistry {
    codes: Vec<String>,
}

impl TeamRegistry {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_catalog() -> Self {
        Self::new(crate::pages::implemented_teams())
    }

    pub fn is_implemented(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }
}

/// Next view for `event`. Team events only apply to the team view they
/// were raised for and only from the status they follow.
pub fn transition(current: &ViewState, event: &RouterEvent, teams: &TeamRegistry) -> ViewState {
    match event {
        RouterEvent::HashChanged(hash) => match Route::from_hash(hash) {
            Route::Home => ViewState::Home,
            Route::TeamDetail(code) => {
                let status = if teams.is_implemented(&code) {
                    TeamStatus::AwaitingLibrary
                } else {
                    TeamStatus::NotImplemented
                };
                ViewState::TeamDetail { code, status }
            }
            Route::Reports => ViewState::Reports,
            Route::Finders => ViewState::Finders,
            Route::NotFound(path) => ViewState::NotFound { path },
        },
        RouterEvent::LibraryReady { code } => {
            advance(current, code, TeamStatus::AwaitingLibrary, TeamStatus::Loading)
        }
        RouterEvent::LibraryTimedOut { code } => {
            advance(current, code, TeamStatus::AwaitingLibrary, TeamStatus::LoadFailed)
        }
        RouterEvent::TeamLoaded { code } => {
            advance(current, code, TeamStatus::Loading, TeamStatus::Loaded)
        }
        RouterEvent::TeamLoadFailed { code } => {
            advance(current, code, TeamStatus::Loading, TeamStatus::LoadFailed)
        }
    }
}

fn advance(current: &ViewState, event_code: &str, from: TeamStatus, to: TeamStatus) -> ViewState {
    match current {
        ViewState::TeamDetail { code, status } if code == event_code && *status == from => {
            ViewState::TeamDetail {
                code: code.clone(),
                status: to,
            }
        }
        other => other.clone(),
    }
}

/// Content-region markup as shipped, kept for restoring the home view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeSnapshot(Arc<str>);

impl HomeSnapshot {
    pub fn capture(markup: impl Into<Arc<str>>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
