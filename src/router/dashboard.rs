use std::sync::Arc;

use tracing::{info, warn};

use super::readiness::{wait_for_library, LibraryProbe, RetryPolicy};
use super::{
    render_view, transition, DashboardDocument, HomeSnapshot, RouterEvent, TeamRegistry,
    TeamStatus, ViewState,
};
use crate::bootstrap::{BootstrapReport, Bootstrapper};
use crate::mount::GridHost;
use crate::pages::{self, DEFAULT_MOUNT_ID};

/// The dashboard page for its whole lifetime: current view, content region,
/// and the host team grids are mounted into.
pub struct Dashboard<H: GridHost> {
    state: ViewState,
    home: HomeSnapshot,
    document: DashboardDocument,
    content: String,
    host: H,
    bootstrapper: Bootstrapper,
    probe: Arc<dyn LibraryProbe>,
    policy: RetryPolicy,
    teams: TeamRegistry,
    last_report: Option<BootstrapReport>,
}

impl<H: GridHost> Dashboard<H> {
    /// Rewrites internal links across the shipped document and keeps its
    /// content region as the home view. A bare fragment is the content region.
    pub fn start(
        document_markup: &str,
        host: H,
        bootstrapper: Bootstrapper,
        probe: Arc<dyn LibraryProbe>,
        policy: RetryPolicy,
    ) -> Self {
        let document = DashboardDocument::parse(document_markup);
        let content = document.content().to_string();
        let home = HomeSnapshot::capture(content.as_str());
        Self {
            state: ViewState::Home,
            home,
            document,
            content,
            host,
            bootstrapper,
            probe,
            policy,
            teams: TeamRegistry::from_catalog(),
            last_report: None,
        }
    }

    pub fn with_teams(mut self, teams: TeamRegistry) -> Self {
        self.teams = teams;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The whole document with the current content region in place.
    pub fn document(&self) -> String {
        self.document.render(&self.content)
    }

    pub fn home(&self) -> &HomeSnapshot {
        &self.home
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Report of the most recent team bootstrap, if any ran.
    pub fn last_report(&self) -> Option<&BootstrapReport> {
        self.last_report.as_ref()
    }

    /// Handles a hash change: swaps the content region and, for an
    /// implemented team, waits for the grid library and mounts the team page.
    pub async fn navigate(&mut self, hash: &str) -> &ViewState {
        self.apply(RouterEvent::HashChanged(hash.to_string()));
        info!(hash, view = %self.state, "route changed");

        let code = match &self.state {
            ViewState::TeamDetail {
                code,
                status: TeamStatus::AwaitingLibrary,
            } => code.clone(),
            _ => return &self.state,
        };

        match wait_for_library(self.probe.as_ref(), &self.policy).await {
            Ok(_) => {
                self.apply(RouterEvent::LibraryReady { code: code.clone() });
                let loaded = self.load_team(&code).await;
                let event = if loaded {
                    RouterEvent::TeamLoaded { code }
                } else {
                    RouterEvent::TeamLoadFailed { code }
                };
                self.apply(event);
            }
            Err(e) => {
                warn!(team = %code, error = %e, "team page not loaded");
                self.apply(RouterEvent::LibraryTimedOut { code });
            }
        }
        &self.state
    }

    async fn load_team(&mut self, code: &str) -> bool {
        let Some(page) = pages::team_page(code) else {
            warn!(team = %code, "no page registered for team");
            return false;
        };
        let report = self.bootstrapper.bootstrap(&page, &mut self.host).await;
        let loaded = report.is_complete();
        self.last_report = Some(report);
        loaded
    }

    fn apply(&mut self, event: RouterEvent) {
        let next = transition(&self.state, &event, &self.teams);
        if let RouterEvent::HashChanged(_) = event {
            // Replacing the content region discards the old mount element.
            self.host.remove_mount(DEFAULT_MOUNT_ID);
            if matches!(
                next,
                ViewState::TeamDetail {
                    status: TeamStatus::AwaitingLibrary,
                    ..
                }
            ) {
                self.host.create_mount(DEFAULT_MOUNT_ID);
            }
        } else if next == self.state {
            return;
        }
        self.content = render_view(&next, &self.home);
        self.state = next;
    }
}
