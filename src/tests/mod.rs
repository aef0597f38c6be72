use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use indicatif::ProgressBar;
use serde_json::json;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::aggregate::{load_multiple, DataStatus, SourceStatus};
use crate::bootstrap::{Bootstrapper, GridOutcome};
use crate::loader::{self, Fetch, FetchedBody, LoadError, LoadOutcome, ResourceRef, RowRecord};
use crate::mount::{GridHost, StaticDocument};
use crate::output::OutputFormat;
use crate::pages::{self, DEFAULT_MOUNT_ID};
use crate::router::{
    AlwaysLoaded, Dashboard, LibraryProbe, RetryPolicy, TeamStatus, ViewState,
};
use crate::runner::{Options, Runner};

enum Reply {
    Json(String),
    Status(u16),
    Transport,
    Panic,
}

/// In-memory site: each resource answers with a fixed reply after a delay.
/// Unknown resources answer 404.
#[derive(Default)]
struct MemoryFetcher {
    replies: HashMap<String, (Reply, Duration)>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn json(mut self, resource: &str, body: serde_json::Value) -> Self {
        self.replies
            .insert(resource.to_string(), (Reply::Json(body.to_string()), Duration::ZERO));
        self
    }

    fn raw(mut self, resource: &str, body: &str) -> Self {
        self.replies
            .insert(resource.to_string(), (Reply::Json(body.to_string()), Duration::ZERO));
        self
    }

    fn delayed(mut self, resource: &str, body: serde_json::Value, delay: Duration) -> Self {
        self.replies
            .insert(resource.to_string(), (Reply::Json(body.to_string()), delay));
        self
    }

    fn reply(mut self, resource: &str, reply: Reply) -> Self {
        self.replies
            .insert(resource.to_string(), (reply, Duration::ZERO));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for MemoryFetcher {
    fn fetch<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<FetchedBody, LoadError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some((reply, delay)) = self.replies.get(resource.as_str()) else {
                return Ok(FetchedBody::status(404));
            };
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            match reply {
                Reply::Json(body) => Ok(FetchedBody::ok(body.clone().into_bytes())),
                Reply::Status(code) => Ok(FetchedBody::status(*code)),
                Reply::Transport => Err(LoadError::Transport {
                    resource: resource.clone(),
                    message: "connection refused".to_string(),
                }),
                Reply::Panic => panic!("fetcher blew up"),
            }
        })
    }
}

/// Counts events per level.
#[derive(Clone, Default)]
struct EventCounts(Arc<Mutex<Vec<(Level, String)>>>);

impl EventCounts {
    fn count(&self, level: Level) -> usize {
        self.0.lock().unwrap().iter().filter(|(l, _)| *l == level).count()
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

struct CaptureLayer(EventCounts);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0
             .0
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

/// Runs `fut` on a current-thread runtime with a capturing subscriber, so
/// spawned loader tasks log into the same capture.
fn run_captured<F: Future>(fut: F) -> (F::Output, EventCounts) {
    let counts = EventCounts::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(counts.clone()));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let out = tracing::subscriber::with_default(subscriber, || rt.block_on(fut));
    (out, counts)
}

fn refs(list: &[&str]) -> Vec<ResourceRef> {
    list.iter().map(|r| ResourceRef::new(*r)).collect()
}

fn row(value: serde_json::Value) -> RowRecord {
    value.as_object().cloned().unwrap()
}

fn tor_rows(season: i64) -> serde_json::Value {
    json!([
        {"Season": season, "Game": 1, "Opponent": "MTL", "Result": "W", "GF": 4, "GA": 2},
        {"Season": season, "Game": 2, "Opponent": "BOS", "Result": "L", "GF": 1, "GA": "NULL"}
    ])
}

fn tor_site() -> MemoryFetcher {
    let page = pages::team_page("TOR").unwrap();
    let mut fetcher = MemoryFetcher::new();
    for (i, resource) in page.resources().enumerate() {
        fetcher = fetcher.json(resource.as_str(), tor_rows(2024 - i as i64));
    }
    fetcher
}

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts: attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        multiplier: 2,
    }
}

const DASHBOARD: &str = concat!(
    "<section>\n",
    "  <h1>Dashboard</h1>\n",
    "  <a href=\"/NHL/team/TOR\">Leafs</a>\n",
    "  <a href=\"https://www.nhl.com/\">NHL</a>\n",
    "</section>\n"
);

fn dashboard(
    fetch: Arc<MemoryFetcher>,
    probe: Arc<dyn LibraryProbe>,
    policy: RetryPolicy,
) -> Dashboard<StaticDocument> {
    Dashboard::start(
        DASHBOARD,
        StaticDocument::new(),
        Bootstrapper::new(fetch),
        probe,
        policy,
    )
}

#[test]
fn loader_returns_rows_identical_to_file() {
    let body = json!([{"Player": "Marner", "G": 26, "+/-": -3, "Note": "NULL"}]);
    let fetch = MemoryFetcher::new().json("/data/p.json", body.clone());
    let (outcome, events) = run_captured(async {
        loader::load_json(&fetch, &ResourceRef::new("/data/p.json")).await
    });
    match outcome {
        LoadOutcome::Rows(rows) => assert_eq!(rows, vec![row(body[0].clone())]),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(events.count(Level::ERROR), 0);
}

#[test]
fn loader_reports_each_failure_kind_once() {
    let fetch = MemoryFetcher::new()
        .raw("/data/bad.json", "[{\"a\": 1},")
        .reply("/data/down.json", Reply::Status(500))
        .reply("/data/refused.json", Reply::Transport);
    let (outcomes, events) = run_captured(async {
        let mut out = Vec::new();
        for r in ["/data/bad.json", "/data/down.json", "/data/refused.json", "/data/missing.json"] {
            out.push(loader::load_json(&fetch, &ResourceRef::new(r)).await);
        }
        out
    });
    assert!(outcomes.iter().all(LoadOutcome::is_failure));
    assert!(matches!(
        &outcomes[0],
        LoadOutcome::Failed(LoadError::Parse { .. })
    ));
    assert!(matches!(
        &outcomes[1],
        LoadOutcome::Failed(LoadError::HttpStatus { status: 500, .. })
    ));
    assert!(matches!(
        &outcomes[2],
        LoadOutcome::Failed(LoadError::Transport { .. })
    ));
    assert!(matches!(
        &outcomes[3],
        LoadOutcome::Failed(LoadError::HttpStatus { status: 404, .. })
    ));
    assert_eq!(events.count(Level::ERROR), 4);
}

#[test]
fn load_rows_collapses_failures_to_empty() {
    let fetch = MemoryFetcher::new().json("/data/a.json", json!([{"x": 1}]));
    let (rows, _) = run_captured(async {
        let present = loader::load_json(&fetch, &ResourceRef::new("/data/a.json")).await;
        let missing = loader::load_rows(&fetch, &ResourceRef::new("/data/missing.json")).await;
        (present.row_count(), missing)
    });
    assert_eq!(rows.0, 1);
    assert!(rows.1.is_empty());
}

#[test]
fn one_missing_source_keeps_the_others() {
    let fetch = Arc::new(MemoryFetcher::new().json("/data/A.json", json!([{"x": 1}, {"x": 2}])));
    let (agg, events) = run_captured(load_multiple(
        fetch,
        &refs(&["/data/A.json", "/data/B.json"]),
    ));
    assert_eq!(agg.rows, vec![row(json!({"x": 1})), row(json!({"x": 2}))]);
    assert_eq!(agg.status(), DataStatus::Populated);
    assert_eq!(agg.sources[0].status, SourceStatus::Loaded(2));
    assert!(matches!(agg.sources[1].status, SourceStatus::Failed(_)));
    assert_eq!(events.count(Level::ERROR), 1);
    assert_eq!(events.count(Level::WARN), 0);
}

#[test]
fn rows_follow_input_order_not_completion_order() {
    let fetch = Arc::new(
        MemoryFetcher::new()
            .delayed("/data/slow.json", json!([{"n": "first"}]), Duration::from_millis(40))
            .json("/data/fast.json", json!([{"n": "second"}, {"n": "third"}])),
    );
    let (agg, _) = run_captured(load_multiple(
        fetch,
        &refs(&["/data/slow.json", "/data/fast.json"]),
    ));
    let order = agg
        .rows
        .iter()
        .map(|r| r["n"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn all_sources_failing_warns_exactly_once() {
    let fetch = Arc::new(MemoryFetcher::new().reply("/data/x.json", Reply::Status(503)));
    let (agg, events) = run_captured(load_multiple(
        fetch,
        &refs(&["/data/x.json", "/data/y.json"]),
    ));
    assert!(agg.rows.is_empty());
    assert_eq!(agg.status(), DataStatus::Failed);
    assert_eq!(agg.failures().count(), 2);
    assert_eq!(events.count(Level::WARN), 1);
    assert_eq!(events.count(Level::ERROR), 2);
    assert!(events.messages(Level::WARN)[0].contains("no data was loaded"));
}

#[test]
fn empty_arrays_are_empty_not_failed() {
    let fetch = Arc::new(
        MemoryFetcher::new()
            .json("/data/a.json", json!([]))
            .json("/data/b.json", json!([])),
    );
    let (agg, events) = run_captured(load_multiple(fetch, &refs(&["/data/a.json", "/data/b.json"])));
    assert_eq!(agg.status(), DataStatus::Empty);
    assert_eq!(events.count(Level::ERROR), 0);
    assert_eq!(events.count(Level::WARN), 1);
}

#[test]
fn task_failure_trips_the_boundary() {
    let fetch = Arc::new(
        MemoryFetcher::new()
            .json("/data/ok.json", json!([{"x": 1}]))
            .reply("/data/boom.json", Reply::Panic),
    );
    let (agg, events) = run_captured(load_multiple(
        fetch,
        &refs(&["/data/ok.json", "/data/boom.json"]),
    ));
    assert!(agg.boundary_tripped());
    assert!(agg.rows.is_empty());
    assert_eq!(agg.status(), DataStatus::Failed);
    assert_eq!(events.count(Level::ERROR), 1);
    assert_eq!(events.count(Level::WARN), 1);
}

#[test]
fn empty_data_creates_no_grid() {
    let page = pages::team_page("TOR").unwrap();
    let mut fetcher = MemoryFetcher::new();
    for r in page.resources() {
        fetcher = fetcher.json(r.as_str(), json!([]));
    }
    let bootstrapper = Bootstrapper::new(Arc::new(fetcher));
    let mut doc = StaticDocument::with_mounts(page.mount_ids());
    let (report, _) = run_captured(bootstrapper.bootstrap(&page, &mut doc));
    assert_eq!(report.mounted(), 0);
    assert!(matches!(
        report.grids[0],
        GridOutcome::NoData {
            status: DataStatus::Empty,
            ..
        }
    ));
    assert_eq!(doc.grids_created(), 0);
    assert!(doc.grids(DEFAULT_MOUNT_ID).is_empty());
}

#[test]
fn rerunning_bootstrap_leaves_one_grid() {
    let page = pages::team_page("TOR").unwrap();
    let bootstrapper = Bootstrapper::new(Arc::new(tor_site()));
    let mut doc = StaticDocument::with_mounts(page.mount_ids());
    let (reports, _) = run_captured(async {
        let first = bootstrapper.bootstrap(&page, &mut doc).await;
        let second = bootstrapper.bootstrap(&page, &mut doc).await;
        (first, second)
    });
    assert!(reports.0.is_complete());
    assert!(reports.1.is_complete());
    assert_eq!(doc.grids_created(), 2);
    let grids = doc.grids(DEFAULT_MOUNT_ID);
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].config.row_data.len(), 8);
    assert!(grids[0].sized_to_fit);
}

#[test]
fn missing_mount_is_logged_not_created() {
    let page = pages::team_page("TOR").unwrap();
    let bootstrapper = Bootstrapper::new(Arc::new(tor_site()));
    let mut doc = StaticDocument::new();
    let (report, events) = run_captured(bootstrapper.bootstrap(&page, &mut doc));
    assert!(matches!(report.grids[0], GridOutcome::MissingMount { .. }));
    assert_eq!(doc.grids_created(), 0);
    assert_eq!(events.count(Level::ERROR), 1);
}

#[test]
fn team_route_mounts_the_game_log() {
    let fetch = Arc::new(tor_site());
    let mut dash = dashboard(Arc::clone(&fetch), Arc::new(AlwaysLoaded), fast_policy(3));
    let (state, _) = run_captured(async { dash.navigate("#/NHL/team/TOR").await.clone() });
    assert_eq!(
        state,
        ViewState::TeamDetail {
            code: "TOR".to_string(),
            status: TeamStatus::Loaded
        }
    );
    assert!(dash.content().contains("TOR Team Details"));
    assert!(dash.content().contains("id=\"myGrid\""));
    assert_eq!(dash.host().grids(DEFAULT_MOUNT_ID).len(), 1);
    assert_eq!(fetch.calls(), 4);
    assert!(dash.last_report().unwrap().is_complete());
}

#[test]
fn unimplemented_team_shows_placeholder_without_fetching() {
    let fetch = Arc::new(tor_site());
    let mut dash = dashboard(Arc::clone(&fetch), Arc::new(AlwaysLoaded), fast_policy(3));
    let (state, _) = run_captured(async { dash.navigate("#/NHL/team/XXX").await.clone() });
    assert_eq!(
        state,
        ViewState::TeamDetail {
            code: "XXX".to_string(),
            status: TeamStatus::NotImplemented
        }
    );
    assert!(dash.content().contains("not implemented"));
    assert!(!dash.host().has_mount(DEFAULT_MOUNT_ID));
    assert_eq!(fetch.calls(), 0);
}

#[test]
fn home_is_restored_byte_for_byte() {
    let fetch = Arc::new(tor_site());
    let mut dash = dashboard(fetch, Arc::new(AlwaysLoaded), fast_policy(3));
    let original = dash.content().to_string();
    assert!(original.contains("href=\"#/NHL/team/TOR\""));
    assert!(original.contains("href=\"https://www.nhl.com/\""));

    let (_, _) = run_captured(async {
        dash.navigate("#/NHL/team/TOR").await;
        dash.navigate("").await;
    });
    assert_eq!(dash.state(), &ViewState::Home);
    assert_eq!(dash.content(), original);
    assert!(!dash.host().has_mount(DEFAULT_MOUNT_ID));

    let (_, _) = run_captured(async {
        dash.navigate("#/reports").await;
        dash.navigate("#/").await;
    });
    assert_eq!(dash.content(), original);
    assert_eq!(dash.content(), dash.home().as_str());
}

#[test]
fn navigation_links_outside_the_region_are_rewritten() {
    let page = concat!(
        "<body>\n",
        "<nav><a href=\"/\">Home</a> <a href=\"/NHL/team/TOR\">Leafs</a></nav>\n",
        "<main id=\"content\"><p>Welcome</p></main>\n",
        "</body>\n"
    );
    let mut dash = Dashboard::start(
        page,
        StaticDocument::new(),
        Bootstrapper::new(Arc::new(tor_site())),
        Arc::new(AlwaysLoaded),
        fast_policy(3),
    );
    assert_eq!(dash.content(), "<p>Welcome</p>");
    let home = dash.document();
    assert!(home.contains(r##"<nav><a href="#/">Home</a> <a href="#/NHL/team/TOR">Leafs</a></nav>"##));

    let (_, _) = run_captured(async { dash.navigate("#/reports").await.clone() });
    let routed = dash.document();
    assert!(routed.contains(r##"<a href="#/NHL/team/TOR">Leafs</a></nav>"##));
    assert!(routed.contains("<main id=\"content\"><h2>Reports</h2>"));
    assert!(!routed.contains("Welcome"));

    let (_, _) = run_captured(async { dash.navigate("#/").await.clone() });
    assert_eq!(dash.document(), home);
}

#[test]
fn unknown_path_renders_not_found() {
    let fetch = Arc::new(tor_site());
    let mut dash = dashboard(fetch, Arc::new(AlwaysLoaded), fast_policy(3));
    let (state, _) = run_captured(async { dash.navigate("#/unknown/path").await.clone() });
    assert_eq!(
        state,
        ViewState::NotFound {
            path: "/unknown/path".to_string()
        }
    );
    assert!(dash.content().contains("/unknown/path"));
}

#[test]
fn library_timeout_surfaces_as_load_failure() {
    let fetch = Arc::new(tor_site());
    let probe: Arc<dyn LibraryProbe> = Arc::new(|| false);
    let mut dash = dashboard(Arc::clone(&fetch), probe, fast_policy(3));
    let (state, _) = run_captured(async { dash.navigate("#/NHL/team/TOR").await.clone() });
    assert_eq!(
        state,
        ViewState::TeamDetail {
            code: "TOR".to_string(),
            status: TeamStatus::LoadFailed
        }
    );
    assert!(dash.content().contains("could not be loaded"));
    assert_eq!(fetch.calls(), 0);
    assert_eq!(dash.host().grids_created(), 0);
}

#[test]
fn failed_team_data_reports_load_failure() {
    let fetch = Arc::new(MemoryFetcher::new());
    let mut dash = dashboard(fetch, Arc::new(AlwaysLoaded), fast_policy(3));
    let (state, events) = run_captured(async { dash.navigate("/NHL/team/tor").await.clone() });
    assert_eq!(
        state,
        ViewState::TeamDetail {
            code: "tor".to_string(),
            status: TeamStatus::LoadFailed
        }
    );
    assert_eq!(events.count(Level::WARN), 1);
}

#[test]
fn roster_build_drops_summary_rows() {
    let page = pages::find("nhl/team/tor/roster").unwrap();
    let goalies = page.grids[0].resources[0].clone();
    let skaters = page.grids[1].resources[0].clone();
    let fetch = Arc::new(
        MemoryFetcher::new()
            .json(
                goalies.as_str(),
                json!([
                    {"GOALKEEPER": "Woll", "GP": 25},
                    {"GOALKEEPER": "TEAM", "GP": 82},
                    {"GOALKEEPER": "OPPONENTS", "GP": 82}
                ]),
            )
            .json(
                skaters.as_str(),
                json!([
                    {"PLAYER": "Matthews", "GP": 81},
                    {"PLAYER": "Nylander", "GP": 82},
                    {"PLAYER": "TEAM", "GP": 82}
                ]),
            ),
    );
    let options = Options {
        pages: vec!["nhl/team/tor/roster".to_string()],
        format: OutputFormat::Json,
        ..Options::default()
    };
    let runner = Runner::with_fetcher(options, fetch).unwrap();
    let (built, _) = run_captured(async { runner.build(&ProgressBar::hidden()).await });
    assert_eq!(built.len(), 1);
    let doc = &built[0].document;
    let goalies_grid = &doc.grids("goaliesGrid")[0].config;
    assert_eq!(goalies_grid.row_data.len(), 1);
    assert!(goalies_grid.column("GOALKEEPER").is_some());
    assert_eq!(doc.grids("skatersGrid")[0].config.row_data.len(), 2);
    assert_eq!(built[0].file_name, "nhl-team-tor-roster.json");

    let value: serde_json::Value = serde_json::from_slice(&built[0].contents).unwrap();
    assert_eq!(value["grids"].as_array().unwrap().len(), 2);
}

#[test]
fn runner_rejects_unknown_pages() {
    let options = Options {
        pages: vec!["nhl/team/xxx/gamelog".to_string()],
        ..Options::default()
    };
    let err = Runner::with_fetcher(options, Arc::new(MemoryFetcher::new()))
        .err()
        .unwrap();
    assert!(err.to_string().contains("unknown page"));
}

#[test]
fn runner_route_uses_default_dashboard() {
    let runner = Runner::with_fetcher(Options::default(), Arc::new(tor_site())).unwrap();
    let (outcome, _) = run_captured(async {
        let markup = crate::runner::load_dashboard(None).await.unwrap();
        runner.route(&markup, "#/finders").await
    });
    assert_eq!(outcome.state, ViewState::Finders);
    assert!(outcome.content.contains("Finders"));
    assert!(!outcome.content.contains("<nav>"));
    assert!(outcome.document.contains(r##"<a href="#/reports">Reports</a>"##));
    assert!(outcome.document.contains(&outcome.content));
    assert!(outcome.report.is_none());
}
