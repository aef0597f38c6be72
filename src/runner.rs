use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{self, Aggregate};
use crate::bootstrap::{BootstrapReport, Bootstrapper};
use crate::loader::{Fetch, FetcherBuildError, FileFetcher, HttpFetcher};
use crate::mount::StaticDocument;
use crate::output::{self, OutputFormat};
use crate::pages::{self, PageSpec};
use crate::router::{AlwaysLoaded, Dashboard, LibraryProbe, RetryPolicy, ViewState};

/// Content region served when no dashboard markup is supplied.
pub const DEFAULT_DASHBOARD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Hockey Stats</title>
</head>
<body>
  <nav>
    <a href="/">Home</a>
    <a href="/reports">Reports</a>
    <a href="/finders">Finders</a>
  </nav>
  <main id="content">
    <section class="home">
      <h1>Hockey Stats</h1>
      <ul>
        <li><a href="/NHL/team/TOR">Toronto Maple Leafs</a></li>
      </ul>
    </section>
  </main>
</body>
</html>
"#;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// Resources are fetched over HTTP, resolved against this base URL.
    Url(String),
    /// Resources are read from a directory mirroring the site root.
    Dir(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Options {
    pub data: DataSource,
    pub timeout_seconds: usize,
    /// Page ids to work on; empty selects the whole catalog.
    pub pages: Vec<String>,
    pub format: OutputFormat,
    pub retry: RetryPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data: DataSource::Dir(PathBuf::from(".")),
            timeout_seconds: 10,
            pages: Vec::new(),
            format: OutputFormat::Html,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("unknown page '{id}'")]
    UnknownPage { id: String },

    #[error("invalid timeout {value}, expected positive integer")]
    InvalidTimeout { value: usize },

    #[error(transparent)]
    Fetcher(#[from] FetcherBuildError),

    #[error("failed to create output directory: {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write page: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dashboard file: {path}: {source}")]
    DashboardRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregated data for one grid, without mounting anything.
#[derive(Clone, Debug)]
pub struct GridCheck {
    pub mount_id: String,
    pub aggregate: Aggregate,
}

#[derive(Clone, Debug)]
pub struct PageCheck {
    pub page_id: String,
    pub grids: Vec<GridCheck>,
}

#[derive(Clone, Debug)]
pub struct BuiltPage {
    pub page: PageSpec,
    pub report: BootstrapReport,
    pub document: StaticDocument,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct RouteOutcome {
    pub state: ViewState,
    pub content: String,
    /// Whole dashboard document with `content` in its region.
    pub document: String,
    pub report: Option<BootstrapReport>,
}

/// Library entry point: the selected pages plus the fetcher that feeds them.
#[derive(Clone)]
pub struct Runner {
    options: Options,
    fetch: Arc<dyn Fetch>,
    pages: Vec<PageSpec>,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: options.timeout_seconds,
            });
        }
        let fetch: Arc<dyn Fetch> = match &options.data {
            DataSource::Url(base) => {
                Arc::new(HttpFetcher::new(Some(base.as_str()), options.timeout_seconds)?)
            }
            DataSource::Dir(root) => Arc::new(FileFetcher::new(root.clone())),
        };
        Self::with_fetcher(options, fetch)
    }

    /// Uses `fetch` instead of building one from `options.data`.
    pub fn with_fetcher(options: Options, fetch: Arc<dyn Fetch>) -> Result<Self, RunnerError> {
        let pages = select_pages(&options.pages)?;
        Ok(Self {
            options,
            fetch,
            pages,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    pub fn grid_count(&self) -> usize {
        self.pages.iter().map(|p| p.grids.len()).sum()
    }

    /// Loads every grid's resources and reports what came back.
    pub async fn check(&self, pb: &ProgressBar) -> Vec<PageCheck> {
        let mut out = Vec::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            pb.set_message(page.id.clone());
            let aggregates = join_all(page.grids.iter().map(|grid| {
                let fetch = Arc::clone(&self.fetch);
                async move {
                    let aggregate = aggregate::load_multiple(fetch, &grid.resources).await;
                    pb.inc(1);
                    GridCheck {
                        mount_id: grid.mount_id.clone(),
                        aggregate,
                    }
                }
            }))
            .await;
            out.push(PageCheck {
                page_id: page.id.clone(),
                grids: aggregates,
            });
        }
        out
    }

    /// Bootstraps each page into its own document and renders it.
    pub async fn build(&self, pb: &ProgressBar) -> Vec<BuiltPage> {
        let bootstrapper = Bootstrapper::new(Arc::clone(&self.fetch));
        let mut out = Vec::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            pb.set_message(page.id.clone());
            let mut document = StaticDocument::with_mounts(page.mount_ids());
            let report = bootstrapper.bootstrap(page, &mut document).await;
            pb.inc(page.grids.len() as u64);
            let contents = output::render(self.options.format, page, &document);
            let file_name = output::page_file_name(page, self.options.format);
            debug!(page = %page.id, file = %file_name, bytes = contents.len(), "page rendered");
            out.push(BuiltPage {
                page: page.clone(),
                report,
                document,
                file_name,
                contents,
            });
        }
        out
    }

    /// Runs the hash router over `dashboard_markup` and navigates to `hash`.
    pub async fn route(&self, dashboard_markup: &str, hash: &str) -> RouteOutcome {
        let probe: Arc<dyn LibraryProbe> = Arc::new(AlwaysLoaded);
        let mut dashboard = Dashboard::start(
            dashboard_markup,
            StaticDocument::new(),
            Bootstrapper::new(Arc::clone(&self.fetch)),
            probe,
            self.options.retry,
        );
        let state = dashboard.navigate(hash).await.clone();
        RouteOutcome {
            state,
            content: dashboard.content().to_string(),
            document: dashboard.document(),
            report: dashboard.last_report().cloned(),
        }
    }
}

fn select_pages(ids: &[String]) -> Result<Vec<PageSpec>, RunnerError> {
    if ids.is_empty() {
        return Ok(pages::catalog());
    }
    ids.iter()
        .map(|id| pages::find(id).ok_or_else(|| RunnerError::UnknownPage { id: id.clone() }))
        .collect()
}

pub async fn write_pages(built: &[BuiltPage], out_dir: &Path) -> Result<Vec<PathBuf>, RunnerError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| RunnerError::CreateDir {
            path: out_dir.display().to_string(),
            source: e,
        })?;
    let mut written = Vec::with_capacity(built.len());
    for page in built.iter() {
        let path = out_dir.join(&page.file_name);
        tokio::fs::write(&path, &page.contents)
            .await
            .map_err(|e| RunnerError::Write {
                path: path.display().to_string(),
                source: e,
            })?;
        info!(page = %page.page.id, path = %path.display(), "page written");
        written.push(path);
    }
    Ok(written)
}

/// Dashboard markup from `path`, or the built-in dashboard when `None`.
pub async fn load_dashboard(path: Option<&str>) -> Result<String, RunnerError> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RunnerError::DashboardRead {
                path: path.to_string(),
                source: e,
            }),
        None => Ok(DEFAULT_DASHBOARD.to_string()),
    }
}
