use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::aggregate::{self, Aggregate, DataStatus, SourceReport};
use crate::loader::Fetch;
use crate::mount::{GridHandle, GridHost};
use crate::pages::{GridSpec, PageSpec};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridOutcome {
    Mounted {
        mount_id: String,
        rows: usize,
        handle: GridHandle,
    },
    /// Nothing to show; `status` tells a failed load from an empty dataset.
    NoData { mount_id: String, status: DataStatus },
    MissingMount { mount_id: String },
    Failed { mount_id: String, reason: String },
}

impl GridOutcome {
    pub fn mount_id(&self) -> &str {
        match self {
            GridOutcome::Mounted { mount_id, .. }
            | GridOutcome::NoData { mount_id, .. }
            | GridOutcome::MissingMount { mount_id }
            | GridOutcome::Failed { mount_id, .. } => mount_id,
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self, GridOutcome::Mounted { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapReport {
    pub page_id: String,
    pub grids: Vec<GridOutcome>,
    pub sources: Vec<SourceReport>,
}

impl BootstrapReport {
    pub fn mounted(&self) -> usize {
        self.grids.iter().filter(|g| g.is_mounted()).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.grids.is_empty() && self.grids.iter().all(GridOutcome::is_mounted)
    }
}

/// Turns page specs into mounted grids. Shared by every page; only the
/// `PageSpec` differs.
#[derive(Clone)]
pub struct Bootstrapper {
    fetch: Arc<dyn Fetch>,
}

impl Bootstrapper {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }

    /// Loads every grid's resources concurrently, then mounts the grids one
    /// at a time in page order. Failures are logged and reported per grid,
    /// never returned.
    pub async fn bootstrap<H>(&self, page: &PageSpec, host: &mut H) -> BootstrapReport
    where
        H: GridHost + ?Sized,
    {
        info!(page = %page.id, grids = page.grids.len(), "starting to load data files");

        let aggregates = join_all(
            page.grids
                .iter()
                .map(|grid| aggregate::load_multiple(Arc::clone(&self.fetch), &grid.resources)),
        )
        .await;

        let mut report = BootstrapReport {
            page_id: page.id.clone(),
            grids: Vec::with_capacity(page.grids.len()),
            sources: Vec::new(),
        };
        for (grid, aggregate) in page.grids.iter().zip(aggregates) {
            report.sources.extend(aggregate.sources.iter().cloned());
            let outcome = mount_grid(grid, aggregate, host);
            report.grids.push(outcome);
        }
        report
    }
}

fn mount_grid<H>(grid: &GridSpec, aggregate: Aggregate, host: &mut H) -> GridOutcome
where
    H: GridHost + ?Sized,
{
    let mount_id = grid.mount_id.clone();

    match aggregate.status() {
        DataStatus::Populated => {}
        DataStatus::Empty => {
            warn!(mount = %mount_id, "resources loaded but contained no rows; grid not created");
            return GridOutcome::NoData {
                mount_id,
                status: DataStatus::Empty,
            };
        }
        DataStatus::Failed => {
            error!(
                mount = %mount_id,
                "no data was loaded; check that the JSON files exist and are accessible"
            );
            return GridOutcome::NoData {
                mount_id,
                status: DataStatus::Failed,
            };
        }
    }

    if !host.has_mount(&mount_id) {
        error!(mount = %mount_id, "grid container element not found");
        return GridOutcome::MissingMount { mount_id };
    }

    let config = match grid.build_config(aggregate.into_rows()) {
        Ok(config) => config,
        Err(e) => {
            error!(mount = %mount_id, error = %e, "error in grid initialization");
            return GridOutcome::Failed {
                mount_id,
                reason: e.to_string(),
            };
        }
    };
    let rows = config.row_data.len();

    debug!(mount = %mount_id, rows, "creating grid");
    host.clear_mount(&mount_id);
    let handle = match host.create_grid(&mount_id, config) {
        Ok(handle) => handle,
        Err(e) => {
            error!(mount = %mount_id, error = %e, "error in grid initialization");
            return GridOutcome::Failed {
                mount_id,
                reason: e.to_string(),
            };
        }
    };

    // Cosmetic; a failure here leaves a usable grid.
    if let Err(e) = host
        .size_columns_to_fit(handle)
        .and_then(|_| host.redraw_rows(handle))
    {
        warn!(mount = %mount_id, error = %e, "post-mount sizing pass failed");
    }

    info!(mount = %mount_id, rows, "grid created successfully");
    GridOutcome::Mounted {
        mount_id,
        rows,
        handle,
    }
}
