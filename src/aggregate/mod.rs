use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::loader::{self, Fetch, LoadOutcome, ResourceRef, RowRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Loaded(usize),
    Empty,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceReport {
    pub resource: ResourceRef,
    pub status: SourceStatus,
}

/// Whether a combined row-set has data, and if not, why not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataStatus {
    Populated,
    /// At least one source loaded successfully but nothing had rows.
    Empty,
    /// No source produced a successful load.
    Failed,
}

/// Combined row-set for an ordered resource list, plus what each source did.
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    pub rows: Vec<RowRecord>,
    pub sources: Vec<SourceReport>,
    boundary_tripped: bool,
}

impl Aggregate {
    pub fn status(&self) -> DataStatus {
        if !self.rows.is_empty() {
            return DataStatus::Populated;
        }
        let any_success = self
            .sources
            .iter()
            .any(|s| !matches!(s.status, SourceStatus::Failed(_)));
        if self.boundary_tripped || !any_success {
            DataStatus::Failed
        } else {
            DataStatus::Empty
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Failed(_)))
    }

    pub fn boundary_tripped(&self) -> bool {
        self.boundary_tripped
    }

    pub fn into_rows(self) -> Vec<RowRecord> {
        self.rows
    }

    fn tripped(resources: &[ResourceRef], reason: String) -> Self {
        Self {
            rows: Vec::new(),
            sources: resources
                .iter()
                .map(|r| SourceReport {
                    resource: r.clone(),
                    status: SourceStatus::Failed(reason.clone()),
                })
                .collect(),
            boundary_tripped: true,
        }
    }
}

/// Loads every resource concurrently and concatenates the rows in input
/// order. A failed source contributes nothing; a failure of the fan-out
/// itself yields an empty aggregate. Never returns an error.
pub async fn load_multiple(fetch: Arc<dyn Fetch>, resources: &[ResourceRef]) -> Aggregate {
    info!(resources = resources.len(), "starting to load multiple JSON resources");

    let handles = resources
        .iter()
        .cloned()
        .map(|resource| {
            let fetch = Arc::clone(&fetch);
            tokio::spawn(async move { loader::load_json(fetch.as_ref(), &resource).await })
        })
        .collect::<Vec<_>>();

    let mut outcomes = Vec::with_capacity(handles.len());
    for joined in join_all(handles).await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!(error = %e, "error while loading multiple JSON resources");
                warn!(resources = resources.len(), "no data was loaded from any resource");
                return Aggregate::tripped(resources, e.to_string());
            }
        }
    }

    let aggregate = combine(resources, outcomes);
    info!(rows = aggregate.rows.len(), "total combined data length");
    if aggregate.rows.is_empty() {
        warn!(resources = resources.len(), "no data was loaded from any resource");
    }
    aggregate
}

fn combine(resources: &[ResourceRef], outcomes: Vec<LoadOutcome>) -> Aggregate {
    let mut aggregate = Aggregate::default();
    for (resource, outcome) in resources.iter().zip(outcomes) {
        let status = match outcome {
            LoadOutcome::Rows(rows) => {
                let n = rows.len();
                aggregate.rows.extend(rows);
                SourceStatus::Loaded(n)
            }
            LoadOutcome::Empty => SourceStatus::Empty,
            LoadOutcome::Failed(e) => SourceStatus::Failed(e.to_string()),
        };
        aggregate.sources.push(SourceReport {
            resource: resource.clone(),
            status,
        });
    }
    aggregate
}
