pub mod fetch;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

pub use fetch::{Fetch, FetchedBody, FetcherBuildError, FileFetcher, HttpFetcher};

/// Marker the data pipeline writes for missing values.
pub const NULL_SENTINEL: &str = "NULL";

/// One flat statistical record, field name to scalar value.
pub type RowRecord = serde_json::Map<String, serde_json::Value>;

/// Location of a JSON resource, relative or absolute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error for {resource}: status {status}")]
    HttpStatus { resource: ResourceRef, status: u16 },

    #[error("request for {resource} failed: {message}")]
    Transport {
        resource: ResourceRef,
        message: String,
    },

    #[error("failed to read {resource}: {source}")]
    Io {
        resource: ResourceRef,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {resource}: {source}")]
    Parse {
        resource: ResourceRef,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid resource reference {resource}: {message}")]
    InvalidReference {
        resource: ResourceRef,
        message: String,
    },
}

impl LoadError {
    pub fn resource(&self) -> &ResourceRef {
        match self {
            LoadError::HttpStatus { resource, .. }
            | LoadError::Transport { resource, .. }
            | LoadError::Io { resource, .. }
            | LoadError::Parse { resource, .. }
            | LoadError::InvalidReference { resource, .. } => resource,
        }
    }
}

/// Result of loading one resource. `Empty` is a successful load of a
/// well-formed array with no rows; it is never used for failures.
#[derive(Debug)]
pub enum LoadOutcome {
    Rows(Vec<RowRecord>),
    Empty,
    Failed(LoadError),
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }

    pub fn row_count(&self) -> usize {
        match self {
            LoadOutcome::Rows(rows) => rows.len(),
            _ => 0,
        }
    }

    /// Collapses the outcome to the plain row sequence, empty on failure.
    pub fn into_rows(self) -> Vec<RowRecord> {
        match self {
            LoadOutcome::Rows(rows) => rows,
            LoadOutcome::Empty | LoadOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Loads one resource. Never fails past this boundary: every problem is
/// logged and reported as `LoadOutcome::Failed`.
pub async fn load_json(fetch: &dyn Fetch, resource: &ResourceRef) -> LoadOutcome {
    debug!(resource = %resource, "attempting to load JSON");

    let result = match fetch.fetch(resource).await {
        Ok(body) => parse_rows(resource, body),
        Err(e) => Err(e),
    };

    match result {
        Ok(rows) if rows.is_empty() => {
            info!(resource = %resource, rows = 0, "loaded resource with no rows");
            LoadOutcome::Empty
        }
        Ok(rows) => {
            info!(resource = %resource, rows = rows.len(), "loaded resource");
            LoadOutcome::Rows(rows)
        }
        Err(e) => {
            error!(resource = %resource, error = %e, "failed to load resource");
            LoadOutcome::Failed(e)
        }
    }
}

/// Row-only view of [`load_json`]: an empty sequence stands in for any failure.
pub async fn load_rows(fetch: &dyn Fetch, resource: &ResourceRef) -> Vec<RowRecord> {
    load_json(fetch, resource).await.into_rows()
}

fn parse_rows(resource: &ResourceRef, body: FetchedBody) -> Result<Vec<RowRecord>, LoadError> {
    if !body.is_success() {
        return Err(LoadError::HttpStatus {
            resource: resource.clone(),
            status: body.status,
        });
    }
    serde_json::from_slice::<Vec<RowRecord>>(&body.body).map_err(|source| LoadError::Parse {
        resource: resource.clone(),
        source,
    })
}
