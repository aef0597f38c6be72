use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

use super::{LoadError, ResourceRef};

/// Raw response for one resource: status code plus the undecoded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedBody {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedBody {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET for a resource reference.
///
/// Implementations report transport problems as `Err`; HTTP-level failures
/// come back as a `FetchedBody` with a non-success status so the loader
/// decides what counts as a failure.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, resource: &'a ResourceRef)
        -> BoxFuture<'a, Result<FetchedBody, LoadError>>;
}

#[derive(Debug, Error)]
pub enum FetcherBuildError {
    #[error("invalid data URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches resources over HTTP, resolving root-relative references
/// against an optional base URL.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Option<reqwest::Url>,
}

impl HttpFetcher {
    pub fn new(base_url: Option<&str>, timeout_seconds: usize) -> Result<Self, FetcherBuildError> {
        let base = match base_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => Some(reqwest::Url::parse(raw).map_err(|e| {
                FetcherBuildError::InvalidBaseUrl {
                    url: raw.to_string(),
                    message: e.to_string(),
                }
            })?),
            None => None,
        };

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|source| FetcherBuildError::HttpClientBuild { source })?;

        Ok(Self { client, base })
    }

    pub fn resolve(&self, resource: &ResourceRef) -> Result<reqwest::Url, LoadError> {
        if let Ok(absolute) = reqwest::Url::parse(resource.as_str()) {
            return Ok(absolute);
        }
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| LoadError::InvalidReference {
                resource: resource.clone(),
                message: "relative reference without a data URL".to_string(),
            })?;
        base.join(resource.as_str())
            .map_err(|e| LoadError::InvalidReference {
                resource: resource.clone(),
                message: e.to_string(),
            })
    }
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<FetchedBody, LoadError>> {
        async move {
            let url = self.resolve(resource)?;
            let transport = |e: reqwest::Error| LoadError::Transport {
                resource: resource.clone(),
                message: e.to_string(),
            };
            let response = self.client.get(url).send().await.map_err(transport)?;
            let status = response.status().as_u16();
            if !response.status().is_success() {
                return Ok(FetchedBody::status(status));
            }
            let body = response.bytes().await.map_err(transport)?;
            Ok(FetchedBody {
                status,
                body: body.to_vec(),
            })
        }
        .boxed()
    }
}

/// Serves references from a directory that mirrors the site root, so
/// `/data/TOR_GameLog_2024_v3.json` reads `<root>/data/TOR_GameLog_2024_v3.json`.
/// A missing file answers 404 like a static web server would.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, resource: &ResourceRef) -> Result<PathBuf, LoadError> {
        let relative = Path::new(resource.as_str().trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(LoadError::InvalidReference {
                resource: resource.clone(),
                message: "reference must stay inside the data directory".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl Fetch for FileFetcher {
    fn fetch<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<FetchedBody, LoadError>> {
        async move {
            let path = self.resolve(resource)?;
            match tokio::fs::read(&path).await {
                Ok(body) => Ok(FetchedBody::ok(body)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchedBody::status(404)),
                Err(source) => Err(LoadError::Io {
                    resource: resource.clone(),
                    source,
                }),
            }
        }
        .boxed()
    }
}
