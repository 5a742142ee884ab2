//! GitHub Dispatch - Repository Dispatch Trigger
//!
//! Sends a single `repository_dispatch` event to a GitHub repository so that its
//! `container-build` workflow runs against a given Penumbra version.
//!
//! The request is made exactly once. There are no retries: a scheduler invoking
//! the binary owns any retry policy.

use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::Serialize;
use std::{fmt, time::Duration};

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Version sent when no override is supplied.
pub const DEFAULT_VERSION: &str = "main";

/// Event type the receiving workflow listens for.
pub const EVENT_TYPE: &str = "container-build";

const GITHUB_JSON: &str = "application/vnd.github+json";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Errors that end a dispatch invocation.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("missing target repository\nusage: github-dispatch <GITHUB_REPO>")]
    MissingRepo,

    #[error("GITHUB_DISPATCH_TOKEN is not set or empty")]
    MissingToken,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("dispatch to {url} was rejected with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("dispatch to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Validated inputs for one dispatch.
#[derive(Clone)]
pub struct DispatchConfig {
    repo: String,
    token: String,
    version: String,
    api_url: String,
    timeout: Option<Duration>,
}

impl DispatchConfig {
    /// Validates the target repository and token.
    ///
    /// The repository is checked before the token, so a caller missing both
    /// sees the usage error.
    pub fn new(repo: Option<String>, token: Option<String>) -> Result<Self, DispatchError> {
        let repo = repo
            .filter(|r| !r.is_empty())
            .ok_or(DispatchError::MissingRepo)?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(DispatchError::MissingToken)?;

        Ok(Self {
            repo,
            token,
            version: DEFAULT_VERSION.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
        })
    }

    /// Overrides the payload version. Absent or empty keeps `main`.
    #[must_use]
    pub fn with_version(mut self, version: Option<String>) -> Self {
        if let Some(version) = version.filter(|v| !v.is_empty()) {
            self.version = version;
        }
        self
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Dispatch endpoint for the target repository.
    pub fn url(&self) -> String {
        format!(
            "{}/repos/{}/dispatches",
            self.api_url.trim_end_matches('/'),
            self.repo
        )
    }

    pub fn payload(&self) -> DispatchPayload<'_> {
        DispatchPayload {
            event_type: EVENT_TYPE,
            client_payload: ClientPayload {
                penumbra_version: &self.version,
            },
        }
    }
}

impl fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchConfig")
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Body of a `repository_dispatch` request.
#[derive(Debug, Serialize)]
pub struct DispatchPayload<'a> {
    event_type: &'static str,
    client_payload: ClientPayload<'a>,
}

#[derive(Debug, Serialize)]
struct ClientPayload<'a> {
    penumbra_version: &'a str,
}

/// Sends the dispatch. Any non-2xx status is an error; the response body is
/// never read.
pub async fn dispatch(config: &DispatchConfig) -> Result<(), DispatchError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(DispatchError::Client)?;

    let url = config.url();
    tracing::debug!(%url, version = %config.version, "sending repository dispatch");

    let response = client
        .post(&url)
        .header(ACCEPT, GITHUB_JSON)
        .bearer_auth(&config.token)
        .json(&config.payload())
        .send()
        .await
        .map_err(|source| DispatchError::Transport {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, %status, "repository dispatch rejected");
        return Err(DispatchError::Status { url, status });
    }

    tracing::info!(%url, %status, repo = %config.repo, "repository dispatch accepted");
    Ok(())
}
