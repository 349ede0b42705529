//! Blocking Tempo client.
//!
//! Requests run on a private tokio runtime so callers stay synchronous.

use std::time::Duration as StdDuration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::models::{CreatedWorklog, ErrorBody, WorklogPage, WorklogPayload};
use crate::error::{Error, Result};
use crate::model::{DateRange, Entry, WorklogId};
use crate::sync::{PortError, PortResult, RemoteWorklogPort};

/// Tempo Cloud REST API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.tempo.io/core/3";

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Connection settings for [`TempoClient`].
#[derive(Debug, Clone)]
pub struct TempoConfig {
    pub base_url: String,
    /// Atlassian account id; worklogs are fetched and created for this user.
    pub user_id: String,
    pub api_key: String,
}

/// [`RemoteWorklogPort`] backed by the Tempo HTTP API.
pub struct TempoClient {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    config: TempoConfig,
}

impl TempoClient {
    /// Build a client and its runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or the HTTP client cannot be created.
    pub fn new(mut config: TempoConfig) -> Result<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let runtime = tokio::runtime::Runtime::new()?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("tempovi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            runtime,
            client,
            config,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "Tempo request");
        self.client
            .request(method, url)
            .bearer_auth(&self.config.api_key)
    }

    fn worklog_url(&self, id: &WorklogId) -> String {
        format!("{}/worklogs/{id}", self.config.base_url)
    }

    /// Send and map non-success statuses to port errors.
    fn send(&self, request: RequestBuilder, id: Option<&WorklogId>) -> PortResult<Response> {
        self.runtime.block_on(async {
            let response = request
                .send()
                .await
                .map_err(|e| PortError::Transport(format!("request failed: {e}")))?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }
            let body = response.text().await.unwrap_or_default();
            Err(map_status(status, &body, id))
        })
    }

    fn json<T: serde::de::DeserializeOwned>(&self, response: Response) -> PortResult<T> {
        self.runtime.block_on(async {
            response
                .json::<T>()
                .await
                .map_err(|e| PortError::Transport(format!("invalid response body: {e}")))
        })
    }
}

fn map_status(status: StatusCode, body: &str, id: Option<&WorklogId>) -> PortError {
    let detail = ErrorBody::describe(body);
    match status {
        StatusCode::NOT_FOUND => PortError::NotFound {
            id: id.map_or_else(|| detail.clone(), ToString::to_string),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            PortError::RemoteValidation(detail)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PortError::Transport(format!("authentication failed ({status}): {detail}"))
        }
        _ => PortError::Transport(format!("unexpected status {status}: {detail}")),
    }
}

impl RemoteWorklogPort for TempoClient {
    fn fetch(&mut self, range: &DateRange) -> PortResult<Vec<Entry>> {
        let first = format!(
            "{}/worklogs/user/{}",
            self.config.base_url, self.config.user_id
        );
        let mut request = self.request(Method::GET, &first).query(&[
            ("from", range.start().to_string()),
            ("to", range.end().to_string()),
        ]);

        let mut entries = Vec::new();
        loop {
            let page: WorklogPage = self.json(self.send(request, None)?)?;
            debug!(count = page.results.len(), "Fetched worklog page");
            for worklog in page.results {
                entries.push(worklog.into_entry()?);
            }
            match page.metadata.next {
                Some(next) => request = self.request(Method::GET, &next),
                None => break,
            }
        }
        Ok(entries)
    }

    fn create(&mut self, entry: &Entry) -> PortResult<WorklogId> {
        let url = format!("{}/worklogs", self.config.base_url);
        let payload = WorklogPayload::new(&self.config.user_id, entry);
        let response = self.send(self.request(Method::POST, &url).json(&payload), None)?;
        let created: CreatedWorklog = self.json(response)?;
        Ok(WorklogId::from(created.tempo_worklog_id))
    }

    fn update(&mut self, id: &WorklogId, entry: &Entry) -> PortResult<()> {
        let payload = WorklogPayload::new(&self.config.user_id, entry);
        let request = self.request(Method::PUT, &self.worklog_url(id)).json(&payload);
        self.send(request, Some(id)).map(drop)
    }

    fn delete(&mut self, id: &WorklogId) -> PortResult<()> {
        let request = self.request(Method::DELETE, &self.worklog_url(id));
        self.send(request, Some(id)).map(drop)
    }
}
