//! Feed backend REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    BulkAddOutcome, DownloadTarget, FeedId, FeedSnapshot, RefreshOutcome,
};
use crate::domain::ports::FeedBackend;
use crate::error::{BackendError, UNKNOWN_ERROR};

/// reqwest implementation of the feed backend
#[derive(Clone)]
pub struct HttpFeedBackend {
    http: Client,
    base_url: String,
}

impl HttpFeedBackend {
    /// Client whose every request gives up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| BackendError::Deserialization(e.to_string()))
        } else {
            Err(api_error(status.as_u16(), response).await)
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), BackendError> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status.as_u16(), response).await)
        }
    }
}

/// Error body: `{ "error": ... }`, or the bulk form with only `errors`
#[derive(Deserialize, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub(crate) fn message(self) -> String {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return error;
        }
        match self.errors {
            Some(errors) if !errors.is_empty() => errors.join(", "),
            _ => UNKNOWN_ERROR.to_string(),
        }
    }
}

/// Turn a non-2xx response into `BackendError::Api` with the body's message
pub(crate) async fn api_error(status: u16, response: reqwest::Response) -> BackendError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .unwrap_or_default()
        .message();
    BackendError::api(status, message)
}

#[derive(Serialize)]
struct BulkAddRequest<'a> {
    urls: &'a [String],
}

#[async_trait]
impl FeedBackend for HttpFeedBackend {
    async fn list_feeds(&self) -> Result<FeedSnapshot, BackendError> {
        let resp = self.http.get(self.api_url("/api/feeds")).send().await?;
        self.handle_response(resp).await
    }

    async fn refresh_all(&self) -> Result<(), BackendError> {
        let resp = self
            .http
            .post(self.api_url("/api/feeds/refresh"))
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    async fn refresh_feed(&self, id: FeedId) -> Result<RefreshOutcome, BackendError> {
        let resp = self
            .http
            .post(self.api_url(&format!("/api/feeds/{}/refresh", id)))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn delete_feed(&self, id: FeedId) -> Result<(), BackendError> {
        let resp = self
            .http
            .delete(self.api_url(&format!("/api/feeds/{}", id)))
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    async fn add_feeds(&self, urls: &[String]) -> Result<BulkAddOutcome, BackendError> {
        let resp = self
            .http
            .post(self.api_url("/api/feeds/bulk"))
            .json(&BulkAddRequest { urls })
            .send()
            .await?;
        self.handle_response(resp).await
    }

    fn download_url(&self, target: &DownloadTarget) -> String {
        self.api_url(&target.path())
    }
}
