//! reqwest-backed implementation of [`JobBoardApi`].
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Call | Method | Path |
//! |---|---|---|
//! | search | `GET` | `/jobs?search=..&contractType=..` |
//! | status | `GET` | `/jobs/{id}/application-status` |
//! | bookmark | `POST` | `/jobs/{id}/favorite` |
//! | cancel | `POST` | `/applications/{id}/cancel` |
//! | favorites | `GET` | `/favorites` |
//!
//! Non-2xx answers become [`JobsiftError::Api`] carrying the body's `message`
//! field when there is one.

use super::backend::{
    ApplicationStatusResponse, FavoritesResponse, JobBoardApi, SearchResponse, SuccessResponse,
};
use crate::domain::{JobsiftError, Result};
use crate::filter::EffectiveFilter;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the job board REST service.
#[derive(Debug, Clone)]
pub struct RestJobBoard {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestJobBoard {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`JobsiftError::Config`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JobsiftError::Config(format!("invalid api_base_url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(JobsiftError::Config(format!(
                "api_base_url must be an http(s) URL, got {base_url}"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    /// Builds an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| JobsiftError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and decodes a JSON body, mapping failures to errors.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            tracing::debug!(status = status.as_u16(), message = %message, "api returned error status");
            return Err(JobsiftError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobBoardApi for RestJobBoard {
    async fn search_jobs(&self, filter: &EffectiveFilter) -> Result<SearchResponse> {
        let url = self.endpoint(&["jobs"])?;
        let request = self.client.get(url).query(&filter.to_query_pairs());
        self.send(request).await
    }

    async fn get_application_status(&self, job_id: &str) -> Result<ApplicationStatusResponse> {
        let url = self.endpoint(&["jobs", job_id, "application-status"])?;
        self.send(self.client.get(url)).await
    }

    async fn toggle_bookmark(&self, job_id: &str) -> Result<SuccessResponse> {
        let url = self.endpoint(&["jobs", job_id, "favorite"])?;
        self.send(self.client.post(url)).await
    }

    async fn cancel_application(&self, application_id: &str) -> Result<SuccessResponse> {
        let url = self.endpoint(&["applications", application_id, "cancel"])?;
        self.send(self.client.post(url)).await
    }

    async fn list_bookmarks(&self) -> Result<FavoritesResponse> {
        let url = self.endpoint(&["favorites"])?;
        self.send(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_encode_ids_and_keep_base_path() {
        let api = RestJobBoard::new("https://api.example.com/v1/", None).unwrap();
        let url = api.endpoint(&["jobs", "a/b c", "favorite"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/jobs/a%2Fb%20c/favorite");

        let api = RestJobBoard::new("https://api.example.com/v1", None).unwrap();
        let url = api.endpoint(&["favorites"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/favorites");
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            RestJobBoard::new("mailto:jobs@example.com", None),
            Err(JobsiftError::Config(_))
        ));
        assert!(matches!(RestJobBoard::new("not a url", None), Err(JobsiftError::Config(_))));
    }
}
