use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{CategoriesPayload, Category, CourseSearchResponse},
};
use tracing::{debug, warn};

use crate::{error::CatalogError, query::QueryParams};

/// Read-only catalog endpoints the course list depends on.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search_courses(
        &self,
        params: &QueryParams,
    ) -> Result<CourseSearchResponse, CatalogError>;
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;
}

pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CatalogError::Network(format!("failed to build http client: {err}")))?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url.as_ref()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn search_courses(
        &self,
        params: &QueryParams,
    ) -> Result<CourseSearchResponse, CatalogError> {
        let base_url = &self.base_url;
        debug!(page = params.page, sort_by = %params.sort_by, "catalog: GET /courses");
        let response = self
            .http
            .get(format!("{base_url}/courses"))
            .query(&params.to_pairs())
            .send()
            .await
            .map_err(network_error)?;
        decode_json(ensure_success(response).await?).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let base_url = &self.base_url;
        let response = self
            .http
            .get(format!("{base_url}/categories"))
            .send()
            .await
            .map_err(network_error)?;
        let payload: CategoriesPayload = decode_json(ensure_success(response).await?).await?;
        Ok(payload.into_categories())
    }
}

/// Trims whitespace and trailing slashes, and assumes `http://` when no scheme is given.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn network_error(err: reqwest::Error) -> CatalogError {
    CatalogError::Network(err.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .filter(|api_error| !api_error.message.trim().is_empty())
        .map(|api_error| api_error.to_string())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    warn!(status = status.as_u16(), %message, "catalog: request rejected by server");
    Err(CatalogError::Server {
        status: status.as_u16(),
        message,
    })
}

/// A 2xx body that does not decode is reported with the status the server sent.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    let status = response.status();
    response.json().await.map_err(|err| {
        if err.is_decode() {
            warn!(status = status.as_u16(), error = %err, "catalog: malformed response body");
            CatalogError::Server {
                status: status.as_u16(),
                message: format!("malformed response body: {err}"),
            }
        } else {
            network_error(err)
        }
    })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
