//! HTTP client for the analytics backend.
//!
//! One method per backend capability, all funnelled through a single
//! success-or-structured-failure decode path. Each call is attempted exactly
//! once; there is no retry and no client-side timeout.

use crate::core::models::{
    ColumnsResponse, Explanation, FeatureIdeas, HealthResponse, Payload, PreviewResult,
    ProfileResult, UploadResponse,
};
use crate::core::types::DatasetId;
use color_eyre::Result;
use reqwest::{multipart, Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// A failed backend operation, carrying the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the request and supplied a `detail` message.
    #[error("{0}")]
    Backend(String),
    /// The request never completed or the response could not be decoded;
    /// the message is the operation's fixed fallback.
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            Self::Backend(msg) | Self::Transport(msg) => msg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given backend endpoint. All operations resolve
    /// against this one base URL.
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("datapilot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /upload` with the file bytes as multipart field `file`.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Payload<UploadResponse>, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let req = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form);
        self.expect_json(req, "Upload failed").await
    }

    /// `GET /datasets/{id}/preview?n={row_limit}`.
    pub async fn preview(
        &self,
        dataset_id: &DatasetId,
        row_limit: u32,
    ) -> Result<Payload<PreviewResult>, ApiError> {
        let req = self
            .http
            .get(format!("{}/datasets/{}/preview", self.base_url, dataset_id))
            .query(&[("n", row_limit)]);
        let payload: Payload<PreviewResult> = self.expect_json(req, "Preview failed").await?;

        let extra = payload.data.undeclared_keys();
        if !extra.is_empty() {
            warn!(?extra, "preview records carry keys not declared in columns");
        }
        Ok(payload)
    }

    /// `GET /datasets/{id}/profile`.
    pub async fn profile(&self, dataset_id: &DatasetId) -> Result<Payload<ProfileResult>, ApiError> {
        let req = self
            .http
            .get(format!("{}/datasets/{}/profile", self.base_url, dataset_id));
        self.expect_json(req, "Profile failed").await
    }

    /// `POST /datasets/{id}/explain` (no body).
    pub async fn explain(&self, dataset_id: &DatasetId) -> Result<Payload<Explanation>, ApiError> {
        let req = self
            .http
            .post(format!("{}/datasets/{}/explain", self.base_url, dataset_id));
        self.expect_json(req, "Explain failed").await
    }

    /// `GET /datasets/{id}/columns`.
    pub async fn columns(&self, dataset_id: &DatasetId) -> Result<Payload<ColumnsResponse>, ApiError> {
        let req = self
            .http
            .get(format!("{}/datasets/{}/columns", self.base_url, dataset_id));
        self.expect_json(req, "Get columns failed").await
    }

    /// `POST /datasets/{id}/explain-column?column={name}` (no body).
    pub async fn explain_column(
        &self,
        dataset_id: &DatasetId,
        column: &str,
    ) -> Result<Payload<Explanation>, ApiError> {
        let req = self
            .http
            .post(format!(
                "{}/datasets/{}/explain-column",
                self.base_url, dataset_id
            ))
            .query(&[("column", column)]);
        self.expect_json(req, "Explain column failed").await
    }

    /// `POST /datasets/{id}/feature-ideas` (no body).
    pub async fn feature_ideas(
        &self,
        dataset_id: &DatasetId,
    ) -> Result<Payload<FeatureIdeas>, ApiError> {
        let req = self.http.post(format!(
            "{}/datasets/{}/feature-ideas",
            self.base_url, dataset_id
        ));
        self.expect_json(req, "Feature ideas failed").await
    }

    /// `GET /health`. Reachability probe; not part of the dataset workflow.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let req = self.http.get(format!("{}/health", self.base_url));
        let payload: Payload<HealthResponse> = self.expect_json(req, "Health check failed").await?;
        Ok(payload.data)
    }

    /// Shared decode path: send the request, then either decode the success
    /// body into `T` or turn the response into an [`ApiError`].
    async fn expect_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<Payload<T>, ApiError> {
        let resp = req.send().await.map_err(|e| {
            warn!(error = %e, "request did not complete");
            ApiError::Transport(fallback.to_string())
        })?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            warn!(error = %e, %status, "failed reading response body");
            ApiError::Transport(fallback.to_string())
        })?;

        if !status.is_success() {
            return Err(failure_from_body(status, &body, fallback));
        }
        decode_success(&body, fallback)
    }
}

/// Decode a success body into `T`, keeping the raw JSON alongside. A body
/// that does not conform to the schema is a transport-level failure.
fn decode_success<T: DeserializeOwned>(body: &[u8], fallback: &str) -> Result<Payload<T>, ApiError> {
    let raw: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "success body is not valid JSON");
        ApiError::Transport(fallback.to_string())
    })?;
    let data: T = serde_json::from_value(raw.clone()).map_err(|e| {
        warn!(error = %e, "success body does not match the expected schema");
        ApiError::Transport(fallback.to_string())
    })?;
    Ok(Payload { data, raw })
}

/// Map a non-success response to an error. The `detail` field is surfaced
/// verbatim when the body decodes; decode problems never mask the original
/// failure, they just fall back to the fixed message.
fn failure_from_body(status: StatusCode, body: &[u8], fallback: &str) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<String>,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { detail: Some(detail) }) => {
            debug!(%status, detail, "backend declared failure");
            ApiError::Backend(detail)
        }
        _ => {
            debug!(%status, "non-success response without a usable detail field");
            ApiError::Transport(fallback.to_string())
        }
    }
}
