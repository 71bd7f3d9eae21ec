//! HTTP client for the slot service
//!
//! One request per action, no retry policy: a failed save or test run is
//! retried by the operator, not by this client. Every request carries the
//! bearer token from the [`TokenStore`]; a 401/403 clears the token and
//! surfaces [`ClientError::AuthRequired`].

pub mod models;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::{Config, ServiceConfig};
use crate::media::{MediaFile, MediaUploader, UploadError};
use crate::workflow::issues::{ValidationIssue, detail_message, normalize_issues};
use models::{MediaRegistered, SlotDetails, SlotPayload, TestRunPayload};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication required")]
    AuthRequired,

    #[error("endpoint not configured: {0}")]
    MissingEndpoint(&'static str),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("connection timeout")]
    Timeout,

    #[error("service returned status {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status {
        status: u16,
        detail: Option<String>,
    },

    #[error("validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for the slot configuration endpoints.
pub struct SlotClient {
    http: Client,
    service: ServiceConfig,
    tokens: Arc<dyn TokenStore>,
}

impl SlotClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .user_agent(&config.http.user_agent)
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            service: config.service.clone(),
            tokens,
        })
    }

    /// Fetch the current slot representation.
    pub async fn fetch_slot(&self) -> Result<SlotDetails> {
        let endpoint = self.endpoint(self.service.slot_api.as_str(), "service.slot_api")?;
        debug!(endpoint, "Fetching slot");

        let response = self.execute(self.http.get(endpoint)).await?;
        let status = response.status();
        let body = read_json(response).await;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        SlotDetails::from_payload(body)
            .ok_or_else(|| ClientError::InvalidBody("slot representation expected".to_string()))
    }

    /// Persist the slot. Returns the server's echoed representation, which
    /// callers treat as authoritative.
    pub async fn save_slot(&self, payload: &SlotPayload) -> Result<SlotDetails> {
        let endpoint = self.endpoint(self.service.save_endpoint(), "service.slot_save")?;
        debug!(endpoint, slot_id = %payload.slot_id, "Saving slot");

        let response = self.execute(self.http.put(endpoint).json(payload)).await?;
        let status = response.status();
        let body = read_json(response).await;
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            warn!(slot_id = %payload.slot_id, "Save rejected with validation issues");
            return Err(ClientError::Validation(normalize_issues(&body)));
        }
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        // A 2xx echo that is not a slot must not be applied over local state.
        SlotDetails::from_payload(body)
            .ok_or_else(|| ClientError::InvalidBody("slot representation expected".to_string()))
    }

    /// Register a template image and return its media object id.
    pub async fn register_template(
        &self,
        slot_id: &str,
        media_kind: &str,
        file: &MediaFile,
    ) -> Result<String> {
        let endpoint = self.endpoint(
            self.service.template_upload.as_str(),
            "service.template_upload",
        )?;
        debug!(endpoint, slot_id, media_kind, file = %file.file_name, "Uploading template media");

        let form = Form::new()
            .text("slot_id", slot_id.to_string())
            .text("media_kind", media_kind.to_string())
            .part("file", file_part(file)?);
        let response = self
            .execute(self.http.post(endpoint).multipart(form))
            .await?;
        let status = response.status();
        let body = read_json(response).await;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let registered: MediaRegistered = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidBody(e.to_string()))?;
        let id = registered.into_id();
        if id.is_empty() {
            return Err(ClientError::InvalidBody(
                "upload response carried no media_object_id".to_string(),
            ));
        }
        Ok(id)
    }

    /// Submit a one-off test run: the slot payload as a JSON part plus the
    /// raw test image. Returns the service acknowledgement.
    pub async fn run_test(
        &self,
        payload: &TestRunPayload,
        test_image: &MediaFile,
    ) -> Result<Value> {
        let endpoint = self.endpoint(self.service.test_run.as_str(), "service.test_run")?;
        debug!(endpoint, provider = %payload.provider, "Submitting test run");

        let slot_payload = serde_json::to_string(payload)
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        let form = Form::new()
            .text("slot_payload", slot_payload)
            .part("test_image", file_part(test_image)?);
        let response = self
            .execute(self.http.post(endpoint).multipart(form))
            .await?;
        let status = response.status();
        let body = read_json(response).await;
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ClientError::Validation(normalize_issues(&body)));
        }
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(body)
    }

    fn endpoint<'a>(&self, value: &'a str, name: &'static str) -> Result<&'a str> {
        if value.is_empty() {
            Err(ClientError::MissingEndpoint(name))
        } else {
            Ok(value)
        }
    }

    /// Send a request with the bearer token attached. A 401/403 clears the
    /// stored token so the session fails fast on the next action too.
    async fn execute(&self, mut request: RequestBuilder) -> Result<Response> {
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.tokens.clear();
            return Err(ClientError::AuthRequired);
        }
        Ok(response)
    }
}

#[async_trait]
impl MediaUploader for SlotClient {
    async fn upload_template(
        &self,
        slot_id: &str,
        media_kind: &str,
        file: &MediaFile,
    ) -> std::result::Result<String, UploadError> {
        self.register_template(slot_id, media_kind, file)
            .await
            .map_err(|e| match e {
                ClientError::Status { status, detail } if status < 500 => UploadError::Rejected(
                    detail.unwrap_or_else(|| format!("HTTP {status}")),
                ),
                other => UploadError::Failed(other.to_string()),
            })
    }
}

fn file_part(file: &MediaFile) -> Result<Part> {
    Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(file.mime_type())
        .map_err(|e| ClientError::RequestFailed(e.to_string()))
}

async fn read_json(response: Response) -> Value {
    response.json().await.unwrap_or(Value::Null)
}

fn status_error(status: StatusCode, body: &Value) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        detail: detail_message(body),
    }
}
