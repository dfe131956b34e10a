//! HTTP upload of flattened analysis results.
//!
//! The endpoint receives `{ root, generated_at, records }` and answers with
//! `{ success, id?, message? }`. Upload failures are never fatal to a scan.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::CodeAnalysisResult;
use crate::export::{self, FlatRecord};

/// Errors that can occur while uploading.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid upload url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("endpoint rejected upload: {0}")]
    Rejected(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct UploadPayload<'a> {
    pub root: &'a str,
    /// Seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<u64>,
    pub records: Vec<FlatRecord>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// What the endpoint returned for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: Option<String>,
    pub message: Option<String>,
}

/// Posts analysis results to a configured endpoint.
pub struct Uploader {
    http: Client,
    url: Url,
    timeout: Duration,
}

impl Uploader {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self, UploadError> {
        let url = Url::parse(url).map_err(|e| UploadError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let http = Client::builder()
            .user_agent(concat!("codestruct/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Upload the flattened result.
    pub async fn upload(&self, result: &CodeAnalysisResult) -> Result<UploadReceipt, UploadError> {
        let payload = UploadPayload {
            root: &result.root,
            generated_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs()),
            records: export::flatten(result),
        };
        debug!(url = %self.url, records = payload.records.len(), "uploading analysis");

        let response = self
            .http
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UploadError::Timeout
                } else {
                    UploadError::Network(e)
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_response(status, &body)
    }

    /// Upload from synchronous code on a private current-thread runtime.
    pub fn upload_blocking(&self, result: &CodeAnalysisResult) -> Result<UploadReceipt, UploadError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(UploadError::Runtime)?;
        runtime.block_on(self.upload(result))
    }
}

/// Decide the outcome of an upload from the HTTP status and body.
pub fn interpret_response(status: u16, body: &str) -> Result<UploadReceipt, UploadError> {
    if !(200..300).contains(&status) {
        return Err(UploadError::Status {
            status,
            body: body.chars().take(200).collect(),
        });
    }
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| UploadError::Decode(e.to_string()))?;
    if !response.success {
        return Err(UploadError::Rejected(
            response.message.unwrap_or_else(|| "no message".to_string()),
        ));
    }
    Ok(UploadReceipt {
        id: response.id,
        message: response.message,
    })
}
