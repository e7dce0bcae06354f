//! Oracle client for identity verification.
//!
//! # Architecture
//!
//! - [`Oracle`] - The seam between the verification pipeline and whatever answers it
//! - [`gemini`] - Google Gemini client (GenerateContent API, non-streaming)
//! - [`prompt`] - Fixed instructions and the declared reply schema
//! - [`response_types`] - Typed GenerateContent response envelope
//!
//! # Error Handling
//!
//! Transport problems are classified here, before anything reaches the
//! validator, into the four [`OracleError`] kinds:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Client deadline, HTTP 408/504 | `Timeout` |
//! | HTTP 429 | `RateLimited` |
//! | Reply carries no text | `Unavailable` |
//! | Anything else | `Internal` |
//!
//! A reply that has text but is not JSON is *not* an error here; it is handed
//! to the validator untouched. Nothing is retried.

pub mod gemini;
pub mod prompt;
pub mod response_types;

pub use gemini::{GeminiClient, OracleSettings};
pub use idcheck_types;

use idcheck_types::{RawModelReply, RejectionReason, VerificationRequest};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Transport-level failure while asking the oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle did not answer before the deadline")]
    Timeout,
    #[error("oracle rate limit reached")]
    RateLimited,
    #[error("oracle returned no text")]
    Unavailable,
    #[error("oracle request failed: {0}")]
    Internal(String),
}

impl From<OracleError> for RejectionReason {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout => RejectionReason::Timeout,
            OracleError::RateLimited => RejectionReason::RateLimited,
            OracleError::Unavailable => RejectionReason::OracleUnavailable,
            OracleError::Internal(_) => RejectionReason::InternalFailure,
        }
    }
}

/// Something that turns three images into a raw text answer.
///
/// Implementations make exactly one attempt per call.
pub trait Oracle: Send + Sync {
    fn generate(
        &self,
        request: &VerificationRequest,
    ) -> impl Future<Output = Result<RawModelReply, OracleError>> + Send;
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Build an HTTP client whose every request is bounded by `timeout`.
///
/// `https_only` is relaxed only for loopback test servers.
pub fn http_client_with_timeout(
    timeout: Duration,
    https_only: bool,
) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder()
        .https_only(https_only)
        .timeout(timeout)
        .build()
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

pub(crate) fn classify_transport_error(err: &reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Internal(err.to_string())
    }
}

/// Map a non-success status to its oracle error kind, if it has a dedicated one.
pub(crate) fn classify_status(status: StatusCode) -> Option<OracleError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(OracleError::RateLimited),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Some(OracleError::Timeout),
        _ => None,
    }
}
