//! HTTP surface of the identity verification service.
//!
//! `POST /ocr` takes a multipart upload with `front`, `back` and `selfie`
//! images and answers with the verified record or a rejection body.
//! `GET /health` answers `ok`.

mod intake;
mod response;

pub use intake::{IntakeError, read_images};
pub use response::{ErrorBody, outcome_response, rejection_response, status_for};

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use idcheck_config::ServerConfig;
use idcheck_core::Verifier;
use idcheck_providers::Oracle;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the service router around a shared [`Verifier`].
pub fn router<O>(verifier: Arc<Verifier<O>>, config: &ServerConfig) -> Router
where
    O: Oracle + 'static,
{
    Router::new()
        .route("/ocr", post(verify::<O>))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(verifier)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn verify<O>(State(verifier): State<Arc<Verifier<O>>>, multipart: Multipart) -> Response
where
    O: Oracle + 'static,
{
    let request = match read_images(multipart).await {
        Ok(request) => request,
        Err(err) => {
            tracing::info!(error = %err, "Rejected upload");
            return err.into_response();
        }
    };
    outcome_response(verifier.verify(&request).await)
}

async fn health() -> &'static str {
    "ok"
}
