//! Multipart intake: the `front`, `back` and `selfie` parts of an upload.

use crate::response::ErrorBody;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use idcheck_types::{ImageBlob, ImageSlot, MediaType, MissingImages, VerificationRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Missing(#[from] MissingImages),
    #[error("only one file is accepted for '{0}'")]
    Duplicate(ImageSlot),
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntakeError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::Multipart(err) => err.status(),
            IntakeError::Missing(_) | IntakeError::Duplicate(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            IntakeError::Missing(_) => "missing_images",
            IntakeError::Duplicate(_) => "duplicate_image",
            IntakeError::Multipart(_) => "malformed_upload",
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.status(), self.kind(), self.to_string());
        (self.status(), body).into_response()
    }
}

#[derive(Default)]
struct Slots {
    front: Option<ImageBlob>,
    back: Option<ImageBlob>,
    selfie: Option<ImageBlob>,
}

impl Slots {
    fn slot_mut(&mut self, slot: ImageSlot) -> &mut Option<ImageBlob> {
        match slot {
            ImageSlot::Front => &mut self.front,
            ImageSlot::Back => &mut self.back,
            ImageSlot::Selfie => &mut self.selfie,
        }
    }
}

/// Drain the upload into a [`VerificationRequest`].
///
/// Parts with other names are skipped. The media type comes from each part's
/// `Content-Type` header.
pub async fn read_images(mut multipart: Multipart) -> Result<VerificationRequest, IntakeError> {
    let mut slots = Slots::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(slot) = field.name().and_then(ImageSlot::parse) else {
            tracing::debug!(name = ?field.name(), "Skipping unknown multipart part");
            continue;
        };
        if slots.slot_mut(slot).is_some() {
            return Err(IntakeError::Duplicate(slot));
        }

        let media_type = MediaType::new(field.content_type().unwrap_or_default());
        let bytes = field.bytes().await?;
        tracing::debug!(%slot, media_type = media_type.as_str(), bytes = bytes.len(), "Received image");
        *slots.slot_mut(slot) = Some(ImageBlob::new(media_type, bytes.to_vec()));
    }

    let Slots {
        front,
        back,
        selfie,
    } = slots;
    Ok(VerificationRequest::from_parts(front, back, selfie)?)
}
