//! Verification outcome and the closed rejection taxonomy.

use crate::{RequiredField, VerificationRecord};
use thiserror::Error;

/// Why a verification did not produce a record.
///
/// The first four variants come from talking to the oracle; the rest come
/// from validating what it said. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("timeout contacting oracle")]
    Timeout,
    #[error("rate limit reached")]
    RateLimited,
    #[error("oracle returned no data")]
    OracleUnavailable,
    #[error("internal verification failure")]
    InternalFailure,
    #[error("documents out of order: front and back appear swapped")]
    DocumentOrderMismatch,
    #[error("missing fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
    #[error("dates inconsistent or in the wrong order")]
    InconsistentDates,
    #[error("face verification failed")]
    FaceMismatch,
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RejectionReason {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            RejectionReason::Timeout => "timeout",
            RejectionReason::RateLimited => "rate_limited",
            RejectionReason::OracleUnavailable => "oracle_unavailable",
            RejectionReason::InternalFailure => "internal_failure",
            RejectionReason::DocumentOrderMismatch => "document_order_mismatch",
            RejectionReason::MissingFields(_) => "missing_fields",
            RejectionReason::InconsistentDates => "inconsistent_dates",
            RejectionReason::FaceMismatch => "face_mismatch",
        }
    }

    /// True for rejections produced by reading the oracle's answer, as opposed
    /// to failing to get one.
    #[must_use]
    pub const fn is_semantic(&self) -> bool {
        matches!(
            self,
            RejectionReason::DocumentOrderMismatch
                | RejectionReason::MissingFields(_)
                | RejectionReason::InconsistentDates
                | RejectionReason::FaceMismatch
        )
    }
}

/// Result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Success(VerificationRecord),
    Rejected(RejectionReason),
}

impl VerificationOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, VerificationOutcome::Success(_))
    }

    /// Outcome label for logs: `success` or the rejection kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            VerificationOutcome::Success(_) => "success",
            VerificationOutcome::Rejected(reason) => reason.kind(),
        }
    }

    pub fn into_result(self) -> Result<VerificationRecord, RejectionReason> {
        match self {
            VerificationOutcome::Success(record) => Ok(record),
            VerificationOutcome::Rejected(reason) => Err(reason),
        }
    }
}

impl From<RejectionReason> for VerificationOutcome {
    fn from(reason: RejectionReason) -> Self {
        VerificationOutcome::Rejected(reason)
    }
}
