//! Validate step: a parsed reply into a verification outcome.
//!
//! Rules run in a fixed order and the first failing rule decides the single
//! rejection a caller sees:
//!
//! 1. order sentinel → `DocumentOrderMismatch`
//! 2. any of the six fields absent → `MissingFields` (all of them)
//! 3. dates unparseable, or issue not strictly after birth → `InconsistentDates`
//! 4. `faceMatch` anything but boolean `true` → `FaceMismatch`
//! 5. otherwise `Success`
//!
//! Pure: no IO, no clock, no shared state.

use crate::reply::{CompleteFields, ParsedReply, parse_reply};
use idcheck_types::{
    CalendarDate, RawModelReply, RejectionReason, VerificationOutcome, VerificationRecord,
};
use serde_json::Value;

/// Parse and validate a raw oracle reply.
///
/// Text that is not a JSON object yields `Rejected(InternalFailure)`.
#[must_use]
pub fn validate(reply: &RawModelReply) -> VerificationOutcome {
    match parse_reply(reply) {
        Ok(parsed) => validate_parsed(parsed),
        Err(e) => {
            tracing::warn!(error = %e, reply_bytes = reply.as_str().len(), "Unparseable oracle reply");
            VerificationOutcome::Rejected(RejectionReason::InternalFailure)
        }
    }
}

#[must_use]
pub fn validate_parsed(parsed: ParsedReply) -> VerificationOutcome {
    let partial = match parsed {
        ParsedReply::OrderError => {
            return VerificationOutcome::Rejected(RejectionReason::DocumentOrderMismatch);
        }
        ParsedReply::Partial(partial) => partial,
    };

    let fields = match partial.complete() {
        Ok(fields) => fields,
        Err(missing) => return VerificationOutcome::Rejected(RejectionReason::MissingFields(missing)),
    };

    match check_fields(fields) {
        Ok(record) => VerificationOutcome::Success(record),
        Err(reason) => VerificationOutcome::Rejected(reason),
    }
}

fn check_fields(fields: CompleteFields) -> Result<VerificationRecord, RejectionReason> {
    let CompleteFields {
        document_number,
        full_name,
        date_of_birth,
        date_of_issue,
        place_of_issue,
        face_match,
    } = fields;

    let (Some(date_of_birth), Some(date_of_issue)) =
        (as_calendar_date(date_of_birth), as_calendar_date(date_of_issue))
    else {
        return Err(RejectionReason::InconsistentDates);
    };
    if date_of_issue <= date_of_birth {
        return Err(RejectionReason::InconsistentDates);
    }

    if face_match != Value::Bool(true) {
        return Err(RejectionReason::FaceMismatch);
    }

    Ok(VerificationRecord {
        document_number: into_text(document_number),
        full_name: into_text(full_name),
        date_of_birth,
        date_of_issue,
        place_of_issue: into_text(place_of_issue),
        face_match: true,
    })
}

fn as_calendar_date(value: Value) -> Option<CalendarDate> {
    match value {
        Value::String(text) => CalendarDate::parse(text).ok(),
        _ => None,
    }
}

/// Strings pass through untouched; other JSON values keep their JSON text.
fn into_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
