//! Parse step: raw oracle text into a known shape.
//!
//! Nothing downstream looks at untyped JSON. A reply is either the
//! order-mismatch sentinel or a [`PartialRecord`] whose fields may be absent.

use idcheck_providers::prompt::{ORDER_ERROR_KEY, ORDER_MISMATCH_SENTINEL};
use idcheck_types::{RawModelReply, RequiredField};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplyParseError {
    #[error("reply is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("reply is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("reply object has an unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// The oracle flagged front and back as swapped.
    OrderError,
    Partial(PartialRecord),
}

/// The six record fields as the oracle sent them. JSON `null` reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    pub document_number: Option<Value>,
    pub full_name: Option<Value>,
    pub date_of_birth: Option<Value>,
    pub date_of_issue: Option<Value>,
    pub place_of_issue: Option<Value>,
    pub face_match: Option<Value>,
}

/// A [`PartialRecord`] with every field present. Values are still unchecked.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteFields {
    pub document_number: Value,
    pub full_name: Value,
    pub date_of_birth: Value,
    pub date_of_issue: Value,
    pub place_of_issue: Value,
    pub face_match: Value,
}

impl PartialRecord {
    #[must_use]
    pub fn get(&self, field: RequiredField) -> Option<&Value> {
        match field {
            RequiredField::DocumentNumber => self.document_number.as_ref(),
            RequiredField::FullName => self.full_name.as_ref(),
            RequiredField::DateOfBirth => self.date_of_birth.as_ref(),
            RequiredField::DateOfIssue => self.date_of_issue.as_ref(),
            RequiredField::PlaceOfIssue => self.place_of_issue.as_ref(),
            RequiredField::FaceMatch => self.face_match.as_ref(),
        }
    }

    /// Every absent field, in declaration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    /// Promote to [`CompleteFields`], or list every field that is absent.
    pub fn complete(self) -> Result<CompleteFields, Vec<RequiredField>> {
        let missing = self.missing_fields();
        match self {
            PartialRecord {
                document_number: Some(document_number),
                full_name: Some(full_name),
                date_of_birth: Some(date_of_birth),
                date_of_issue: Some(date_of_issue),
                place_of_issue: Some(place_of_issue),
                face_match: Some(face_match),
            } => Ok(CompleteFields {
                document_number,
                full_name,
                date_of_birth,
                date_of_issue,
                place_of_issue,
                face_match,
            }),
            _ => Err(missing),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse the oracle's text.
///
/// The order sentinel wins whenever the object's `error` member is exactly
/// `front/back order`, whatever else the object holds. Members outside the
/// six record fields are ignored.
pub fn parse_reply(reply: &RawModelReply) -> Result<ParsedReply, ReplyParseError> {
    let value: Value = serde_json::from_str(reply.as_str()).map_err(ReplyParseError::Json)?;

    let map = match value {
        Value::Object(map) => map,
        other => return Err(ReplyParseError::NotAnObject(json_kind(&other))),
    };

    if map.get(ORDER_ERROR_KEY).and_then(Value::as_str) == Some(ORDER_MISMATCH_SENTINEL) {
        return Ok(ParsedReply::OrderError);
    }

    let record = serde_json::from_value(Value::Object(map)).map_err(ReplyParseError::Shape)?;
    Ok(ParsedReply::Partial(record))
}
