//! The successful verification record and its field vocabulary.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

/// The six fields every verification record carries, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequiredField {
    DocumentNumber,
    FullName,
    DateOfBirth,
    DateOfIssue,
    PlaceOfIssue,
    FaceMatch,
}

impl RequiredField {
    pub const ALL: [RequiredField; 6] = [
        RequiredField::DocumentNumber,
        RequiredField::FullName,
        RequiredField::DateOfBirth,
        RequiredField::DateOfIssue,
        RequiredField::PlaceOfIssue,
        RequiredField::FaceMatch,
    ];

    /// JSON key used by the oracle and by the caller-facing record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RequiredField::DocumentNumber => "documentNumber",
            RequiredField::FullName => "fullName",
            RequiredField::DateOfBirth => "dateOfBirth",
            RequiredField::DateOfIssue => "dateOfIssue",
            RequiredField::PlaceOfIssue => "placeOfIssue",
            RequiredField::FaceMatch => "faceMatch",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequiredField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a calendar date (expected yyyy-MM-dd): {input:?}")]
pub struct DateParseError {
    pub input: String,
}

/// An ISO-8601 calendar date that keeps the exact text it was parsed from.
///
/// Ordering goes by the parsed date first; serialization writes the original
/// text back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDate {
    raw: String,
    date: NaiveDate,
}

impl CalendarDate {
    /// Parse exactly `yyyy-MM-dd`: four-digit year, zero-padded month and day,
    /// no sign and no surrounding whitespace.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DateParseError> {
        let raw = raw.into();
        if !is_iso_date_shape(&raw) {
            return Err(DateParseError { input: raw });
        }
        match NaiveDate::from_str(&raw) {
            Ok(date) => Ok(Self { raw, date }),
            Err(_) => Err(DateParseError { input: raw }),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

fn is_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A semantically valid identity-verification result.
///
/// Only the validator builds these; by the time one exists the issue date is
/// strictly after the birth date and the face comparison succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub document_number: String,
    pub full_name: String,
    pub date_of_birth: CalendarDate,
    pub date_of_issue: CalendarDate,
    pub place_of_issue: String,
    pub face_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = CalendarDate::parse("1990-05-10").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(1990, 5, 10).unwrap());
        assert_eq!(date.as_str(), "1990-05-10");
    }

    #[test]
    fn rejects_non_dates() {
        assert!(CalendarDate::parse("10/05/1990").is_err());
        assert!(CalendarDate::parse("1990-02-30").is_err());
        assert!(CalendarDate::parse("").is_err());
        let err = CalendarDate::parse("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
    }

    #[test]
    fn rejects_loose_iso_forms() {
        for loose in [
            "1990-5-1",
            "1990-05-1",
            " 1990-05-10",
            "1990-05-10 ",
            "+1990-05-10",
            "01990-05-10",
            "1990/05/10",
            "1990-05-10T00:00",
        ] {
            let err = CalendarDate::parse(loose).unwrap_err();
            assert_eq!(err.input, loose);
        }
    }

    #[test]
    fn equality_includes_the_text() {
        let date = CalendarDate::parse("1990-05-10").unwrap();
        assert_eq!(date, CalendarDate::parse("1990-05-10").unwrap());
        assert_ne!(date, CalendarDate::parse("1990-05-11").unwrap());

        let same_day_other_text = CalendarDate {
            raw: "19900510".to_string(),
            date: date.date(),
        };
        assert_ne!(date, same_day_other_text);
        assert_ne!(date.cmp(&same_day_other_text), Ordering::Equal);
    }

    #[test]
    fn orders_by_parsed_date() {
        let birth = CalendarDate::parse("1990-05-10").unwrap();
        let issue = CalendarDate::parse("2015-06-01").unwrap();
        assert!(issue > birth);
        assert_eq!(birth.cmp(&birth.clone()), Ordering::Equal);
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let record = VerificationRecord {
            document_number: "1020304050".to_string(),
            full_name: "ANA MARIA PEREZ".to_string(),
            date_of_birth: CalendarDate::parse("1990-05-10").unwrap(),
            date_of_issue: CalendarDate::parse("2015-06-01").unwrap(),
            place_of_issue: "BOGOTA D.C.".to_string(),
            face_match: true,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "documentNumber": "1020304050",
                "fullName": "ANA MARIA PEREZ",
                "dateOfBirth": "1990-05-10",
                "dateOfIssue": "2015-06-01",
                "placeOfIssue": "BOGOTA D.C.",
                "faceMatch": true
            })
        );

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for field in RequiredField::ALL {
            assert!(keys.contains(&field.as_str().to_string()));
        }
    }
}
