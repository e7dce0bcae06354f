//! Response validation and the verification pipeline.
//!
//! - [`reply`] - parse raw oracle text into [`ParsedReply`]
//! - [`validate`] - apply the ordered business rules to a parsed reply
//! - [`Verifier`] - oracle call followed by validation

pub mod reply;
pub mod validate;
mod verifier;

pub use reply::{ParsedReply, PartialRecord, ReplyParseError, parse_reply};
pub use validate::{validate, validate_parsed};
pub use verifier::Verifier;
