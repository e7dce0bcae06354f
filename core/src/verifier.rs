//! The verification pipeline: one oracle call, then one validation pass.

use crate::validate::validate;
use idcheck_providers::Oracle;
use idcheck_types::{VerificationOutcome, VerificationRequest};
use std::time::Instant;

/// Joins an [`Oracle`] to the validator.
///
/// Holds no per-request state, so one instance serves concurrent requests.
#[derive(Debug, Clone)]
pub struct Verifier<O> {
    oracle: O,
}

impl<O: Oracle> Verifier<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run one verification.
    ///
    /// An oracle failure is returned as-is and the validator never runs, so no
    /// partial record can escape.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        let started = Instant::now();

        let outcome = match self.oracle.generate(request).await {
            Ok(reply) => validate(&reply),
            Err(err) => {
                tracing::warn!(error = %err, "Oracle call failed");
                VerificationOutcome::Rejected(err.into())
            }
        };

        tracing::info!(
            outcome = outcome.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            image_bytes = request.total_bytes(),
            "Verification finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idcheck_providers::OracleError;
    use idcheck_types::{
        ImageBlob, MediaType, RawModelReply, RejectionReason, RequiredField,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Reply(&'static str),
        Fail(fn() -> OracleError),
    }

    struct ScriptedOracle {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedOracle {
        fn new(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Oracle for ScriptedOracle {
        async fn generate(
            &self,
            _request: &VerificationRequest,
        ) -> Result<RawModelReply, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Reply(text) => Ok(RawModelReply::from(*text)),
                Script::Fail(make) => Err(make()),
            }
        }
    }

    fn request() -> VerificationRequest {
        let blob = || ImageBlob::new(MediaType::new("image/jpeg"), vec![0xFF, 0xD8]);
        VerificationRequest::new(blob(), blob(), blob())
    }

    const VALID: &str = r#"{"documentNumber":"79123456","fullName":"JUAN CARLOS RUIZ","dateOfBirth":"1985-02-14","dateOfIssue":"2003-03-20","placeOfIssue":"MEDELLIN","faceMatch":true}"#;

    #[tokio::test]
    async fn valid_reply_succeeds() {
        let verifier = Verifier::new(ScriptedOracle::new(Script::Reply(VALID)));
        let outcome = verifier.verify(&request()).await;

        let record = outcome.into_result().unwrap();
        assert_eq!(record.document_number, "79123456");
        assert_eq!(verifier.oracle().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_is_surfaced_without_validation() {
        let verifier = Verifier::new(ScriptedOracle::new(Script::Fail(|| OracleError::Timeout)));
        assert_eq!(
            verifier.verify(&request()).await,
            VerificationOutcome::Rejected(RejectionReason::Timeout)
        );
    }

    #[tokio::test]
    async fn transport_kinds_are_preserved() {
        let cases: [(fn() -> OracleError, RejectionReason); 3] = [
            (|| OracleError::RateLimited, RejectionReason::RateLimited),
            (|| OracleError::Unavailable, RejectionReason::OracleUnavailable),
            (
                || OracleError::Internal("connection reset".into()),
                RejectionReason::InternalFailure,
            ),
        ];
        for (make, expected) in cases {
            let verifier = Verifier::new(ScriptedOracle::new(Script::Fail(make)));
            assert_eq!(
                verifier.verify(&request()).await,
                VerificationOutcome::Rejected(expected)
            );
        }
    }

    #[tokio::test]
    async fn semantic_rejections_flow_through() {
        let verifier = Verifier::new(ScriptedOracle::new(Script::Reply(
            r#"{"documentNumber":"1","fullName":"A","dateOfBirth":"1990-01-01","dateOfIssue":"2010-01-01"}"#,
        )));
        assert_eq!(
            verifier.verify(&request()).await,
            VerificationOutcome::Rejected(RejectionReason::MissingFields(vec![
                RequiredField::PlaceOfIssue,
                RequiredField::FaceMatch,
            ]))
        );
    }

    #[tokio::test]
    async fn non_json_reply_is_internal_failure() {
        let verifier = Verifier::new(ScriptedOracle::new(Script::Reply("Sorry, I can't help")));
        assert_eq!(
            verifier.verify(&request()).await,
            VerificationOutcome::Rejected(RejectionReason::InternalFailure)
        );
    }

    #[tokio::test]
    async fn each_verification_calls_the_oracle_once() {
        let verifier = Verifier::new(ScriptedOracle::new(Script::Reply(VALID)));
        let first = verifier.verify(&request()).await;
        let second = verifier.verify(&request()).await;
        assert_eq!(first, second);
        assert_eq!(verifier.oracle().calls.load(Ordering::SeqCst), 2);
    }
}
