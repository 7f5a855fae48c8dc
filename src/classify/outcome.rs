//! Outcome classification: result code plus normalized error.

use crate::model::Outcome;
use crate::report::error_parser::normalize;
use crate::report::{ErrorRecord, ResultCode};

/// Result code an outcome maps to, without touching its payload
pub fn result_code(outcome: &Outcome) -> ResultCode {
    match outcome {
        Outcome::Successful => ResultCode::Success,
        Outcome::Compromised(_) => ResultCode::Compromised,
        Outcome::FailedWithError(_) => ResultCode::Error,
        Outcome::FailedWithAssertionError(_) => ResultCode::Failure,
        Outcome::Skipped => ResultCode::Skipped,
        Outcome::Ignored => ResultCode::Ignored,
        Outcome::ImplementationPending => ResultCode::Pending,
    }
}

/// Map an outcome to its result code and, for failures, the normalized error
pub fn classify(outcome: &Outcome) -> (ResultCode, Option<ErrorRecord>) {
    (result_code(outcome), outcome.error().map(normalize))
}

/// Result implied by several outcomes: the most severe one wins
pub fn implied_result<'a, I>(outcomes: I) -> Option<ResultCode>
where
    I: IntoIterator<Item = &'a Outcome>,
{
    ResultCode::worst_of(outcomes.into_iter().map(result_code))
}
