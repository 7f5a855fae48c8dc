// Core types for compiled scenario reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::Identifier;
use crate::model::SerializedTag;

/// Result code recorded against a report node.
///
/// Variants are declared in ascending severity, so `Ord` is the severity
/// ranking: the greatest code among several results is the one that wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    Pending,
    Ignored,
    Skipped,
    Compromised,
    Failure,
    Error,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::Pending => "PENDING",
            ResultCode::Ignored => "IGNORED",
            ResultCode::Skipped => "SKIPPED",
            ResultCode::Compromised => "COMPROMISED",
            ResultCode::Failure => "FAILURE",
            ResultCode::Error => "ERROR",
        }
    }

    /// The most severe of the given results, or `None` when there are none
    pub fn worst_of<I>(results: I) -> Option<ResultCode>
    where
        I: IntoIterator<Item = ResultCode>,
    {
        results.into_iter().max()
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure information attached to a report node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Type or category label (e.g., "AssertionError"); "Unknown" for malformed input
    pub error_type: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// Reference to an artifact captured during an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub screenshot: String,
}

/// One activity in the compiled report, with its nested activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub description: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,

    /// Milliseconds; absent while the activity is still open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ErrorRecord>,

    pub screenshots: Vec<Screenshot>,

    pub children: Vec<TestStep>,
}

impl TestStep {
    /// Most severe result among the direct children, if any have finished
    pub fn implied_result(&self) -> Option<ResultCode> {
        ResultCode::worst_of(self.children.iter().filter_map(|child| child.result))
    }
}

/// Story the scenario belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: Identifier,
    pub story_name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub story_type: String,
}

/// Immutable snapshot of a compiled scenario report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub title: String,
    pub id: Identifier,
    pub manual: bool,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultCode>,

    pub test_steps: Vec<TestStep>,

    /// Artifacts captured before any activity started
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,

    pub tags: Vec<SerializedTag>,
    pub user_story: UserStory,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,

    /// Name of the test runner that executed the scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_failure_cause: Option<ErrorRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_tag: Option<SerializedTag>,
}

impl ScenarioReport {
    /// Most severe result among the top-level activities
    pub fn implied_result(&self) -> Option<ResultCode> {
        ResultCode::worst_of(self.test_steps.iter().filter_map(|step| step.result))
    }
}

/// Lifecycle of a scenario report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    NotStarted,
    InProgress,
    Finished,
}

impl std::fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioState::NotStarted => f.write_str("not started"),
            ScenarioState::InProgress => f.write_str("in progress"),
            ScenarioState::Finished => f.write_str("finished"),
        }
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Error types for report operations
#[derive(Debug)]
pub enum ReportError {
    /// `scenario_started` received twice
    AlreadyStarted,

    /// Event requires a started scenario
    NotStarted,

    /// Event received after the scenario finished
    AlreadyFinished,

    /// `activity_finished` with no open activity
    NoOpenActivity,

    /// `scenario_finished` while activities are still open
    OpenActivities { open: usize },

    /// Pop or peek on an empty activity stack
    EmptyStack,

    /// Finish time earlier than the matching start time
    ClockSkew {
        started: DateTime<Utc>,
        finished: DateTime<Utc>,
    },

    /// Event stream line that is not a valid domain event
    InvalidEvent {
        line: usize,
        source: serde_json::Error,
    },

    /// I/O error while writing a report
    Io(std::io::Error),

    /// Serialization error
    Serialization(serde_json::Error),
}

impl ReportError {
    /// Protocol errors raised by the compiler state machine
    pub fn is_state_error(&self) -> bool {
        !matches!(
            self,
            ReportError::InvalidEvent { .. } | ReportError::Io(_) | ReportError::Serialization(_)
        )
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::AlreadyStarted => write!(f, "State error: scenario has already started"),
            ReportError::NotStarted => write!(f, "State error: scenario has not started yet"),
            ReportError::AlreadyFinished => write!(f, "State error: scenario has already finished"),
            ReportError::NoOpenActivity => {
                write!(f, "State error: no open activity to finish")
            }
            ReportError::OpenActivities { open } => write!(
                f,
                "State error: scenario finished with {} activit{} still open",
                open,
                if *open == 1 { "y" } else { "ies" }
            ),
            ReportError::EmptyStack => write!(f, "State error: activity stack is empty"),
            ReportError::ClockSkew { started, finished } => write!(
                f,
                "State error: finished at {} before it started at {}",
                finished.to_rfc3339(),
                started.to_rfc3339()
            ),
            ReportError::InvalidEvent { line, source } => {
                write!(f, "Invalid event on line {}: {}", line, source)
            }
            ReportError::Io(err) => write!(f, "I/O error: {}", err),
            ReportError::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::InvalidEvent { source, .. } => Some(source),
            ReportError::Io(err) => Some(err),
            ReportError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ranking() {
        let ranked = [
            ResultCode::Success,
            ResultCode::Pending,
            ResultCode::Ignored,
            ResultCode::Skipped,
            ResultCode::Compromised,
            ResultCode::Failure,
            ResultCode::Error,
        ];
        for pair in ranked.windows(2) {
            assert!(pair[0] < pair[1], "{} should rank below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_worst_of() {
        assert_eq!(
            ResultCode::worst_of([ResultCode::Success, ResultCode::Skipped, ResultCode::Failure]),
            Some(ResultCode::Failure)
        );
        assert_eq!(
            ResultCode::worst_of([ResultCode::Compromised, ResultCode::Failure]),
            Some(ResultCode::Failure)
        );
        assert_eq!(ResultCode::worst_of(Vec::<ResultCode>::new()), None);
    }

    #[test]
    fn test_result_code_serializes_screaming() {
        assert_eq!(serde_json::to_string(&ResultCode::Compromised).unwrap(), "\"COMPROMISED\"");
        assert_eq!(ResultCode::Pending.to_string(), "PENDING");
    }

    #[test]
    fn test_state_error_classification() {
        assert!(ReportError::NoOpenActivity.is_state_error());
        assert!(ReportError::OpenActivities { open: 2 }.is_state_error());
        assert!(!ReportError::Io(std::io::Error::other("x")).is_state_error());
        assert_eq!(
            ReportError::OpenActivities { open: 1 }.to_string(),
            "State error: scenario finished with 1 activity still open"
        );
    }
}
