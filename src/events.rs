//! Domain events and their application to a scenario report.
//!
//! Events arrive in the order the test runner produced them. On the wire each
//! event is a JSON object tagged by `type`, one per line:
//!
//! ```json
//! {"type":"scenarioStarted","timestamp":1700000000000}
//! {"type":"activityStarted","activity":{"name":"Add to cart"},"timestamp":1700000000000}
//! {"type":"activityFinished","outcome":{"kind":"successful"},"timestamp":1700000000010}
//! {"type":"scenarioFinished","timestamp":1700000000020,"outcome":{"kind":"successful"}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ActivityDetails, Outcome, ScenarioDetails, Tag};
use crate::report::{CompilerOptions, ReportError, ReportResult, ScenarioReport, ScenarioReportCompiler};

/// One lifecycle event of a scenario execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DomainEvent {
    ScenarioStarted {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: DateTime<Utc>,
    },
    ExecutedBy {
        name: String,
    },
    Tagged {
        tag: Tag,
    },
    ActivityStarted {
        activity: ActivityDetails,
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: DateTime<Utc>,
    },
    ActivityFinished {
        outcome: Outcome,
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: DateTime<Utc>,
    },
    ArtifactCaptured {
        name: String,
    },
    BackgroundDetected {
        name: String,
        description: String,
    },
    DescriptionDetected {
        description: String,
    },
    ScenarioFinished {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: DateTime<Utc>,
        outcome: Outcome,
    },
}

impl ScenarioReportCompiler {
    /// Dispatch one event to the matching operation
    pub fn apply(&mut self, event: DomainEvent) -> ReportResult<&mut Self> {
        match event {
            DomainEvent::ScenarioStarted { timestamp } => self.scenario_started(timestamp),
            DomainEvent::ExecutedBy { name } => self.executed_by(name),
            DomainEvent::Tagged { tag } => self.tagged(tag),
            DomainEvent::ActivityStarted {
                activity,
                timestamp,
            } => self.activity_started(activity, timestamp),
            DomainEvent::ActivityFinished { outcome, timestamp } => {
                self.activity_finished(outcome, timestamp)
            }
            DomainEvent::ArtifactCaptured { name } => self.artifact_captured(name),
            DomainEvent::BackgroundDetected { name, description } => {
                self.background_detected(name, description)
            }
            DomainEvent::DescriptionDetected { description } => {
                self.description_detected(description)
            }
            DomainEvent::ScenarioFinished { timestamp, outcome } => {
                self.scenario_finished(timestamp, outcome)
            }
        }
    }
}

/// Fold a whole event stream into a report
pub fn compile<I>(
    details: ScenarioDetails,
    options: CompilerOptions,
    events: I,
) -> ReportResult<ScenarioReport>
where
    I: IntoIterator<Item = DomainEvent>,
{
    let mut compiler = ScenarioReportCompiler::with_options(details, options);
    for event in events {
        compiler.apply(event)?;
    }
    Ok(compiler.snapshot())
}

/// Parse JSON-lines events; blank lines are skipped
pub fn parse_event_lines(text: &str) -> ReportResult<Vec<DomainEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ReportError::InvalidEvent {
                line: index + 1,
                source,
            })
        })
        .collect()
}
