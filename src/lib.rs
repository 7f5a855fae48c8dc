//! Scenario Report - compiles nested execution reports for test scenarios.
//!
//! This crate provides:
//! - A scenario report compiler driven by lifecycle events (started, activity
//!   started/finished, tagged, artifact captured, finished)
//! - Outcome classification with a severity ranking for rolling up results
//! - Tag classification that builds theme/capability/feature names
//! - Content-based scenario and story identifiers
//! - Normalization of arbitrary error payloads into one record shape
//! - Report sinks for writing compiled reports as JSON
//!
//! # Example
//!
//! ```rust,no_run
//! use scenario_report::events::{compile, parse_event_lines};
//! use scenario_report::model::ScenarioDetails;
//! use scenario_report::report::CompilerOptions;
//! use scenario_report::sink::{JsonFileSink, ReportSink};
//!
//! let events = parse_event_lines(&std::fs::read_to_string("checkout.jsonl").unwrap()).unwrap();
//! let details = ScenarioDetails::new("Checkout", "Shopping", "features/checkout.feature");
//! let report = compile(details, CompilerOptions::default(), events).unwrap();
//! JsonFileSink::new("./reports").write(&report).unwrap();
//! ```

pub mod classify;
pub mod config;
pub mod events;
pub mod model;
pub mod report;
pub mod sink;

// Re-export model types
pub use model::{ActivityDetails, Outcome, RawError, ScenarioDetails, SerializedTag, Tag};

// Re-export report types and the compiler
pub use report::{
    CompilerOptions, ErrorRecord, Identifier, ReportError, ReportResult, ResultCode,
    ScenarioReport, ScenarioReportCompiler, ScenarioState, TestStep, derive_from,
};

// Re-export event stream handling
pub use events::{DomainEvent, compile, parse_event_lines};

// Re-export sinks
pub use sink::{JsonFileSink, JsonWriterSink, MemorySink, ReportSink};
