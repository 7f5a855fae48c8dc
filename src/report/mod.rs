pub mod compiler;
pub mod error_parser;
pub mod id;
pub mod stack;
pub mod types;

pub use compiler::{CompilerOptions, ScenarioReportCompiler};
pub use id::{Identifier, derive_from};
pub use stack::ActivityStack;
pub use types::{
    ErrorRecord, ReportError, ReportResult, ResultCode, ScenarioReport, ScenarioState, Screenshot,
    TestStep, UserStory,
};
