// Domain values fed into the scenario report compiler

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of the scenario being reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDetails {
    /// Scenario name (e.g., "Checkout")
    pub name: String,

    /// Story or feature the scenario belongs to
    pub category: String,

    /// Path of the source file declaring the scenario
    pub location: String,
}

impl ScenarioDetails {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            location: location.into(),
        }
    }
}

/// A reportable unit of work nested inside a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetails {
    pub name: String,
}

impl ActivityDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Terminal result of a scenario or an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "error", rename_all = "camelCase")]
pub enum Outcome {
    Successful,
    Compromised(RawError),
    FailedWithError(RawError),
    FailedWithAssertionError(RawError),
    Skipped,
    Ignored,
    ImplementationPending,
}

impl Outcome {
    /// The error payload carried by failure-like outcomes
    pub fn error(&self) -> Option<&RawError> {
        match self {
            Outcome::Compromised(error)
            | Outcome::FailedWithError(error)
            | Outcome::FailedWithAssertionError(error) => Some(error),
            Outcome::Successful
            | Outcome::Skipped
            | Outcome::Ignored
            | Outcome::ImplementationPending => None,
        }
    }
}

/// Name of the fixed tag that marks a scenario as manual
pub const MANUAL_TAG_NAME: &str = "Manual";

/// Classification label attached to a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedTag", into = "SerializedTag")]
pub enum Tag {
    Manual,
    Capability(String),
    Feature(String),
    Theme(String),
    Issue(String),
    Browser(String),
    Context(String),
    Generic { tag_type: String, name: String },
}

impl Tag {
    /// Type discriminator used in the serialized form
    pub fn type_name(&self) -> &str {
        match self {
            Tag::Manual => "manual",
            Tag::Capability(_) => "capability",
            Tag::Feature(_) => "feature",
            Tag::Theme(_) => "theme",
            Tag::Issue(_) => "issue",
            Tag::Browser(_) => "browser",
            Tag::Context(_) => "context",
            Tag::Generic { tag_type, .. } => tag_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Manual => MANUAL_TAG_NAME,
            Tag::Capability(name)
            | Tag::Feature(name)
            | Tag::Theme(name)
            | Tag::Issue(name)
            | Tag::Browser(name)
            | Tag::Context(name)
            | Tag::Generic { name, .. } => name,
        }
    }

    /// Serialized form with the tag's own, uncomposed name
    pub fn to_serialized(&self) -> SerializedTag {
        SerializedTag::new(self.type_name(), self.name())
    }
}

/// `{type, name}` pair as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTag {
    #[serde(rename = "type")]
    pub tag_type: String,
    pub name: String,
}

impl SerializedTag {
    pub fn new(tag_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            name: name.into(),
        }
    }
}

impl From<SerializedTag> for Tag {
    fn from(tag: SerializedTag) -> Self {
        match tag.tag_type.as_str() {
            "manual" => Tag::Manual,
            "capability" => Tag::Capability(tag.name),
            "feature" => Tag::Feature(tag.name),
            "theme" => Tag::Theme(tag.name),
            "issue" => Tag::Issue(tag.name),
            "browser" => Tag::Browser(tag.name),
            "context" => Tag::Context(tag.name),
            _ => Tag::Generic {
                tag_type: tag.tag_type,
                name: tag.name,
            },
        }
    }
}

impl From<Tag> for SerializedTag {
    fn from(tag: Tag) -> Self {
        tag.to_serialized()
    }
}

/// Failure information in whatever shape the test runner produced it.
///
/// Values read from an event stream always arrive as `Opaque` JSON; the
/// structured variants are for adapters that already know what they hold.
/// Every shape is reduced to an [`ErrorRecord`](crate::report::ErrorRecord)
/// by [`normalize`](crate::report::error_parser::normalize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawError {
    /// Generic error with a type label
    Error {
        error_type: String,
        message: String,
        stack: Option<String>,
    },

    /// Assertion failure with optional expected/actual values
    Assertion {
        message: String,
        expected: Option<Value>,
        actual: Option<Value>,
        stack: Option<String>,
    },

    /// Anything else (thrown strings, partial objects, null)
    Opaque(Value),
}

impl RawError {
    pub fn error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        RawError::Error {
            error_type: error_type.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn assertion(
        message: impl Into<String>,
        expected: impl Into<Value>,
        actual: impl Into<Value>,
    ) -> Self {
        RawError::Assertion {
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            stack: None,
        }
    }

    /// Attach stack text; no effect on opaque values
    pub fn with_stack(mut self, trace: impl Into<String>) -> Self {
        match &mut self {
            RawError::Error { stack, .. } | RawError::Assertion { stack, .. } => {
                *stack = Some(trace.into());
            }
            RawError::Opaque(_) => {}
        }
        self
    }

    /// Capture a Rust error: the type label is the short type name and the
    /// stack text lists the `source()` chain.
    pub fn from_std<E: std::error::Error + 'static>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        RawError::Error {
            error_type: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
            stack: if causes.is_empty() {
                None
            } else {
                Some(causes.join("\n"))
            },
        }
    }
}

impl From<Value> for RawError {
    fn from(value: Value) -> Self {
        RawError::Opaque(value)
    }
}

impl From<RawError> for Value {
    fn from(error: RawError) -> Self {
        match error {
            RawError::Error {
                error_type,
                message,
                stack,
            } => {
                let mut map = serde_json::Map::new();
                map.insert("name".to_string(), Value::String(error_type));
                map.insert("message".to_string(), Value::String(message));
                if let Some(stack) = stack {
                    map.insert("stack".to_string(), Value::String(stack));
                }
                Value::Object(map)
            }
            RawError::Assertion {
                message,
                expected,
                actual,
                stack,
            } => {
                let mut map = serde_json::Map::new();
                map.insert(
                    "name".to_string(),
                    Value::String("AssertionError".to_string()),
                );
                map.insert("message".to_string(), Value::String(message));
                if let Some(expected) = expected {
                    map.insert("expected".to_string(), expected);
                }
                if let Some(actual) = actual {
                    map.insert("actual".to_string(), actual);
                }
                if let Some(stack) = stack {
                    map.insert("stack".to_string(), Value::String(stack));
                }
                Value::Object(map)
            }
            RawError::Opaque(value) => value,
        }
    }
}

/// "std::io::error::Error" -> "Error", "my::Wrapper<u8>" -> "Wrapper"
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
