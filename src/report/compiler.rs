//! Scenario report compiler.
//!
//! Consumes the lifecycle events of one scenario and accumulates them into a
//! report tree. Nodes live in an arena owned by the compiler; the activity
//! stack holds arena ids, so the open chain of activities never borrows into
//! the tree. [`ScenarioReportCompiler::snapshot`] assembles a detached copy.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use scenario_report::model::{ActivityDetails, Outcome, ScenarioDetails};
//! use scenario_report::report::{ResultCode, ScenarioReportCompiler};
//!
//! let t0 = Utc::now();
//! let mut compiler = ScenarioReportCompiler::new(ScenarioDetails::new(
//!     "Checkout",
//!     "Shopping",
//!     "features/checkout.feature",
//! ));
//! compiler
//!     .scenario_started(t0)?
//!     .activity_started(ActivityDetails::new("Add to cart"), t0)?
//!     .activity_finished(Outcome::Successful, t0 + Duration::milliseconds(5))?
//!     .scenario_finished(t0 + Duration::milliseconds(8), Outcome::Successful)?;
//!
//! let report = compiler.snapshot();
//! assert_eq!(report.result, Some(ResultCode::Success));
//! assert_eq!(report.duration, Some(8));
//! # Ok::<(), scenario_report::report::ReportError>(())
//! ```

use chrono::{DateTime, Utc};

use super::id::{Identifier, derive_from};
use super::stack::ActivityStack;
use super::types::{
    ErrorRecord, ReportError, ReportResult, ResultCode, ScenarioReport, ScenarioState, Screenshot,
    TestStep, UserStory,
};
use crate::classify::{self, TagEffect};
use crate::config;
use crate::model::{ActivityDetails, Outcome, ScenarioDetails, SerializedTag, Tag};

/// Options that shape the compiled report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Label written to `userStory.type`
    pub story_type: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            story_type: config::get().report.story_type.clone(),
        }
    }
}

impl CompilerOptions {
    pub fn story_type(mut self, story_type: impl Into<String>) -> Self {
        self.story_type = story_type.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// Arena entry shared by the root and every activity
#[derive(Debug, Clone)]
struct ReportNode {
    description: String,
    start_time: Option<DateTime<Utc>>,
    duration: Option<u64>,
    result: Option<ResultCode>,
    exception: Option<ErrorRecord>,
    screenshots: Vec<Screenshot>,
    children: Vec<NodeId>,
}

impl ReportNode {
    fn new(description: String, start_time: Option<DateTime<Utc>>) -> Self {
        Self {
            description,
            start_time,
            duration: None,
            result: None,
            exception: None,
            screenshots: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Builds the report for a single scenario, one event at a time
#[derive(Debug, Clone)]
pub struct ScenarioReportCompiler {
    details: ScenarioDetails,
    id: Identifier,
    user_story: UserStory,
    state: ScenarioState,
    nodes: Vec<ReportNode>,
    activities: ActivityStack<NodeId>,
    manual: bool,
    tags: Vec<SerializedTag>,
    issues: Vec<String>,
    test_source: Option<String>,
    context: Option<String>,
    background_title: Option<String>,
    background_description: Option<String>,
    description: Option<String>,
    feature_tag: Option<SerializedTag>,
}

impl ScenarioReportCompiler {
    /// Create a compiler with options taken from the environment
    pub fn new(details: ScenarioDetails) -> Self {
        Self::with_options(details, CompilerOptions::default())
    }

    pub fn with_options(details: ScenarioDetails, options: CompilerOptions) -> Self {
        let id = derive_from([details.category.as_str(), details.name.as_str()]);
        let user_story = UserStory {
            id: derive_from([details.category.as_str()]),
            story_name: details.category.clone(),
            path: details.location.clone(),
            story_type: options.story_type,
        };

        let mut activities = ActivityStack::new();
        activities.push(ROOT);

        Self {
            nodes: vec![ReportNode::new(details.name.clone(), None)],
            details,
            id,
            user_story,
            state: ScenarioState::NotStarted,
            activities,
            manual: false,
            tags: Vec::new(),
            issues: Vec::new(),
            test_source: None,
            context: None,
            background_title: None,
            background_description: None,
            description: None,
            feature_tag: None,
        }
    }

    pub fn details(&self) -> &ScenarioDetails {
        &self.details
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// Number of activities started but not yet finished
    pub fn open_activities(&self) -> usize {
        self.activities.len().saturating_sub(1)
    }

    pub fn scenario_started(&mut self, time: DateTime<Utc>) -> ReportResult<&mut Self> {
        if self.state != ScenarioState::NotStarted {
            return Err(self.reject(ReportError::AlreadyStarted, "scenario_started"));
        }

        tracing::debug!(scenario = %self.details.name, "scenario started");
        self.nodes[ROOT.0].start_time = Some(time);
        self.state = ScenarioState::InProgress;
        Ok(self)
    }

    /// Record the test runner that executed the scenario; later calls overwrite
    pub fn executed_by(&mut self, test_runner: impl Into<String>) -> ReportResult<&mut Self> {
        self.test_source = Some(test_runner.into());
        Ok(self)
    }

    pub fn tagged(&mut self, tag: Tag) -> ReportResult<&mut Self> {
        let classification = classify::tag::classify(&tag, &self.tags);
        tracing::debug!(
            tag_type = %classification.serialized.tag_type,
            name = %classification.serialized.name,
            "scenario tagged"
        );

        match classification.effect {
            TagEffect::None => {}
            TagEffect::MarkManual => self.manual = true,
            TagEffect::RecordFeature(feature) => self.feature_tag = Some(feature),
            TagEffect::RecordIssue(issue) => self.issues.push(issue),
            TagEffect::DefaultContext(browser) => {
                if self.context.is_none() {
                    self.context = Some(browser);
                }
            }
            TagEffect::SetContext(context) => self.context = Some(context),
        }

        self.tags.push(classification.serialized);
        Ok(self)
    }

    pub fn activity_started(
        &mut self,
        activity: ActivityDetails,
        time: DateTime<Utc>,
    ) -> ReportResult<&mut Self> {
        self.ensure_in_progress("activity_started")?;

        let parent = *self.activities.top()?;
        let id = NodeId(self.nodes.len());

        tracing::debug!(activity = %activity.name, depth = self.activities.len(), "activity started");
        self.nodes.push(ReportNode::new(activity.name, Some(time)));
        self.nodes[parent.0].children.push(id);
        self.activities.push(id);
        Ok(self)
    }

    pub fn activity_finished(
        &mut self,
        outcome: Outcome,
        time: DateTime<Utc>,
    ) -> ReportResult<&mut Self> {
        self.ensure_in_progress("activity_finished")?;
        if self.activities.len() <= 1 {
            return Err(self.reject(ReportError::NoOpenActivity, "activity_finished"));
        }

        let id = *self.activities.top()?;
        let duration = match self.nodes[id.0].start_time {
            Some(started) => elapsed(started, time)
                .map_err(|err| self.reject(err, "activity_finished"))?,
            None => 0,
        };
        let (result, exception) = classify::outcome::classify(&outcome);

        self.activities.pop()?;
        let node = &mut self.nodes[id.0];
        tracing::debug!(activity = %node.description, %result, duration, "activity finished");
        node.result = Some(result);
        node.exception = exception;
        node.duration = Some(duration);
        Ok(self)
    }

    /// Attach an artifact to the node most recently started or finished
    pub fn artifact_captured(&mut self, name: impl Into<String>) -> ReportResult<&mut Self> {
        let id = *self
            .activities
            .most_recently_touched()
            .ok_or(ReportError::EmptyStack)?;
        self.nodes[id.0].screenshots.push(Screenshot {
            screenshot: name.into(),
        });
        Ok(self)
    }

    pub fn background_detected(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ReportResult<&mut Self> {
        self.background_title = Some(name.into());
        self.background_description = Some(description.into());
        Ok(self)
    }

    pub fn description_detected(&mut self, description: impl Into<String>) -> ReportResult<&mut Self> {
        self.description = Some(description.into());
        Ok(self)
    }

    pub fn scenario_finished(
        &mut self,
        time: DateTime<Utc>,
        outcome: Outcome,
    ) -> ReportResult<&mut Self> {
        self.ensure_in_progress("scenario_finished")?;

        let open = self.open_activities();
        if open > 0 {
            return Err(self.reject(ReportError::OpenActivities { open }, "scenario_finished"));
        }

        let duration = match self.nodes[ROOT.0].start_time {
            Some(started) => elapsed(started, time)
                .map_err(|err| self.reject(err, "scenario_finished"))?,
            None => 0,
        };
        let (result, exception) = classify::outcome::classify(&outcome);

        let root = &mut self.nodes[ROOT.0];
        root.duration = Some(duration);
        root.result = Some(result);
        root.exception = exception;
        self.state = ScenarioState::Finished;

        tracing::debug!(scenario = %self.details.name, %result, duration, "scenario finished");
        Ok(self)
    }

    /// Most severe result among the finished top-level activities
    pub fn implied_result(&self) -> Option<ResultCode> {
        ResultCode::worst_of(
            self.nodes[ROOT.0]
                .children
                .iter()
                .filter_map(|child| self.nodes[child.0].result),
        )
    }

    /// Detached copy of the report as it stands now
    pub fn snapshot(&self) -> ScenarioReport {
        let root = &self.nodes[ROOT.0];

        ScenarioReport {
            name: self.details.name.clone(),
            title: self.details.name.clone(),
            id: self.id.clone(),
            manual: self.manual,
            start_time: root.start_time,
            duration: root.duration,
            result: root.result,
            test_steps: root.children.iter().map(|id| self.build_step(*id)).collect(),
            screenshots: root.screenshots.clone(),
            tags: self.tags.clone(),
            user_story: self.user_story.clone(),
            issues: self.issues.clone(),
            test_source: self.test_source.clone(),
            context: self.context.clone(),
            background_title: self.background_title.clone(),
            background_description: self.background_description.clone(),
            description: self.description.clone(),
            test_failure_cause: root.exception.clone(),
            feature_tag: self.feature_tag.clone(),
        }
    }

    fn build_step(&self, id: NodeId) -> TestStep {
        let node = &self.nodes[id.0];
        TestStep {
            description: node.description.clone(),
            start_time: node.start_time.unwrap_or_default(),
            duration: node.duration,
            result: node.result,
            exception: node.exception.clone(),
            screenshots: node.screenshots.clone(),
            children: node.children.iter().map(|child| self.build_step(*child)).collect(),
        }
    }

    fn ensure_in_progress(&self, operation: &str) -> ReportResult<()> {
        match self.state {
            ScenarioState::InProgress => Ok(()),
            ScenarioState::NotStarted => Err(self.reject(ReportError::NotStarted, operation)),
            ScenarioState::Finished => Err(self.reject(ReportError::AlreadyFinished, operation)),
        }
    }

    fn reject(&self, err: ReportError, operation: &str) -> ReportError {
        tracing::warn!(
            scenario = %self.details.name,
            state = %self.state,
            operation,
            error = %err,
            "rejected scenario event"
        );
        err
    }
}

/// Milliseconds from `started` to `finished`
fn elapsed(started: DateTime<Utc>, finished: DateTime<Utc>) -> ReportResult<u64> {
    let millis = (finished - started).num_milliseconds();
    u64::try_from(millis).map_err(|_| ReportError::ClockSkew { started, finished })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawError;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap()
    }

    fn compiler() -> ScenarioReportCompiler {
        ScenarioReportCompiler::with_options(
            ScenarioDetails::new("Checkout", "Shopping", "features/checkout.feature"),
            CompilerOptions {
                story_type: "feature".to_string(),
            },
        )
    }

    #[test]
    fn test_single_activity_scenario() {
        let mut c = compiler();
        c.scenario_started(t(0))
            .unwrap()
            .activity_started(ActivityDetails::new("Add to cart"), t(0))
            .unwrap()
            .activity_finished(Outcome::Successful, t(10))
            .unwrap()
            .scenario_finished(t(25), Outcome::Successful)
            .unwrap();

        let report = c.snapshot();
        assert_eq!(report.test_steps.len(), 1);
        assert_eq!(report.test_steps[0].description, "Add to cart");
        assert_eq!(report.test_steps[0].result, Some(ResultCode::Success));
        assert_eq!(report.test_steps[0].duration, Some(10));
        assert_eq!(report.result, Some(ResultCode::Success));
        assert_eq!(report.duration, Some(25));
        assert_eq!(c.state(), ScenarioState::Finished);
    }

    #[test]
    fn test_nested_activities_form_a_tree() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("outer"), t(1)).unwrap();
        c.activity_started(ActivityDetails::new("inner 1"), t(2)).unwrap();
        c.activity_finished(Outcome::Successful, t(3)).unwrap();
        c.activity_started(ActivityDetails::new("inner 2"), t(4)).unwrap();
        assert_eq!(c.open_activities(), 2);
        c.activity_finished(Outcome::Skipped, t(6)).unwrap();
        c.activity_finished(Outcome::Successful, t(9)).unwrap();

        let report = c.snapshot();
        let outer = &report.test_steps[0];
        assert_eq!(outer.duration, Some(8));
        assert_eq!(
            outer.children.iter().map(|s| s.description.as_str()).collect::<Vec<_>>(),
            vec!["inner 1", "inner 2"]
        );
        assert_eq!(outer.implied_result(), Some(ResultCode::Skipped));
    }

    #[test]
    fn test_unmatched_finish_is_rejected() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        assert!(matches!(
            c.activity_finished(Outcome::Successful, t(1)),
            Err(ReportError::NoOpenActivity)
        ));
    }

    #[test]
    fn test_finish_with_open_activities_is_rejected() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("left open"), t(1)).unwrap();
        assert!(matches!(
            c.scenario_finished(t(2), Outcome::Successful),
            Err(ReportError::OpenActivities { open: 1 })
        ));
        assert_eq!(c.state(), ScenarioState::InProgress);
    }

    #[test]
    fn test_state_transitions_are_enforced() {
        let mut c = compiler();
        assert!(matches!(
            c.activity_started(ActivityDetails::new("early"), t(0)),
            Err(ReportError::NotStarted)
        ));
        assert!(matches!(
            c.scenario_finished(t(0), Outcome::Successful),
            Err(ReportError::NotStarted)
        ));

        c.scenario_started(t(0)).unwrap();
        assert!(matches!(c.scenario_started(t(1)), Err(ReportError::AlreadyStarted)));

        c.scenario_finished(t(2), Outcome::Successful).unwrap();
        assert!(matches!(
            c.scenario_finished(t(3), Outcome::Successful),
            Err(ReportError::AlreadyFinished)
        ));
        assert!(matches!(
            c.activity_started(ActivityDetails::new("late"), t(3)),
            Err(ReportError::AlreadyFinished)
        ));
        assert!(matches!(c.scenario_started(t(4)), Err(ReportError::AlreadyStarted)));
    }

    #[test]
    fn test_clock_skew_is_rejected_without_mutation() {
        let mut c = compiler();
        c.scenario_started(t(100)).unwrap();
        c.activity_started(ActivityDetails::new("step"), t(100)).unwrap();
        assert!(matches!(
            c.activity_finished(Outcome::Successful, t(50)),
            Err(ReportError::ClockSkew { .. })
        ));
        assert_eq!(c.open_activities(), 1);

        c.activity_finished(Outcome::Successful, t(150)).unwrap();
        assert_eq!(c.snapshot().test_steps[0].duration, Some(50));
    }

    #[test]
    fn test_artifact_after_finish_goes_to_closed_activity() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("A"), t(0)).unwrap();
        c.activity_finished(Outcome::Successful, t(1)).unwrap();
        c.artifact_captured("shot1").unwrap();

        let report = c.snapshot();
        assert_eq!(
            report.test_steps[0].screenshots,
            vec![Screenshot {
                screenshot: "shot1".to_string()
            }]
        );
    }

    #[test]
    fn test_artifact_during_activity_goes_to_open_activity() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("outer"), t(0)).unwrap();
        c.activity_started(ActivityDetails::new("inner"), t(1)).unwrap();
        c.artifact_captured("during inner").unwrap();
        c.activity_finished(Outcome::Successful, t(2)).unwrap();
        c.activity_finished(Outcome::Successful, t(3)).unwrap();
        c.artifact_captured("after outer").unwrap();

        let report = c.snapshot();
        let outer = &report.test_steps[0];
        assert_eq!(outer.screenshots[0].screenshot, "after outer");
        assert_eq!(outer.children[0].screenshots[0].screenshot, "during inner");
    }

    #[test]
    fn test_artifact_before_any_activity_goes_to_root() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.artifact_captured("before-any-step.png").unwrap();
        c.scenario_finished(t(1), Outcome::Successful).unwrap();

        let report = c.snapshot();
        assert!(report.test_steps.is_empty());
        assert_eq!(
            report.screenshots,
            vec![Screenshot {
                screenshot: "before-any-step.png".to_string()
            }]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["screenshots"][0]["screenshot"], "before-any-step.png");
    }

    #[test]
    fn test_failure_records_error_on_step_and_root() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("Pay"), t(0)).unwrap();
        c.activity_finished(
            Outcome::FailedWithAssertionError(RawError::assertion("total differs", "10.00", "12.00")),
            t(4),
        )
        .unwrap();
        c.scenario_finished(
            t(5),
            Outcome::FailedWithAssertionError(RawError::assertion("total differs", "10.00", "12.00")),
        )
        .unwrap();

        let report = c.snapshot();
        let step = &report.test_steps[0];
        assert_eq!(step.result, Some(ResultCode::Failure));
        assert_eq!(step.exception.as_ref().unwrap().expected.as_deref(), Some("10.00"));
        assert_eq!(report.test_failure_cause.unwrap().error_type, "AssertionError");
    }

    #[test]
    fn test_root_result_is_independent_of_activity_results() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("broken"), t(0)).unwrap();
        c.activity_finished(Outcome::FailedWithError(RawError::error("Error", "boom")), t(1))
            .unwrap();
        c.scenario_finished(t(2), Outcome::Successful).unwrap();

        assert_eq!(c.snapshot().result, Some(ResultCode::Success));
        assert_eq!(c.implied_result(), Some(ResultCode::Error));
    }

    #[test]
    fn test_tags_shape_the_root() {
        let mut c = compiler();
        c.tagged(Tag::Theme("Online".to_string()))
            .unwrap()
            .tagged(Tag::Capability("Search".to_string()))
            .unwrap()
            .tagged(Tag::Feature("Filters".to_string()))
            .unwrap()
            .tagged(Tag::Issue("SHOP-1".to_string()))
            .unwrap()
            .tagged(Tag::Issue("SHOP-2".to_string()))
            .unwrap()
            .tagged(Tag::Context("mobile".to_string()))
            .unwrap()
            .tagged(Tag::Browser("firefox".to_string()))
            .unwrap();

        let report = c.snapshot();
        assert_eq!(report.tags[1].name, "Online/Search");
        assert_eq!(report.tags[2].name, "Online/Search/Filters");
        assert_eq!(report.feature_tag, Some(SerializedTag::new("feature", "Filters")));
        assert_eq!(report.issues, vec!["SHOP-1", "SHOP-2"]);
        assert_eq!(report.context.as_deref(), Some("mobile"));
        assert!(!report.manual);
    }

    #[test]
    fn test_browser_sets_context_until_explicit_context() {
        let mut c = compiler();
        c.tagged(Tag::Browser("chrome".to_string())).unwrap();
        assert_eq!(c.snapshot().context.as_deref(), Some("chrome"));
        c.tagged(Tag::Browser("firefox".to_string())).unwrap();
        assert_eq!(c.snapshot().context.as_deref(), Some("chrome"));
        c.tagged(Tag::Context("ios".to_string())).unwrap();
        assert_eq!(c.snapshot().context.as_deref(), Some("ios"));
    }

    #[test]
    fn test_manual_tag_at_any_point() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.scenario_finished(t(1), Outcome::Successful).unwrap();
        c.tagged(Tag::Manual).unwrap();

        let report = c.snapshot();
        assert!(report.manual);
        assert_eq!(report.tags, vec![SerializedTag::new("manual", "Manual")]);
    }

    #[test]
    fn test_identity_fields() {
        let mut c = compiler();
        c.executed_by("cucumber").unwrap();
        c.background_detected("Logged in", "Given a signed-in shopper").unwrap();
        c.description_detected("Paying for a basket").unwrap();

        let report = c.snapshot();
        assert_eq!(report.name, "Checkout");
        assert_eq!(report.title, "Checkout");
        assert_eq!(report.id, derive_from(["Shopping", "Checkout"]));
        assert_eq!(report.user_story.id, derive_from(["Shopping"]));
        assert_eq!(report.user_story.story_name, "Shopping");
        assert_eq!(report.user_story.path, "features/checkout.feature");
        assert_eq!(report.user_story.story_type, "feature");
        assert_eq!(report.test_source.as_deref(), Some("cucumber"));
        assert_eq!(report.background_title.as_deref(), Some("Logged in"));
        assert_eq!(report.description.as_deref(), Some("Paying for a basket"));
    }

    #[test]
    fn test_snapshot_is_detached_from_live_state() {
        let mut c = compiler();
        c.scenario_started(t(0)).unwrap();
        c.activity_started(ActivityDetails::new("first"), t(0)).unwrap();

        let before = c.snapshot();
        assert_eq!(before.test_steps[0].result, None);
        assert_eq!(before.test_steps[0].duration, None);

        c.activity_finished(Outcome::Successful, t(1)).unwrap();
        c.activity_started(ActivityDetails::new("second"), t(1)).unwrap();

        assert_eq!(before.test_steps.len(), 1);
        assert_eq!(before.test_steps[0].result, None);
        assert_eq!(c.snapshot().test_steps.len(), 2);
    }

    #[test]
    fn test_zero_length_activity() {
        let mut c = compiler();
        let now = t(0);
        c.scenario_started(now).unwrap();
        c.activity_started(ActivityDetails::new("instant"), now).unwrap();
        c.activity_finished(Outcome::ImplementationPending, now + Duration::zero())
            .unwrap();
        let step = &c.snapshot().test_steps[0];
        assert_eq!(step.duration, Some(0));
        assert_eq!(step.result, Some(ResultCode::Pending));
    }
}
