//! Workflow Data Model
//!
//! Typed representation of a workflow document as produced by the YAML
//! parser. A document is either a `module` (an ordered list of steps) or a
//! `flow` (an ordered list of module references).
//!
//! # Example YAML Format
//!
//! ```yaml
//! kind: module
//! name: subdomain-recon
//! triggers:
//!   - name: nightly
//!     on: cron
//!     schedule: "0 2 * * *"
//! steps:
//!   - name: fetch-subdomains
//!     type: bash
//!     command: subfinder -d {{target}} -o {{output}}/subs.txt
//!     decision:
//!       - condition: "{{subs_count}} == 0"
//!         next: notify-empty
//!   - name: probe-hosts
//!     type: http
//!     method: post
//!     url: https://probe.internal/api
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level document kind.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// A flow chains module references
    Flow,
    /// A module chains concrete steps
    #[default]
    Module,
}

/// A parsed workflow document; immutable for the duration of a compile pass.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub kind: WorkflowKind,

    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(default)]
    pub modules: Vec<Module>,

    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl WorkflowDocument {
    /// Creates a module-kind document from a list of steps.
    pub fn module(steps: Vec<Step>) -> Self {
        Self {
            kind: WorkflowKind::Module,
            steps,
            ..Self::default()
        }
    }

    /// Creates a flow-kind document from a list of module references.
    pub fn flow(modules: Vec<Module>) -> Self {
        Self {
            kind: WorkflowKind::Flow,
            modules,
            ..Self::default()
        }
    }

    /// Attaches triggers to the document.
    pub fn with_triggers(mut self, triggers: Vec<Trigger>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Number of top-level entities that become graph nodes for this kind.
    pub fn entity_count(&self) -> usize {
        match self.kind {
            WorkflowKind::Module => self.steps.len(),
            WorkflowKind::Flow => self.modules.len(),
        }
    }
}

/// One step in a module-kind workflow.
///
/// The common fields live here; everything that depends on `type` lives in
/// [`StepBody`].
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawStep")]
pub struct Step {
    pub name: String,
    pub timeout: Option<Value>,
    pub pre_condition: Option<String>,
    pub exports: Map<String, Value>,
    pub decision: Option<DecisionRule>,
    pub log: Option<String>,
    pub body: StepBody,
}

/// Per-type payload of a step, keyed by the YAML `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    Bash(CommandStep),
    RemoteBash(CommandStep),
    Container(CommandStep),
    Parallel(ParallelStep),
    ParallelSteps(ParallelStep),
    Function(FunctionStep),
    Foreach(ForeachStep),
    Http(HttpStep),
    Llm(LlmStep),
    Override(Map<String, Value>),
    /// A `type` this version does not know; drawn as a generic container
    Unknown { type_name: String },
}

impl StepBody {
    /// The `type` string this body was parsed from.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bash(_) => "bash",
            Self::RemoteBash(_) => "remote-bash",
            Self::Container(_) => "container",
            Self::Parallel(_) => "parallel",
            Self::ParallelSteps(_) => "parallel-steps",
            Self::Function(_) => "function",
            Self::Foreach(_) => "foreach",
            Self::Http(_) => "http",
            Self::Llm(_) => "llm",
            Self::Override(_) => "override",
            Self::Unknown { type_name } => type_name,
        }
    }

    fn from_payload(type_name: &str, payload: Value) -> Result<Self, serde_json::Error> {
        let body = match type_name {
            "bash" => Self::Bash(serde_json::from_value(payload)?),
            "remote-bash" => Self::RemoteBash(serde_json::from_value(payload)?),
            "container" => Self::Container(serde_json::from_value(payload)?),
            "parallel" => Self::Parallel(serde_json::from_value(payload)?),
            "parallel-steps" => Self::ParallelSteps(serde_json::from_value(payload)?),
            "function" => Self::Function(serde_json::from_value(payload)?),
            "foreach" => Self::Foreach(serde_json::from_value(payload)?),
            "http" => Self::Http(serde_json::from_value(payload)?),
            "llm" => Self::Llm(serde_json::from_value(payload)?),
            "override" => match payload {
                Value::Object(map) => Self::Override(map),
                _ => Self::Override(Map::new()),
            },
            other => Self::Unknown {
                type_name: other.to_string(),
            },
        };
        Ok(body)
    }
}

/// Wire shape of a step before its payload is split out by `type`.
#[derive(Deserialize)]
struct RawStep {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    step_type: Option<String>,
    #[serde(default)]
    timeout: Option<Value>,
    #[serde(default)]
    pre_condition: Option<String>,
    #[serde(default)]
    exports: Map<String, Value>,
    #[serde(default)]
    decision: Option<DecisionRule>,
    #[serde(default)]
    log: Option<String>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl TryFrom<RawStep> for Step {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let type_name = raw.step_type.unwrap_or_default();
        let body = StepBody::from_payload(type_name.trim(), Value::Object(raw.payload))
            .map_err(|e| format!("step '{}' ({}): {}", raw.name, type_name, e))?;

        Ok(Self {
            name: raw.name.trim().to_string(),
            timeout: raw.timeout,
            pre_condition: raw.pre_condition,
            exports: raw.exports,
            decision: raw.decision,
            log: raw.log,
            body,
        })
    }
}

impl Step {
    /// Creates a step with the given name and body and no optional fields.
    pub fn new(name: impl Into<String>, body: StepBody) -> Self {
        Self {
            name: name.into().trim().to_string(),
            timeout: None,
            pre_condition: None,
            exports: Map::new(),
            decision: None,
            log: None,
            body,
        }
    }

    /// Creates a `bash` step running a single command.
    ///
    /// # Example
    ///
    /// ```
    /// use flowcanvas::workflow::Step;
    ///
    /// let step = Step::bash("enum", "subfinder -d example.com");
    /// assert_eq!(step.body.type_name(), "bash");
    /// ```
    pub fn bash(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(
            name,
            StepBody::Bash(CommandStep {
                command: Some(command.into()),
                ..CommandStep::default()
            }),
        )
    }

    /// Attaches a decision rule.
    pub fn with_decision(mut self, decision: DecisionRule) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Returns nested steps for `parallel`/`parallel-steps`/`foreach`.
    pub fn children(&self) -> Vec<&Step> {
        match &self.body {
            StepBody::Parallel(p) | StepBody::ParallelSteps(p) => p.parallel_steps.iter().collect(),
            StepBody::Foreach(f) => f.step.iter().map(|s| s.as_ref()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Payload shared by `bash`, `remote-bash` and `container` steps.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CommandStep {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub parallel_commands: Vec<String>,
    #[serde(default)]
    pub speed_args: Option<String>,
    #[serde(default)]
    pub config_args: Option<String>,
    #[serde(default)]
    pub input_args: Option<String>,
    #[serde(default)]
    pub output_args: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ParallelStep {
    #[serde(default)]
    pub parallel_steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FunctionStep {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub parallel_functions: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ForeachStep {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default)]
    pub threads: Option<Value>,
    #[serde(default)]
    pub step: Option<Box<Step>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HttpStep {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default)]
    pub request_body: Option<Value>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LlmStep {
    #[serde(default)]
    pub messages: Vec<LlmMessage>,
    #[serde(default)]
    pub is_embedding: bool,
    #[serde(default)]
    pub embedding_input: Vec<String>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub tool_choice: Option<Value>,
    #[serde(default)]
    pub llm_config: Option<Value>,
}

/// One chat message; `content` may be a string, a list of parts or an object.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LlmMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Value,
}

/// A branching rule attached to a step or module.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DecisionRule {
    /// Ordered `{condition, next}` pairs; first match wins
    Conditions(Vec<DecisionCase>),
    /// `switch` expression with named cases and an optional default
    Switch(SwitchRule),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DecisionCase {
    pub condition: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub goto: Option<String>,
}

impl DecisionCase {
    pub fn new(condition: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            next: Some(next.into()),
            goto: None,
        }
    }

    /// Target node name, `goto` taking precedence over `next`.
    pub fn target(&self) -> Option<&str> {
        self.goto.as_deref().or(self.next.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SwitchRule {
    pub switch: String,
    #[serde(default)]
    pub cases: Map<String, Value>,
    #[serde(default)]
    pub default: Option<DecisionTarget>,
}

impl SwitchRule {
    /// Cases in declaration order with their resolved targets.
    pub fn resolved_cases(&self) -> Vec<(&str, Option<String>)> {
        self.cases
            .iter()
            .map(|(label, value)| (label.as_str(), DecisionTarget::from_value(value)))
            .collect()
    }
}

/// A `{goto}` / `{next}` target inside a switch rule.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DecisionTarget {
    #[serde(default)]
    pub goto: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl DecisionTarget {
    pub fn resolve(&self) -> Option<&str> {
        self.goto.as_deref().or(self.next.as_deref())
    }

    fn from_value(value: &Value) -> Option<String> {
        serde_json::from_value::<DecisionTarget>(value.clone())
            .ok()
            .and_then(|t| t.resolve().map(str::to_string))
    }
}

/// Reference to another workflow, used as one opaque node in a flow.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Module {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub decision: Option<DecisionRule>,
    #[serde(default)]
    pub on_success: Option<Value>,
    #[serde(default)]
    pub on_error: Option<Value>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a dependency on another module.
    pub fn depends_on(mut self, module: impl Into<String>) -> Self {
        self.depends_on.push(module.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_decision(mut self, decision: DecisionRule) -> Self {
        self.decision = Some(decision);
        self
    }
}

/// A rule that starts a workflow run.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Trigger {
    #[serde(default)]
    pub name: String,
    /// `cron`, `watch`, `event` or empty
    #[serde(default)]
    pub on: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub event: Option<EventTrigger>,
}

impl Trigger {
    pub fn cron(name: impl Into<String>, schedule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: "cron".to_string(),
            schedule: Some(schedule.into()),
            ..Self::default()
        }
    }

    /// Only an explicit `enabled: false` disables a trigger.
    pub fn is_disabled(&self) -> bool {
        self.enabled == Some(false)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventTrigger {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default, rename = "filterFunctions", alias = "filter_functions")]
    pub filter_functions: Vec<String>,
}
