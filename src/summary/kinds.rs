//! Per-Kind Summaries
//!
//! One pure function per entity kind, selected by the step body variant.
//! Every function is total: missing fields simply produce no line.

use serde_json::Value;

use super::text::{
    clean, fit_budget, join_limited, key_value, normalize, redact_text, render_value,
    with_extra_count,
};
use super::{SummaryOptions, NODE_LINE_BUDGET, TRIGGER_LINE_BUDGET};
use crate::workflow::model::{
    CommandStep, ForeachStep, FunctionStep, HttpStep, LlmMessage, LlmStep, Module, ParallelStep,
    Step, StepBody, Trigger,
};

/// Number of list items shown inline before a `+N more` tail.
const INLINE_ITEMS: usize = 3;

/// Messages shown for a chat-style llm step.
const LLM_MESSAGES: usize = 3;

/// Turns an entity into short, safe display lines.
pub trait Summarizer {
    fn summarize_with(&self, options: &SummaryOptions) -> Vec<String>;

    fn summarize(&self) -> Vec<String> {
        self.summarize_with(&SummaryOptions::default())
    }
}

impl Summarizer for Step {
    fn summarize_with(&self, options: &SummaryOptions) -> Vec<String> {
        let max = options.max_len;
        match &self.body {
            StepBody::Bash(cmd) | StepBody::RemoteBash(cmd) | StepBody::Container(cmd) => {
                command_lines(cmd, max)
            }
            StepBody::Function(f) => function_lines(f, max),
            StepBody::Http(http) => http_lines(http, max),
            StepBody::Llm(llm) => llm_lines(llm, max),
            StepBody::Parallel(p) | StepBody::ParallelSteps(p) => parallel_lines(p, max),
            StepBody::Foreach(f) => foreach_lines(f, max),
            StepBody::Override(_) | StepBody::Unknown { .. } => Vec::new(),
        }
    }
}

impl Summarizer for Module {
    fn summarize_with(&self, options: &SummaryOptions) -> Vec<String> {
        let max = options.max_len;
        let mut lines = Vec::new();

        if let Some(extends) = non_empty(self.extends.as_deref()) {
            lines.push(clean(&format!("extends: {}", extends), max));
        }
        if let Some(path) = non_empty(self.path.as_deref()) {
            lines.push(clean(&format!("path: {}", path), max));
        }
        if !self.depends_on.is_empty() {
            let joined = join_limited(&self.depends_on, INLINE_ITEMS);
            lines.push(clean(&format!("depends_on: {}", joined), max));
        }
        if !self.params.is_empty() {
            let pairs: Vec<String> = self
                .params
                .iter()
                .map(|(key, value)| key_value(key, value))
                .collect();
            let joined = join_limited(&pairs, INLINE_ITEMS);
            lines.push(clean(&format!("params: {}", joined), max));
        }

        fit_budget(lines, NODE_LINE_BUDGET)
    }
}

impl Summarizer for Trigger {
    /// Title followed by the detail-panel lines.
    fn summarize_with(&self, options: &SummaryOptions) -> Vec<String> {
        let mut lines = vec![trigger_title(self, options)];
        lines.extend(trigger_details(self, options));
        lines
    }
}

/// `"<name> (<on>)"`, plus `" disabled"` when explicitly disabled.
pub fn trigger_title(trigger: &Trigger, options: &SummaryOptions) -> String {
    let mut title = if trigger.on.trim().is_empty() {
        trigger.name.clone()
    } else {
        format!("{} ({})", trigger.name, trigger.on.trim())
    };
    if trigger.is_disabled() {
        title.push_str(" disabled");
    }
    clean(&title, options.max_len)
}

/// Detail lines for the trigger panel, capped at five.
pub fn trigger_details(trigger: &Trigger, options: &SummaryOptions) -> Vec<String> {
    let max = options.max_len;
    let mut lines = Vec::new();

    match trigger.on.trim() {
        "cron" => {
            if let Some(schedule) = non_empty(trigger.schedule.as_deref()) {
                lines.push(clean(&format!("schedule: {}", schedule), max));
            }
        }
        "watch" => {
            if let Some(path) = non_empty(trigger.path.as_deref()) {
                lines.push(clean(&format!("path: {}", path), max));
            }
        }
        "event" => {
            if let Some(event) = &trigger.event {
                if !event.topic.trim().is_empty() {
                    lines.push(clean(&format!("topic: {}", event.topic), max));
                }
                for filter in &event.filters {
                    lines.push(clean(&format!("filter: {}", filter), max));
                }
                for function in &event.filter_functions {
                    lines.push(clean(&format!("filterFn: {}", function), max));
                }
            }
        }
        _ => {}
    }

    fit_budget(lines, TRIGGER_LINE_BUDGET)
}

/// Summary of the single node that aggregates every trigger.
pub fn triggers_summary(triggers: &[Trigger], options: &SummaryOptions) -> Vec<String> {
    let titles = triggers.iter().map(|t| trigger_title(t, options)).collect();
    fit_budget(titles, NODE_LINE_BUDGET)
}

fn command_lines(cmd: &CommandStep, max: usize) -> Vec<String> {
    if let Some(command) = non_empty(cmd.command.as_deref()) {
        let resolved: Vec<&str> = [
            Some(command),
            cmd.speed_args.as_deref(),
            cmd.config_args.as_deref(),
            cmd.input_args.as_deref(),
            cmd.output_args.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
        return vec![clean(&resolved.join(" "), max)];
    }

    let list = if !cmd.commands.is_empty() {
        &cmd.commands
    } else {
        &cmd.parallel_commands
    };

    match list.first() {
        Some(first) => vec![clean(&with_extra_count(&normalize(first), list.len()), max)],
        None => Vec::new(),
    }
}

fn function_lines(f: &FunctionStep, max: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(function) = non_empty(f.function.as_deref()) {
        lines.push(clean(&format!("fn: {}", function), max));
    }
    for function in &f.functions {
        lines.push(clean(&format!("fn: {}", function), max));
    }
    for function in &f.parallel_functions {
        lines.push(clean(&format!("pfn: {}", function), max));
    }

    fit_budget(lines, NODE_LINE_BUDGET)
}

fn http_lines(http: &HttpStep, max: usize) -> Vec<String> {
    let mut lines = Vec::new();

    let method = http
        .method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| "HTTP".to_string());
    let url = http.url.as_deref().unwrap_or_default();
    lines.push(clean(&format!("{} {}", method, url), max));

    if !http.headers.is_empty() {
        let keys: Vec<&str> = http.headers.keys().map(String::as_str).collect();
        let shown = keys[..keys.len().min(INLINE_ITEMS)].join(", ");
        let line = if keys.len() > INLINE_ITEMS {
            format!("headers: {} (+{})", shown, keys.len() - INLINE_ITEMS)
        } else {
            format!("headers: {}", shown)
        };
        lines.push(clean(&line, max));
    }

    if let Some(body) = &http.request_body {
        let rendered = match body {
            Value::String(text) => redact_text(text),
            other => render_value(other),
        };
        if !rendered.trim().is_empty() {
            lines.push(clean(&format!("body: {}", rendered), max));
        }
    }

    fit_budget(lines, NODE_LINE_BUDGET)
}

fn llm_lines(llm: &LlmStep, max: usize) -> Vec<String> {
    if llm.is_embedding || (llm.messages.is_empty() && !llm.embedding_input.is_empty()) {
        return match llm.embedding_input.first() {
            Some(first) => {
                let input = with_extra_count(&normalize(first), llm.embedding_input.len());
                vec![clean(&format!("input: {}", input), max)]
            }
            None => Vec::new(),
        };
    }

    let mut lines: Vec<String> = llm
        .messages
        .iter()
        .take(LLM_MESSAGES)
        .map(|message| clean(&message_line(message), max))
        .collect();

    if llm.messages.len() > LLM_MESSAGES {
        lines.push(format!("+{} more", llm.messages.len() - LLM_MESSAGES));
    }
    lines
}

fn message_line(message: &LlmMessage) -> String {
    let content = message_content(&message.content);
    match non_empty(message.name.as_deref()) {
        Some(name) => format!("{}[{}]: {}", message.role, name, content),
        None => format!("{}: {}", message.role, content),
    }
}

/// Extracts readable text from the string, parts-array or object shapes.
fn message_content(content: &Value) -> String {
    match content {
        Value::String(text) => redact_text(text),
        Value::Array(parts) => parts
            .iter()
            .flat_map(|part| match part {
                Value::String(text) => vec![text.as_str()],
                Value::Object(fields) => ["text", "content", "input"]
                    .iter()
                    .filter_map(|key| fields.get(*key).and_then(Value::as_str))
                    .collect(),
                _ => Vec::new(),
            })
            .map(redact_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => render_value(other),
    }
}

fn parallel_lines(p: &ParallelStep, max: usize) -> Vec<String> {
    if p.parallel_steps.is_empty() {
        return Vec::new();
    }
    let names: Vec<&str> = p.parallel_steps.iter().map(|s| s.name.as_str()).collect();
    vec![clean(&format!("steps: {}", join_limited(&names, INLINE_ITEMS)), max)]
}

fn foreach_lines(f: &ForeachStep, max: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(input) = non_empty(f.input.as_deref()) {
        let line = match non_empty(f.variable.as_deref()) {
            Some(variable) => format!("each {} in {}", variable, input),
            None => format!("each in {}", input),
        };
        lines.push(clean(&line, max));
    }
    if let Some(step) = &f.step {
        let line = match &f.threads {
            Some(threads) => format!("step: {} ({} threads)", step.name, render_value(threads)),
            None => format!("step: {}", step.name),
        };
        lines.push(clean(&line, max));
    }

    lines
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
