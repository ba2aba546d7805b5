//! Workflow Validation
//!
//! Structural sanity checks that must hold before a document can be
//! compiled into a graph:
//! - Names are present, not reserved, and unique among siblings
//! - Every `foreach` carries its nested step
//! - Decision targets and `depends_on` entries name existing nodes
//!
//! Business semantics (commands, URLs, schedules) are never checked here.

use std::collections::HashSet;

use log::{debug, info};

use super::model::{DecisionRule, Step, StepBody, WorkflowDocument, WorkflowKind};
use crate::error::{CompileError, NameScope};
use crate::graph::node::RESERVED_IDS;

/// Validates a document and returns every structural error in document order.
///
/// Useful for editor feedback where all messages are shown at once.
pub fn validate_document(document: &WorkflowDocument) -> Vec<CompileError> {
    let mut errors = Vec::new();

    let names = match document.kind {
        WorkflowKind::Module => {
            check_step_scope(&document.steps, true, &mut errors);
            document.steps.iter().map(|s| s.name.as_str()).collect::<HashSet<_>>()
        }
        WorkflowKind::Flow => {
            check_module_names(document, &mut errors);
            document.modules.iter().map(|m| m.name.as_str()).collect::<HashSet<_>>()
        }
    };

    match document.kind {
        WorkflowKind::Module => {
            for step in &document.steps {
                if let Some(decision) = &step.decision {
                    check_decision(&step.name, decision, &names, &mut errors);
                }
            }
        }
        WorkflowKind::Flow => {
            for module in &document.modules {
                for dependency in &module.depends_on {
                    if !names.contains(dependency.as_str()) {
                        errors.push(CompileError::UnknownReference {
                            from: module.name.clone(),
                            target: dependency.clone(),
                        });
                    }
                }
                if let Some(decision) = &module.decision {
                    check_decision(&module.name, decision, &names, &mut errors);
                }
            }
        }
    }

    if errors.is_empty() {
        info!(
            "Workflow validated: {} {:?} entities",
            document.entity_count(),
            document.kind
        );
    } else {
        debug!("Workflow has {} structural errors", errors.len());
    }

    errors
}

/// Validates a document, failing on the first structural error.
pub fn check_document(document: &WorkflowDocument) -> Result<(), CompileError> {
    match validate_document(document).into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// Checks one sibling scope of steps and recurses into nested constructs.
///
/// Reserved graph ids only matter for the top level, where names become
/// node ids.
fn check_step_scope<'a>(
    steps: impl IntoIterator<Item = &'a Step>,
    top_level: bool,
    errors: &mut Vec<CompileError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, step) in steps.into_iter().enumerate() {
        if step.name.is_empty() {
            errors.push(CompileError::EmptyName {
                scope: NameScope::Step,
                index,
            });
        } else if top_level && RESERVED_IDS.contains(&step.name.as_str()) {
            errors.push(CompileError::ReservedName {
                scope: NameScope::Step,
                name: step.name.clone(),
            });
        } else if !seen.insert(step.name.as_str()) {
            errors.push(CompileError::DuplicateName {
                scope: NameScope::Step,
                name: step.name.clone(),
            });
        }

        if let StepBody::Foreach(foreach) = &step.body {
            if foreach.step.is_none() {
                errors.push(CompileError::MissingForeachStep(step.name.clone()));
            }
        }
        check_step_scope(step.children(), false, errors);
    }
}

fn check_module_names(document: &WorkflowDocument, errors: &mut Vec<CompileError>) {
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, module) in document.modules.iter().enumerate() {
        if module.name.is_empty() {
            errors.push(CompileError::EmptyName {
                scope: NameScope::Module,
                index,
            });
        } else if RESERVED_IDS.contains(&module.name.as_str()) {
            errors.push(CompileError::ReservedName {
                scope: NameScope::Module,
                name: module.name.clone(),
            });
        } else if !seen.insert(module.name.as_str()) {
            errors.push(CompileError::DuplicateName {
                scope: NameScope::Module,
                name: module.name.clone(),
            });
        }
    }
}

fn check_decision(
    owner: &str,
    decision: &DecisionRule,
    names: &HashSet<&str>,
    errors: &mut Vec<CompileError>,
) {
    let mut check = |label: &str, target: Option<&str>| match target {
        Some(target) if names.contains(target) => {}
        Some(target) => errors.push(CompileError::UnknownReference {
            from: owner.to_string(),
            target: target.to_string(),
        }),
        None => errors.push(CompileError::MissingDecisionTarget {
            from: owner.to_string(),
            label: label.to_string(),
        }),
    };

    match decision {
        DecisionRule::Conditions(cases) => {
            for case in cases {
                check(&case.condition, case.target());
            }
        }
        DecisionRule::Switch(rule) => {
            for (label, target) in rule.resolved_cases() {
                check(label, target.as_deref());
            }
            if let Some(default) = &rule.default {
                check("default", default.resolve());
            }
        }
    }
}
