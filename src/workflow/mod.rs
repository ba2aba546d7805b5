//! Workflow Definition Module
//!
//! Provides data structures and utilities for reading and structurally
//! validating workflow documents.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (WorkflowDocument, Step, Module, Trigger)
//! - [`parser`]: YAML parsing and loading
//! - [`validator`]: Structural checks run before graph compilation

pub mod model;
pub mod parser;
pub mod validator;

pub use model::{
    DecisionCase, DecisionRule, DecisionTarget, Module, Step, StepBody, SwitchRule, Trigger,
    WorkflowDocument, WorkflowKind,
};
pub use parser::{load_document, parse_document};
pub use validator::{check_document, validate_document};
