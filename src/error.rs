//! Error Types
//!
//! Typed failures for the two phases that can fail: loading a workflow
//! document and compiling it into a graph. Everything else in the crate
//! degrades locally instead of failing.

use std::fmt;

use thiserror::Error;

/// Which sibling scope a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    Step,
    Module,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// Structural errors that make a document impossible to compile.
///
/// These are fatal to a compilation pass; callers keep showing the last
/// good graph and display the message, which always names the offender.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("duplicate {scope} name: {name}")]
    DuplicateName { scope: NameScope, name: String },

    #[error("{scope} name '{name}' is reserved")]
    ReservedName { scope: NameScope, name: String },

    #[error("{scope} #{index} has an empty name")]
    EmptyName { scope: NameScope, index: usize },

    #[error("'{from}' references unknown node '{target}'")]
    UnknownReference { from: String, target: String },

    #[error("foreach step '{0}' has no nested step")]
    MissingForeachStep(String),

    #[error("decision '{label}' on '{from}' has no goto/next target")]
    MissingDecisionTarget { from: String, label: String },

    #[error("edge {from} -> {to} names a node that does not exist")]
    DanglingEdge { from: String, to: String },
}

/// Errors raised while turning workflow text into a document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message() {
        let err = CompileError::DuplicateName {
            scope: NameScope::Step,
            name: "fetch-subdomains".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate step name: fetch-subdomains");
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = CompileError::UnknownReference {
            from: "a".to_string(),
            target: "ghost".to_string(),
        };
        assert!(err.to_string().contains("ghost"));

        let err = CompileError::MissingForeachStep("loop".to_string());
        assert!(err.to_string().contains("loop"));
    }
}
