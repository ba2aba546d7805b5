//! Workflow Parser
//!
//! Turns workflow YAML text into a [`WorkflowDocument`]. The editor normally
//! receives documents already parsed by its API layer; this module is the
//! entry point for the CLI and for tests.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::model::{WorkflowDocument, WorkflowKind};
use crate::error::LoadError;

/// Parses a workflow document from YAML text.
pub fn parse_document(yaml: &str) -> Result<WorkflowDocument, LoadError> {
    debug!("Parsing workflow YAML ({} bytes)", yaml.len());

    let document: WorkflowDocument = serde_yaml::from_str(yaml)?;

    match document.kind {
        WorkflowKind::Module if !document.modules.is_empty() => warn!(
            "Module-kind document declares {} modules; they are not drawn",
            document.modules.len()
        ),
        WorkflowKind::Flow if !document.steps.is_empty() => warn!(
            "Flow-kind document declares {} steps; they are not drawn",
            document.steps.len()
        ),
        _ => {}
    }

    info!(
        "Parsed {:?} document: {} steps, {} modules, {} triggers",
        document.kind,
        document.steps.len(),
        document.modules.len(),
        document.triggers.len()
    );

    Ok(document)
}

/// Loads a workflow document from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use flowcanvas::workflow::load_document;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let document = load_document("recon.yaml")?;
///     println!("Loaded {} steps", document.steps.len());
///     Ok(())
/// }
/// ```
pub fn load_document(path: impl AsRef<Path>) -> Result<WorkflowDocument, LoadError> {
    let path = path.as_ref();
    info!("Loading workflow from: {}", path.display());

    let yaml = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_document(&yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_document_file_not_found() {
        let result = load_document("/nonexistent/path/workflow.yaml");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_document_valid_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("recon.yaml");

        let yaml = r#"
kind: module
name: recon
steps:
  - name: enum
    type: bash
    command: subfinder -d example.com
"#;
        std::fs::write(&path, yaml).unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.name.as_deref(), Some("recon"));
        assert_eq!(document.steps.len(), 1);
        assert_eq!(document.steps[0].name, "enum");
    }

    #[test]
    fn test_load_document_invalid_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(&path, "this is not valid yaml: [[[").unwrap();

        assert!(matches!(load_document(&path), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn test_parse_document_rejects_malformed_payload() {
        let yaml = r#"
steps:
  - name: broken
    type: function
    functions: "not-a-list"
"#;
        let err = parse_document(yaml).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_parse_empty_document() {
        let document = parse_document("{}").unwrap();
        assert_eq!(document.entity_count(), 0);
    }
}
