//! View Configuration
//!
//! Display knobs recognized by the canvas. Only `orientation` and
//! `show_details` change the computed output; `wrap_long_text` is passed
//! through to the node data and `hide_mini_map` is surface-only.
//!
//! # Example
//!
//! ```yaml
//! orientation: LR
//! wrapLongText: true
//! showDetails: false
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::layout::Orientation;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOptions {
    pub orientation: Orientation,
    pub wrap_long_text: bool,
    /// When false, nodes carry no summary lines at all
    pub show_details: bool,
    pub hide_mini_map: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::TopToBottom,
            wrap_long_text: false,
            show_details: true,
            hide_mini_map: false,
        }
    }
}

impl ViewOptions {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_details(mut self, show_details: bool) -> Self {
        self.show_details = show_details;
        self
    }
}

/// Loads view options from a YAML file; missing keys keep their defaults.
pub fn load_view_options(path: impl AsRef<Path>) -> Result<ViewOptions, LoadError> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let options: ViewOptions = serde_yaml::from_str(&yaml)?;
    info!(
        "View options from {}: orientation {}, details {}",
        path.display(),
        options.orientation,
        if options.show_details { "on" } else { "off" }
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = ViewOptions::default();
        assert_eq!(options.orientation, Orientation::TopToBottom);
        assert!(options.show_details);
        assert!(!options.wrap_long_text);
        assert!(!options.hide_mini_map);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options: ViewOptions = serde_yaml::from_str("orientation: LR\nwrapLongText: true\n").unwrap();
        assert_eq!(options.orientation, Orientation::LeftToRight);
        assert!(options.wrap_long_text);
        assert!(options.show_details);
    }

    #[test]
    fn test_load_view_options() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "showDetails: false\nhideMiniMap: true").unwrap();

        let options = load_view_options(file.path()).unwrap();
        assert!(!options.show_details);
        assert!(options.hide_mini_map);
    }

    #[test]
    fn test_load_view_options_missing_file() {
        let result = load_view_options("/nonexistent/view.yaml");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_unknown_orientation_rejected() {
        let result: Result<ViewOptions, _> = serde_yaml::from_str("orientation: diagonal");
        assert!(result.is_err());
    }
}
