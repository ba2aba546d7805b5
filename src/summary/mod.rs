//! Summary Builder
//!
//! Derives compact, redacted, truncated display lines for each node so the
//! canvas can show a node's configuration without leaking secrets or
//! overflowing its card.
//!
//! - [`text`]: normalization, truncation, budgets, redaction
//! - [`kinds`]: per-kind extraction behind the [`Summarizer`] trait

pub mod kinds;
pub mod text;

pub use kinds::{trigger_details, trigger_title, triggers_summary, Summarizer};

/// Default width of one summary line, before the ellipsis.
pub const MAX_LINE_LEN: usize = 140;

/// Line budget for step, module and aggregated trigger nodes.
pub const NODE_LINE_BUDGET: usize = 3;

/// Line budget for the trigger detail panel.
pub const TRIGGER_LINE_BUDGET: usize = 5;

/// Options shared by every summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub max_len: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_len: MAX_LINE_LEN,
        }
    }
}
