//! Output system for SVN command results.
//!
//! This module owns the single output destination ([`OutputSurface`]), the
//! structured message blocks written into it ([`MessageFormatter`]) and the
//! conflict scanner that annotates the rendered text.

mod conflicts;
mod format;
mod surface;

pub use conflicts::{
    CONFLICTS_KEY, CONFLICTS_SCOPE, ConflictRegion, HighlightStyle, STATUS_PREFIX_WIDTH,
    is_conflict_line, scan_conflicts,
};
pub use format::{INDENT_LEVEL, MessageFormatter, indent};
pub use surface::{
    COMPLETED_LINE, Destination, OUTPUT_SYNTAX, OutputSurface, PANEL_ID, VIEW_NAME,
    normalize_line_endings,
};
