//! Conflict line detection for rendered SVN output.
//!
//! `svn update` and `svn status` report a conflicted path with a `C` in the
//! status column. Once indented into the output view such a line looks like
//! `        C    src/main.c`. The scanner walks the full view text line by
//! line and returns one byte range per conflicted line, skipping the
//! fixed-width status prefix.

use crate::host::{DrawFlags, Region};
use regex::Regex;
use std::sync::OnceLock;

/// Key of the region set holding conflict marks.
pub const CONFLICTS_KEY: &str = "svn-conflicts";

/// Scope used to colour conflict regions.
pub const CONFLICTS_SCOPE: &str = "message.error";

/// Width of the status-code prefix skipped at the start of each conflict line.
pub const STATUS_PREFIX_WIDTH: usize = 8;

/// A highlighted conflict line: a half-open byte range into the output text.
pub type ConflictRegion = Region;

static CONFLICT_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn conflict_line_regex() -> &'static Regex {
    CONFLICT_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^ +C .*$").expect("Failed to compile conflict line regex")
    })
}

/// Inline decoration used for conflict regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlightStyle {
    Outline,
    Fill,
    Solid,
    Squiggly,
    Stippled,
    #[default]
    None,
}

impl HighlightStyle {
    /// Parse a setting value; unknown values map to [`HighlightStyle::None`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "outline" => Self::Outline,
            "fill" => Self::Fill,
            "solid" => Self::Solid,
            "squiggly" => Self::Squiggly,
            "stippled" => Self::Stippled,
            _ => Self::None,
        }
    }

    /// Drawing flags for this style, without the persistence bit.
    pub fn draw_flags(self) -> DrawFlags {
        let underline =
            DrawFlags::DRAW_NO_FILL | DrawFlags::DRAW_NO_OUTLINE | DrawFlags::DRAW_EMPTY_AS_OVERWRITE;
        match self {
            Self::Outline => DrawFlags::DRAW_NO_FILL,
            Self::Fill => DrawFlags::DRAW_NO_OUTLINE,
            Self::Solid => DrawFlags::DRAW_SOLID_UNDERLINE | underline,
            Self::Squiggly => DrawFlags::DRAW_SQUIGGLY_UNDERLINE | underline,
            Self::Stippled => DrawFlags::DRAW_STIPPLED_UNDERLINE | underline,
            Self::None => DrawFlags::HIDDEN,
        }
    }
}

/// Returns true if a single line (without its newline) reports a conflict.
pub fn is_conflict_line(line: &str) -> bool {
    conflict_line_regex().is_match(line)
}

/// Compute the conflict regions of a full output text.
///
/// Lines are split on `\n`; each matching line yields
/// `[offset + 8, offset + len)`. The start is clamped so it never passes the
/// end of the line and always lands on a character boundary.
pub fn scan_conflicts(text: &str) -> Vec<ConflictRegion> {
    let mut offset = 0;
    let mut regions = Vec::new();

    for line in text.split('\n') {
        if is_conflict_line(line) {
            let mut skip = STATUS_PREFIX_WIDTH.min(line.len());
            while !line.is_char_boundary(skip) {
                skip += 1;
            }
            regions.push(Region::new(offset + skip, offset + line.len()));
        }
        offset += line.len() + 1;
    }

    regions
}
