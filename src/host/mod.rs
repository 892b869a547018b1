//! Editor host capability interface.
//!
//! The output surface never talks to an editor directly. Everything it needs
//! (scratch documents, output panels, appending text, viewport control,
//! decorated regions and modal dialogs) goes through the [`EditorHost`] trait,
//! so the surface and the formatter can be driven by [`MemoryHost`] in tests
//! and in the command-line front end.

mod memory;

pub use memory::{MemoryHost, MemoryView};

use crate::error::HostError;
use std::fmt;
use std::ops::BitOr;

/// Opaque handle to a document or output panel owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Half-open byte range `[start, end)` into a view's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Viewport coordinate in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// Drawing flags for a decorated region set.
///
/// Values mirror the flag bits used by Sublime-style region APIs so a real
/// host can pass them through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawFlags(u32);

impl DrawFlags {
    pub const NONE: Self = Self(0);
    pub const DRAW_EMPTY: Self = Self(1);
    pub const HIDE_ON_MINIMAP: Self = Self(2);
    pub const DRAW_EMPTY_AS_OVERWRITE: Self = Self(4);
    pub const PERSISTENT: Self = Self(16);
    pub const DRAW_NO_FILL: Self = Self(32);
    pub const HIDDEN: Self = Self(128);
    pub const DRAW_NO_OUTLINE: Self = Self(256);
    pub const DRAW_SOLID_UNDERLINE: Self = Self(512);
    pub const DRAW_STIPPLED_UNDERLINE: Self = Self(1024);
    pub const DRAW_SQUIGGLY_UNDERLINE: Self = Self(2048);

    /// Raw flag bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DrawFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A named set of decorated regions, as handed to [`EditorHost::add_regions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    pub regions: Vec<Region>,
    pub scope: String,
    /// Gutter icon name, or `None` for no gutter mark.
    pub icon: Option<String>,
    pub flags: DrawFlags,
}

/// Capabilities the output surface requires from the editor.
///
/// All calls happen on the editor's UI sequence; implementations need not be
/// thread-safe. Byte offsets are used for every text position.
pub trait EditorHost {
    /// Documents open in the active window, in tab order. Output panels are not included.
    fn window_views(&self) -> Vec<ViewId>;

    /// Display name of a document.
    fn view_name(&self, view: ViewId) -> Option<String>;

    fn is_read_only(&self, view: ViewId) -> bool;

    fn is_scratch(&self, view: ViewId) -> bool;

    /// Whether the view is still attached to a window. Closed views report false.
    fn has_window(&self, view: ViewId) -> bool;

    /// Create a new empty document in the active window.
    fn new_file(&mut self) -> Result<ViewId, HostError>;

    fn set_scratch(&mut self, view: ViewId, scratch: bool);

    fn set_name(&mut self, view: ViewId, name: &str);

    fn set_read_only(&mut self, view: ViewId, read_only: bool);

    fn set_syntax_file(&mut self, view: ViewId, syntax: &str);

    /// Create (or reset) the output panel with the given identifier.
    fn create_output_panel(&mut self, panel_id: &str) -> Result<ViewId, HostError>;

    /// Make a panel visible. `panel` uses the host's `output.<id>` naming.
    fn show_panel(&mut self, panel: &str);

    /// Append text at the end of a view, bypassing its read-only flag.
    fn append(&mut self, view: ViewId, text: &str);

    /// Remove all text from a view, bypassing its read-only flag.
    fn erase_all(&mut self, view: ViewId);

    /// Size of the view's text in bytes.
    fn size(&self, view: ViewId) -> usize;

    /// Full text of the view.
    fn text(&self, view: ViewId) -> String;

    /// Map a byte offset to a layout coordinate.
    fn text_to_layout(&self, view: ViewId, point: usize) -> LayoutPoint;

    fn set_viewport_position(&mut self, view: ViewId, position: LayoutPoint, animate: bool);

    /// Scroll just enough to make `point` visible.
    fn show(&mut self, view: ViewId, point: usize);

    fn focus_view(&mut self, view: ViewId);

    /// Add or replace the region set stored under `key`.
    fn add_regions(&mut self, view: ViewId, key: &str, set: RegionSet);

    /// Show a blocking message dialog.
    fn message_dialog(&mut self, text: &str);
}
