//! In-memory editor host.
//!
//! [`MemoryHost`] keeps every document, panel, viewport and region set in
//! plain data structures. The command-line front end renders from it, and
//! the unit tests use it to observe exactly what the surface asked the editor
//! to do.

use super::{EditorHost, LayoutPoint, Region, RegionSet, ViewId};
use crate::error::HostError;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Height of one text line in layout units.
const LINE_HEIGHT: f64 = 16.0;

/// A document or output panel held by [`MemoryHost`].
#[derive(Debug, Clone, Default)]
pub struct MemoryView {
    pub name: String,
    pub read_only: bool,
    pub scratch: bool,
    pub syntax: Option<String>,
    pub text: String,
    /// False once the user closed the view.
    pub in_window: bool,
    /// Set for output panels.
    pub panel_id: Option<String>,
    pub viewport: LayoutPoint,
    /// Last point passed to `show`.
    pub shown_point: Option<usize>,
    pub regions: HashMap<String, RegionSet>,
}

/// An [`EditorHost`] that lives entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    views: BTreeMap<ViewId, MemoryView>,
    /// Tab order of documents in the active window.
    window: Vec<ViewId>,
    panels: HashMap<String, ViewId>,
    next_id: u64,
    shown_panels: Vec<String>,
    focused: Option<ViewId>,
    dialogs: Vec<String>,
    refuse_creation: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `new_file`/`create_output_panel` call fail.
    pub fn refuse_creation(&mut self, refuse: bool) {
        self.refuse_creation = refuse;
    }

    /// Open a document as if the user (or an earlier session) had created it.
    pub fn open_view(&mut self, name: &str, read_only: bool, scratch: bool) -> ViewId {
        let id = self.allocate(MemoryView {
            name: name.to_string(),
            read_only,
            scratch,
            in_window: true,
            ..MemoryView::default()
        });
        self.window.push(id);
        id
    }

    /// Close a view the way a user closing a tab would.
    ///
    /// The view keeps its data but is detached from the window. Closing a
    /// panel hides it without destroying it.
    pub fn close_view(&mut self, view: ViewId) -> Result<(), HostError> {
        let entry = self
            .views
            .get_mut(&view)
            .ok_or(HostError::UnknownView { view })?;
        entry.in_window = false;
        self.window.retain(|v| *v != view);
        if self.focused == Some(view) {
            self.focused = None;
        }
        trace!(%view, "view closed");
        Ok(())
    }

    pub fn view(&self, view: ViewId) -> Option<&MemoryView> {
        self.views.get(&view)
    }

    /// Region set stored under `key` on a view.
    pub fn regions(&self, view: ViewId, key: &str) -> Option<&RegionSet> {
        self.views.get(&view).and_then(|v| v.regions.get(key))
    }

    /// Panel names passed to `show_panel`, oldest first.
    pub fn shown_panels(&self) -> &[String] {
        &self.shown_panels
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    /// Texts shown through `message_dialog`, oldest first.
    pub fn dialogs(&self) -> &[String] {
        &self.dialogs
    }

    /// Number of views ever created, including closed ones.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    fn allocate(&mut self, view: MemoryView) -> ViewId {
        self.next_id += 1;
        let id = ViewId(self.next_id);
        self.views.insert(id, view);
        id
    }

    fn with_view(&mut self, view: ViewId, f: impl FnOnce(&mut MemoryView)) {
        if let Some(entry) = self.views.get_mut(&view) {
            f(entry);
        }
    }
}

impl EditorHost for MemoryHost {
    fn window_views(&self) -> Vec<ViewId> {
        self.window.clone()
    }

    fn view_name(&self, view: ViewId) -> Option<String> {
        self.views.get(&view).map(|v| v.name.clone())
    }

    fn is_read_only(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|v| v.read_only)
    }

    fn is_scratch(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|v| v.scratch)
    }

    fn has_window(&self, view: ViewId) -> bool {
        self.views.get(&view).is_some_and(|v| v.in_window)
    }

    fn new_file(&mut self) -> Result<ViewId, HostError> {
        if self.refuse_creation {
            return Err(HostError::ViewCreationFailed {
                message: "no active window".to_string(),
            });
        }
        Ok(self.open_view("", false, false))
    }

    fn set_scratch(&mut self, view: ViewId, scratch: bool) {
        self.with_view(view, |v| v.scratch = scratch);
    }

    fn set_name(&mut self, view: ViewId, name: &str) {
        self.with_view(view, |v| v.name = name.to_string());
    }

    fn set_read_only(&mut self, view: ViewId, read_only: bool) {
        self.with_view(view, |v| v.read_only = read_only);
    }

    fn set_syntax_file(&mut self, view: ViewId, syntax: &str) {
        self.with_view(view, |v| v.syntax = Some(syntax.to_string()));
    }

    fn create_output_panel(&mut self, panel_id: &str) -> Result<ViewId, HostError> {
        if self.refuse_creation {
            return Err(HostError::PanelCreationFailed {
                panel_id: panel_id.to_string(),
            });
        }
        if let Some(&existing) = self.panels.get(panel_id) {
            self.with_view(existing, |v| {
                v.text.clear();
                v.in_window = true;
            });
            return Ok(existing);
        }
        let id = self.allocate(MemoryView {
            in_window: true,
            panel_id: Some(panel_id.to_string()),
            ..MemoryView::default()
        });
        self.panels.insert(panel_id.to_string(), id);
        Ok(id)
    }

    fn show_panel(&mut self, panel: &str) {
        self.shown_panels.push(panel.to_string());
        if let Some(id) = panel
            .strip_prefix("output.")
            .and_then(|panel_id| self.panels.get(panel_id).copied())
        {
            self.with_view(id, |v| v.in_window = true);
        }
    }

    fn append(&mut self, view: ViewId, text: &str) {
        self.with_view(view, |v| v.text.push_str(text));
    }

    fn erase_all(&mut self, view: ViewId) {
        self.with_view(view, |v| {
            v.text.clear();
            v.regions.clear();
        });
    }

    fn size(&self, view: ViewId) -> usize {
        self.views.get(&view).map_or(0, |v| v.text.len())
    }

    fn text(&self, view: ViewId) -> String {
        self.views
            .get(&view)
            .map(|v| v.text.clone())
            .unwrap_or_default()
    }

    fn text_to_layout(&self, view: ViewId, point: usize) -> LayoutPoint {
        let Some(entry) = self.views.get(&view) else {
            return LayoutPoint::default();
        };
        let point = point.min(entry.text.len());
        let before = &entry.text.as_bytes()[..point];
        let line = before.iter().filter(|&&b| b == b'\n').count();
        let column = before.iter().rev().take_while(|&&b| b != b'\n').count();
        LayoutPoint {
            x: column as f64,
            y: line as f64 * LINE_HEIGHT,
        }
    }

    fn set_viewport_position(&mut self, view: ViewId, position: LayoutPoint, _animate: bool) {
        self.with_view(view, |v| v.viewport = position);
    }

    fn show(&mut self, view: ViewId, point: usize) {
        self.with_view(view, |v| v.shown_point = Some(point));
    }

    fn focus_view(&mut self, view: ViewId) {
        if self.has_window(view) {
            self.focused = Some(view);
        }
    }

    fn add_regions(&mut self, view: ViewId, key: &str, set: RegionSet) {
        self.with_view(view, |v| {
            v.regions.insert(key.to_string(), set);
        });
    }

    fn message_dialog(&mut self, text: &str) {
        self.dialogs.push(text.to_string());
    }
}

impl MemoryView {
    /// Slices of the view's text covered by a region set, in order.
    pub fn region_texts<'a>(&'a self, regions: &[Region]) -> Vec<&'a str> {
        regions
            .iter()
            .filter_map(|r| self.text.get(r.start..r.end))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Output Panel Reuse
    ///
    /// Verifies that creating a panel twice returns the same view and resets it.
    ///
    /// ## Test Scenario
    /// - Creates a panel, writes text, creates it again
    ///
    /// ## Expected Outcome
    /// - Same view id both times, text cleared on re-creation
    #[test]
    fn test_output_panel_reuse() {
        let mut host = MemoryHost::new();
        let first = host.create_output_panel("svn-output").unwrap();
        host.append(first, "hello");
        let second = host.create_output_panel("svn-output").unwrap();

        assert_eq!(first, second);
        assert_eq!(host.text(second), "");
        assert!(host.window_views().is_empty());
    }

    /// # Closing Views
    ///
    /// Verifies that closed views lose their window but keep their data.
    ///
    /// ## Test Scenario
    /// - Opens a view, focuses it, closes it
    /// - Closes an unknown view
    ///
    /// ## Expected Outcome
    /// - Closed view reports no window and is no longer focused or listed
    /// - Unknown view yields UnknownView
    #[test]
    fn test_close_view() {
        let mut host = MemoryHost::new();
        let view = host.open_view("notes.txt", false, false);
        host.append(view, "text");
        host.focus_view(view);

        host.close_view(view).unwrap();

        assert!(!host.has_window(view));
        assert_eq!(host.focused(), None);
        assert!(host.window_views().is_empty());
        assert_eq!(host.text(view), "text");
        assert_eq!(
            host.close_view(ViewId(99)),
            Err(HostError::UnknownView { view: ViewId(99) })
        );
    }

    /// # Layout Mapping
    ///
    /// Verifies byte offsets map to line-based layout coordinates.
    ///
    /// ## Test Scenario
    /// - Maps offsets on the first and third line, and past the end
    ///
    /// ## Expected Outcome
    /// - y grows by one line height per newline, x counts the column
    #[test]
    fn test_text_to_layout() {
        let mut host = MemoryHost::new();
        let view = host.open_view("", false, false);
        host.append(view, "ab\ncd\nef");

        assert_eq!(host.text_to_layout(view, 1), LayoutPoint { x: 1.0, y: 0.0 });
        assert_eq!(
            host.text_to_layout(view, 7),
            LayoutPoint {
                x: 1.0,
                y: 2.0 * LINE_HEIGHT
            }
        );
        assert_eq!(host.text_to_layout(view, 100).y, 2.0 * LINE_HEIGHT);
    }

    #[test]
    fn test_refuse_creation() {
        let mut host = MemoryHost::new();
        host.refuse_creation(true);

        assert!(matches!(
            host.new_file(),
            Err(HostError::ViewCreationFailed { .. })
        ));
        assert_eq!(
            host.create_output_panel("svn-output"),
            Err(HostError::PanelCreationFailed {
                panel_id: "svn-output".to_string()
            })
        );
    }
}
