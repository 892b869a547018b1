//! The output surface: one destination for all command output.
//!
//! [`OutputSurface`] owns the lifecycle of the output destination selected by
//! the `outputTo` setting. Panels and tabs are created lazily on the first
//! write, reused afterwards, and forgotten when the host reports them closed.
//! In `dialog` mode writes accumulate in a buffer that is shown once per
//! command by [`OutputSurface::end`].
//!
//! The surface is constructed once per editor process and handed by reference
//! to whatever renders output (see [`MessageFormatter`](super::MessageFormatter)).
//! It is not shared across threads: every call happens on the editor's UI
//! sequence.

use super::format::{INDENT_LEVEL, indent};
use crate::config::Settings;
use crate::error::HypnoResult;
use crate::host::{EditorHost, ViewId};
use crate::models::{OutputTo, ScrollTo};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Display name of the output tab.
pub const VIEW_NAME: &str = "SVN Output";

/// Identifier of the output panel.
pub const PANEL_ID: &str = "svn-output";

/// Syntax definition assigned to the output view.
pub const OUTPUT_SYNTAX: &str = "Packages/HypnoSVN/SVN Output.hidden-tmLanguage";

/// Line written after every command.
pub const COMPLETED_LINE: &str = "Completed";

static LINE_ENDING_REGEX: OnceLock<Regex> = OnceLock::new();

fn line_ending_regex() -> &'static Regex {
    LINE_ENDING_REGEX.get_or_init(|| {
        Regex::new(r"\r\n?").expect("Failed to compile line ending regex")
    })
}

/// Replace `\r\n` and bare `\r` with `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    line_ending_regex().replace_all(text, "\n").into_owned()
}

/// A resolved output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Panel(ViewId),
    Tab(ViewId),
}

impl Destination {
    pub fn view(&self) -> ViewId {
        match self {
            Destination::Panel(view) | Destination::Tab(view) => *view,
        }
    }
}

/// Owner of the single output destination.
pub struct OutputSurface<H: EditorHost> {
    host: H,
    settings: Settings,
    panel: Option<ViewId>,
    tab: Option<ViewId>,
    dialog_buffer: String,
}

impl<H: EditorHost> OutputSurface<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Self {
            host,
            settings,
            panel: None,
            tab: None,
            dialog_buffer: String::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings are re-read on every call, so edits take effect immediately.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Text accumulated for the next dialog.
    pub fn dialog_buffer(&self) -> &str {
        &self.dialog_buffer
    }

    /// Resolve the destination for the configured mode, creating it if needed.
    ///
    /// Returns `None` in `dialog` mode. Fails only when the host cannot create
    /// a panel or document at all.
    pub fn get_or_create(&mut self) -> HypnoResult<Option<Destination>> {
        match self.settings.output_to() {
            OutputTo::Dialog => Ok(None),
            OutputTo::Tab => {
                if let Some(view) = self.tab {
                    if !self.host.has_window(view) {
                        debug!(%view, "dropping stale output tab");
                        self.tab = None;
                    }
                }
                if self.tab.is_none() {
                    let view = match self.find_existing_tab() {
                        Some(view) => {
                            debug!(%view, "adopting existing output tab");
                            view
                        }
                        None => {
                            let view = self.host.new_file()?;
                            self.host.set_scratch(view, true);
                            self.host.set_name(view, VIEW_NAME);
                            self.host.set_read_only(view, true);
                            debug!(%view, "created output tab");
                            view
                        }
                    };
                    self.host.set_syntax_file(view, OUTPUT_SYNTAX);
                    self.tab = Some(view);
                }
                Ok(self.tab.map(Destination::Tab))
            }
            OutputTo::Panel => {
                let view = match self.panel {
                    Some(view) => view,
                    None => {
                        let view = self.host.create_output_panel(PANEL_ID)?;
                        self.host.set_syntax_file(view, OUTPUT_SYNTAX);
                        debug!(%view, "created output panel");
                        self.panel = Some(view);
                        view
                    }
                };
                self.host.show_panel(&format!("output.{PANEL_ID}"));
                Ok(Some(Destination::Panel(view)))
            }
        }
    }

    /// Resolve the destination without creating anything.
    pub fn get_existing_only(&self) -> Option<Destination> {
        match self.settings.output_to() {
            OutputTo::Dialog => None,
            OutputTo::Tab => self.find_existing_tab().map(Destination::Tab),
            OutputTo::Panel => self.panel.map(Destination::Panel),
        }
    }

    /// The held tab if it is still open, otherwise an open document that
    /// looks like an output tab.
    fn find_existing_tab(&self) -> Option<ViewId> {
        if let Some(view) = self.tab {
            if self.host.has_window(view) {
                return Some(view);
            }
        }
        self.host.window_views().into_iter().find(|&view| {
            self.host.view_name(view).as_deref() == Some(VIEW_NAME)
                && self.host.is_read_only(view)
                && self.host.is_scratch(view)
        })
    }

    /// Append a message followed by a newline.
    pub fn write(&mut self, raw: &str) -> HypnoResult<()> {
        if self.settings.output_to() == OutputTo::Dialog {
            self.dialog_buffer.push_str(raw);
            self.dialog_buffer.push('\n');
            return Ok(());
        }
        let Some(destination) = self.get_or_create()? else {
            return Ok(());
        };
        let view = destination.view();
        let mut text = normalize_line_endings(raw);
        text.push('\n');
        trace!(%view, bytes = text.len(), "appending output");
        self.host.append(view, &text);
        if self.settings.scroll_to() == ScrollTo::Bottom {
            let end = self.host.size(view);
            self.host.show(view, end);
        }
        Ok(())
    }

    /// Wipe the destination's text.
    pub fn clear(&mut self) -> HypnoResult<()> {
        if let Some(destination) = self.get_or_create()? {
            self.host.erase_all(destination.view());
        }
        Ok(())
    }

    /// Finish a logical command.
    ///
    /// In `dialog` mode the accumulated buffer is shown and nothing else is
    /// written, so the next command's dialog starts empty. Other modes get an
    /// indented `Completed` line.
    pub fn end(&mut self) -> HypnoResult<()> {
        if self.settings.output_to() == OutputTo::Dialog {
            let text = std::mem::take(&mut self.dialog_buffer);
            self.host.message_dialog(&text);
            return Ok(());
        }
        self.dialog_buffer.clear();
        self.write(&indent(COMPLETED_LINE, INDENT_LEVEL))
    }

    /// Give keyboard focus to the destination.
    pub fn focus(&mut self) -> HypnoResult<()> {
        if let Some(destination) = self.get_or_create()? {
            self.host.focus_view(destination.view());
        }
        Ok(())
    }

    /// Scroll so the end of the text sits at the top of the viewport.
    pub fn scroll_to_bottom_aligned(&mut self) -> HypnoResult<()> {
        if let Some(destination) = self.get_or_create()? {
            let view = destination.view();
            let end = self.host.size(view);
            let position = self.host.text_to_layout(view, end);
            self.host.set_viewport_position(view, position, true);
        }
        Ok(())
    }

    /// Scroll just enough to make the end of the text visible.
    pub fn scroll_bottom_into_view(&mut self) -> HypnoResult<()> {
        if let Some(destination) = self.get_or_create()? {
            let view = destination.view();
            let end = self.host.size(view);
            self.host.show(view, end);
        }
        Ok(())
    }

    /// Forget a destination the host reports as closed.
    pub fn notify_closed(&mut self, view: ViewId) {
        if self.tab == Some(view) {
            debug!(%view, "output tab closed");
            self.tab = None;
        }
        if self.panel == Some(view) {
            debug!(%view, "output panel closed");
            self.panel = None;
        }
    }
}
