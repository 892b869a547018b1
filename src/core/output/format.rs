//! Structured message blocks written through the output surface.
//!
//! A logical command renders as a sequence of sections:
//!
//! ```text
//! Command: Update
//!     Files:
//!         src/main.c
//!     Output:
//!         C    src/main.c
//!     Completed
//! ```
//!
//! [`MessageFormatter`] produces these sections and, once a command has
//! finished, annotates conflicted lines with gutter icons and inline marks.

use super::conflicts::{CONFLICTS_KEY, CONFLICTS_SCOPE, ConflictRegion, HighlightStyle, scan_conflicts};
use super::surface::OutputSurface;
use crate::error::HypnoResult;
use crate::host::{DrawFlags, EditorHost, RegionSet};
use crate::models::{Gutter, ScrollTo};
use tracing::debug;

/// Default nesting width in spaces.
pub const INDENT_LEVEL: usize = 4;

/// Prefix every line of `text` with `spaces` spaces.
///
/// Lines are split on `\n`, so text with `k` newlines yields `k + 1`
/// indented lines (a trailing newline yields an indented empty last line).
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.split('\n')
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders command sections into an [`OutputSurface`].
pub struct MessageFormatter<'s, H: EditorHost> {
    surface: &'s mut OutputSurface<H>,
}

impl<'s, H: EditorHost> MessageFormatter<'s, H> {
    pub fn new(surface: &'s mut OutputSurface<H>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &OutputSurface<H> {
        self.surface
    }

    pub fn surface_mut(&mut self) -> &mut OutputSurface<H> {
        self.surface
    }

    /// Start a command block.
    ///
    /// The raw command line is echoed only when `outputRawCommand` is set.
    pub fn add_command(&mut self, name: &str, command_line: Option<&str>) -> HypnoResult<()> {
        self.surface.focus()?;
        if self.surface.settings().scroll_to() == ScrollTo::Command {
            self.surface.scroll_to_bottom_aligned()?;
        }
        self.surface.write(&format!("Command: {name}"))?;
        if let Some(command_line) = command_line {
            if self.surface.settings().raw_command() {
                self.surface.write(&indent(command_line, INDENT_LEVEL))?;
            }
        }
        Ok(())
    }

    /// List the files a command operates on.
    pub fn add_files<I, S>(&mut self, paths: I) -> HypnoResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = paths
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        if joined.is_empty() {
            return Ok(());
        }
        self.write_section("Files:", &joined)
    }

    /// Write the tool's standard output.
    pub fn add_result(&mut self, text: &str) -> HypnoResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.write_section("Output:", text)
    }

    /// Write the tool's error output; `code` goes into the header when known.
    pub fn add_error(&mut self, text: &str, code: Option<i32>) -> HypnoResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let code = code.map(|c| c.to_string()).unwrap_or_default();
        self.write_section(&format!("Error: {code}"), text)
    }

    /// Write a free-form message nested under the current command.
    pub fn add_message(&mut self, text: &str) -> HypnoResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.surface.write(&indent(text, INDENT_LEVEL))
    }

    /// Open a `Files:` section whose entries follow one by one.
    pub fn add_files_section(&mut self) -> HypnoResult<()> {
        self.surface.write(&indent("Files:", INDENT_LEVEL))
    }

    /// Open an `Output:` section for streamed results.
    pub fn add_result_section(&mut self) -> HypnoResult<()> {
        self.surface.write(&indent("Output:", INDENT_LEVEL))
    }

    /// Write one streamed line inside a `Files:` or `Output:` section.
    pub fn add_result_message(&mut self, text: &str) -> HypnoResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.surface.write(&indent(text, INDENT_LEVEL * 2))
    }

    /// Open an `Error:` section for streamed error lines.
    pub fn add_error_section(&mut self, code: Option<i32>) -> HypnoResult<()> {
        let code = code.map(|c| c.to_string()).unwrap_or_default();
        self.surface
            .write(&indent(&format!("Error: {code}"), INDENT_LEVEL))
    }

    pub fn end_command(&mut self) -> HypnoResult<()> {
        self.surface.end()
    }

    pub fn clear(&mut self) -> HypnoResult<()> {
        self.surface.clear()
    }

    /// Mark conflicted lines of the existing destination.
    ///
    /// Does nothing when no destination exists yet or when both the gutter
    /// and the inline style are disabled. The previous conflict marks are
    /// replaced as a whole. Returns the regions that were drawn.
    pub fn highlight_conflicts(&mut self) -> HypnoResult<Vec<ConflictRegion>> {
        let settings = self.surface.settings();
        let gutter = settings.gutter();
        let style = settings.highlight();
        if gutter == Gutter::None && style == HighlightStyle::None {
            return Ok(Vec::new());
        }
        let Some(destination) = self.surface.get_existing_only() else {
            return Ok(Vec::new());
        };

        let view = destination.view();
        let text = self.surface.host().text(view);
        let regions = scan_conflicts(&text);
        debug!(%view, conflicts = regions.len(), ?style, "highlighting conflicts");

        let set = RegionSet {
            regions: regions.clone(),
            scope: CONFLICTS_SCOPE.to_string(),
            icon: gutter.icon().map(str::to_string),
            flags: style.draw_flags() | DrawFlags::PERSISTENT,
        };
        self.surface.host_mut().add_regions(view, CONFLICTS_KEY, set);
        Ok(regions)
    }

    fn write_section(&mut self, header: &str, body: &str) -> HypnoResult<()> {
        let block = format!("{header}\n{}", indent(body, INDENT_LEVEL));
        self.surface.write(&indent(&block, INDENT_LEVEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, keys};
    use crate::host::{MemoryHost, Region};
    use insta::assert_snapshot;

    fn surface(mode: &str) -> OutputSurface<MemoryHost> {
        let mut settings = Settings::default();
        settings.set(keys::OUTPUT_TO, mode);
        OutputSurface::new(MemoryHost::new(), settings)
    }

    fn output(surface: &OutputSurface<MemoryHost>) -> String {
        surface
            .get_existing_only()
            .map(|d| surface.host().text(d.view()))
            .unwrap_or_default()
    }

    /// # Indentation
    ///
    /// Verifies that every line, including empty ones, gets the prefix.
    ///
    /// ## Test Scenario
    /// - Indents text with two embedded newlines
    /// - Strips the prefix again
    ///
    /// ## Expected Outcome
    /// - Three lines with exactly four leading spaces each
    /// - Stripping restores the input
    #[test]
    fn test_indent_every_line() {
        let text = "one\n\nthree";
        let indented = indent(text, 4);

        let lines: Vec<&str> = indented.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.starts_with("    ")));
        assert_eq!(lines[1], "    ");

        let stripped: Vec<&str> = lines.iter().map(|l| &l[4..]).collect();
        assert_eq!(stripped.join("\n"), text);
        assert_eq!(indent("", 2), "  ");
    }

    /// # Full Command Block
    ///
    /// Verifies the rendered layout of a complete update.
    ///
    /// ## Test Scenario
    /// - Runs command, files, result and end through a panel
    ///
    /// ## Expected Outcome
    /// - Sections nest by four spaces and end with `Completed`
    #[test]
    fn test_full_command_block() {
        let mut surface = surface("panel");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_command("Update", None).unwrap();
        formatter.add_files(["src/main.c", "src/util.c"]).unwrap();
        formatter
            .add_result("Updating '.':\nC    src/main.c\nAt revision 42.")
            .unwrap();
        formatter.end_command().unwrap();

        assert_snapshot!(
            output(&surface).trim_end(),
            @"Command: Update\n    Files:\n        src/main.c\n        src/util.c\n    Output:\n        Updating '.':\n        C    src/main.c\n        At revision 42.\n    Completed"
        );
    }

    /// # Raw Command Echo
    ///
    /// Verifies the command line is echoed only when enabled.
    ///
    /// ## Test Scenario
    /// - Adds a command with a command line, with the option off then on
    ///
    /// ## Expected Outcome
    /// - The indented command line appears only the second time
    #[test]
    fn test_raw_command_echo() {
        let mut surface = surface("panel");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_command("Status", Some("svn status")).unwrap();
        formatter
            .surface_mut()
            .settings_mut()
            .set(keys::OUTPUT_RAW_COMMAND, true);
        formatter.add_command("Status", Some("svn status")).unwrap();

        assert_snapshot!(
            output(&surface).trim_end(),
            @"Command: Status\nCommand: Status\n    svn status"
        );
    }

    /// # Empty Payloads
    ///
    /// Verifies empty files, results and errors write nothing.
    ///
    /// ## Test Scenario
    /// - Calls each section writer with empty input
    ///
    /// ## Expected Outcome
    /// - No destination is even created
    #[test]
    fn test_empty_payloads_are_noops() {
        let mut surface = surface("tab");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_files(Vec::<String>::new()).unwrap();
        formatter.add_result("").unwrap();
        formatter.add_error("", Some(404)).unwrap();
        formatter.add_message("").unwrap();

        assert_eq!(surface.get_existing_only(), None);
        assert_eq!(surface.host().view_count(), 0);
    }

    /// # Error Header
    ///
    /// Verifies the error code renders as empty text when absent.
    ///
    /// ## Test Scenario
    /// - Writes an error without a code and one with a code
    ///
    /// ## Expected Outcome
    /// - Header is `Error: ` followed by a newline, never a placeholder
    #[test]
    fn test_error_header() {
        let mut surface = surface("panel");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_error("disk full", None).unwrap();
        formatter.add_error("not a working copy", Some(1)).unwrap();

        let text = output(&surface);
        assert!(text.contains("Error: \n        disk full\n"));
        assert!(text.contains("Error: 1\n        not a working copy\n"));
        assert!(!text.contains("None"));
    }

    #[test]
    fn test_streamed_sections() {
        let mut surface = surface("panel");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_command("Diff", None).unwrap();
        formatter.add_files_section().unwrap();
        formatter.add_result_message("a.txt").unwrap();
        formatter.add_error_section(Some(2)).unwrap();
        formatter.add_result_message("E155007").unwrap();
        formatter.add_message("done").unwrap();

        assert_snapshot!(
            output(&surface).trim_end(),
            @"Command: Diff\n    Files:\n        a.txt\n    Error: 2\n        E155007\n    done"
        );
    }

    /// # Scroll On Command
    ///
    /// Verifies the default policy aligns the previous end before a command.
    ///
    /// ## Test Scenario
    /// - Runs two commands with the default `command` scroll policy
    ///
    /// ## Expected Outcome
    /// - The viewport sits on the line where the second command starts
    /// - The destination is focused
    #[test]
    fn test_add_command_scrolls_and_focuses() {
        let mut surface = surface("tab");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_command("Update", None).unwrap();
        formatter.end_command().unwrap();
        formatter.add_command("Commit", None).unwrap();

        let view = surface.get_existing_only().unwrap().view();
        let entry = surface.host().view(view).unwrap();
        assert_eq!(entry.viewport, surface.host().text_to_layout(view, 30));
        assert_eq!(surface.host().focused(), Some(view));
    }

    /// # Conflict Highlighting
    ///
    /// Verifies regions, flags and gutter icon of a highlight pass.
    ///
    /// ## Test Scenario
    /// - Writes status lines with two conflicts, highlights with `squiggly`
    ///
    /// ## Expected Outcome
    /// - Two regions on the `C` lines, persistent squiggly flags, circle icon
    #[test]
    fn test_highlight_conflicts() {
        let mut surface = surface("panel");
        surface.settings_mut().set(keys::OUTPUT_HIGHLIGHT, "squiggly");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter
            .add_result("C    file1.txt\nM    file2.txt\nC    file3.txt")
            .unwrap();
        let regions = formatter.highlight_conflicts().unwrap();

        let view = surface.get_existing_only().unwrap().view();
        let set = surface.host().regions(view, CONFLICTS_KEY).unwrap();
        assert_eq!(set.regions, regions);
        assert_eq!(
            surface.host().view(view).unwrap().region_texts(&regions),
            vec!["C    file1.txt", "C    file3.txt"]
        );
        assert_eq!(set.icon.as_deref(), Some("circle"));
        assert_eq!(set.scope, CONFLICTS_SCOPE);
        assert!(set.flags.contains(DrawFlags::PERSISTENT));
        assert!(set.flags.contains(DrawFlags::DRAW_SQUIGGLY_UNDERLINE));
    }

    /// # Highlight Replaces Previous Marks
    ///
    /// Verifies each pass recomputes the full set from the current text.
    ///
    /// ## Test Scenario
    /// - Highlights, clears, writes a different conflict, highlights again
    ///
    /// ## Expected Outcome
    /// - Only the new conflict is marked
    #[test]
    fn test_highlight_replaces_previous_set() {
        let mut surface = surface("panel");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_result("C    old.txt").unwrap();
        assert_eq!(formatter.highlight_conflicts().unwrap().len(), 1);

        formatter.clear().unwrap();
        formatter.add_result("U    a.txt\nC    new.txt").unwrap();
        let regions = formatter.highlight_conflicts().unwrap();

        let view = surface.get_existing_only().unwrap().view();
        let set = surface.host().regions(view, CONFLICTS_KEY).unwrap();
        assert_eq!(set.regions, regions);
        assert_eq!(
            surface.host().view(view).unwrap().region_texts(&set.regions),
            vec!["C    new.txt"]
        );
    }

    /// # Highlight Skips
    ///
    /// Verifies the pass is skipped without a destination or when disabled.
    ///
    /// ## Test Scenario
    /// - Highlights before any output exists
    /// - Highlights with gutter and style both `none`
    ///
    /// ## Expected Outcome
    /// - No destination is created and no regions are stored
    #[test]
    fn test_highlight_skips() {
        let mut surface = surface("tab");
        let mut formatter = MessageFormatter::new(&mut surface);
        assert!(formatter.highlight_conflicts().unwrap().is_empty());
        assert_eq!(formatter.surface().host().view_count(), 0);

        formatter.add_result("C    file.txt").unwrap();
        formatter
            .surface_mut()
            .settings_mut()
            .set(keys::OUTPUT_GUTTER, "none");
        assert!(formatter.highlight_conflicts().unwrap().is_empty());

        let view = surface.get_existing_only().unwrap().view();
        assert!(surface.host().regions(view, CONFLICTS_KEY).is_none());
    }

    #[test]
    fn test_highlight_without_gutter_icon() {
        let mut surface = surface("panel");
        surface.settings_mut().set(keys::OUTPUT_GUTTER, "none");
        surface.settings_mut().set(keys::OUTPUT_HIGHLIGHT, "outline");
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_result("C    file.txt").unwrap();
        let regions = formatter.highlight_conflicts().unwrap();

        let view = surface.get_existing_only().unwrap().view();
        let set = surface.host().regions(view, CONFLICTS_KEY).unwrap();
        assert_eq!(set.icon, None);
        assert_eq!(set.flags, DrawFlags::DRAW_NO_FILL | DrawFlags::PERSISTENT);
        assert_eq!(regions, vec![Region::new(20, 33)]);
    }
}
