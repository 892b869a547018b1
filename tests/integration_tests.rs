//! Integration tests for the hypnosvn library
//!
//! These tests drive the public API the way an editor integration would:
//! one surface for the whole session, commands rendered through the
//! formatter, and close notifications from the host.

use hypnosvn::config::keys;
use hypnosvn::core::output::{CONFLICTS_KEY, Destination, VIEW_NAME};
use hypnosvn::host::{DrawFlags, EditorHost, MemoryHost};
use hypnosvn::{MessageFormatter, OutputSurface, Settings};
use std::path::Path;

fn settings(mode: &str) -> Settings {
    let mut settings = Settings::default();
    settings.set(keys::OUTPUT_TO, mode);
    settings
}

fn text_of(surface: &OutputSurface<MemoryHost>) -> String {
    surface
        .get_existing_only()
        .map(|d| surface.host().text(d.view()))
        .unwrap_or_default()
}

#[test]
fn test_session_in_panel() {
    let mut surface = OutputSurface::new(MemoryHost::new(), settings("panel"));
    surface.settings_mut().set(keys::OUTPUT_HIGHLIGHT, "fill");

    let mut formatter = MessageFormatter::new(&mut surface);
    formatter.add_command("Update", Some("svn update")).unwrap();
    formatter.add_files(["trunk/a.c"]).unwrap();
    formatter
        .add_result("Updating 'trunk':\r\nC    trunk/a.c\r\nUpdated to revision 7.\r\n")
        .unwrap();
    formatter.end_command().unwrap();
    let regions = formatter.highlight_conflicts().unwrap();

    let text = text_of(&surface);
    assert!(!text.contains('\r'));
    assert_eq!(regions.len(), 1);
    assert_eq!(&text[regions[0].start..regions[0].end], "C    trunk/a.c");

    let view = surface.get_existing_only().unwrap().view();
    let set = surface.host().regions(view, CONFLICTS_KEY).unwrap();
    assert_eq!(set.flags, DrawFlags::DRAW_NO_OUTLINE | DrawFlags::PERSISTENT);
}

#[test]
fn test_tab_survives_across_commands_until_closed() {
    let mut surface = OutputSurface::new(MemoryHost::new(), settings("tab"));

    for name in ["Update", "Commit"] {
        let mut formatter = MessageFormatter::new(&mut surface);
        formatter.add_command(name, None).unwrap();
        formatter.end_command().unwrap();
    }
    let first = surface.get_existing_only().unwrap();
    assert!(matches!(first, Destination::Tab(_)));
    assert_eq!(
        text_of(&surface),
        "Command: Update\n    Completed\nCommand: Commit\n    Completed\n"
    );

    // User closes the tab; the editor integration reports it
    surface.host_mut().close_view(first.view()).unwrap();
    surface.notify_closed(first.view());

    MessageFormatter::new(&mut surface)
        .add_command("Diff", None)
        .unwrap();
    let second = surface.get_existing_only().unwrap();
    assert_ne!(first, second);
    assert_eq!(surface.host().view_name(second.view()).as_deref(), Some(VIEW_NAME));
    assert_eq!(text_of(&surface), "Command: Diff\n");
}

#[test]
fn test_dialog_mode_shows_one_dialog_per_command() {
    let mut surface = OutputSurface::new(MemoryHost::new(), settings("dialog"));

    let mut formatter = MessageFormatter::new(&mut surface);
    formatter.add_command("Status", None).unwrap();
    formatter.add_error("svn: E155007", Some(1)).unwrap();
    formatter.end_command().unwrap();
    assert!(formatter.highlight_conflicts().unwrap().is_empty());

    assert_eq!(
        surface.host().dialogs(),
        &["Command: Status\n    Error: 1\n        svn: E155007\n".to_string()]
    );
    assert_eq!(surface.host().view_count(), 0);
}

#[test]
fn test_settings_from_json_document() {
    let json = r#"{
        "outputTo": "tab",
        "outputScrollTo": "bottom",
        "outputGutter": "none",
        "outputHighlight": 7
    }"#;
    let loaded = Settings::from_json_str(json, Path::new("HypnoSVN.sublime-settings")).unwrap();
    let settings = Settings::default().merge(loaded);

    let mut surface = OutputSurface::new(MemoryHost::new(), settings);
    let mut formatter = MessageFormatter::new(&mut surface);
    formatter.add_result("C    x.txt").unwrap();

    // Gutter disabled and a non-string style falls back to none: nothing to draw
    assert!(formatter.highlight_conflicts().unwrap().is_empty());
    let view = surface.get_existing_only().unwrap().view();
    assert_eq!(surface.host().view(view).unwrap().shown_point, Some(31));
}

#[test]
fn test_library_version() {
    let version = hypnosvn::VERSION;
    assert!(!version.is_empty());
    assert!(version.contains('.'));
}
