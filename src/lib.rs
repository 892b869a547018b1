//! # hypnosvn
//!
//! Drive TortoiseSVN and the `svn` CLI from an editor and render what they
//! print into a single output destination. This library provides:
//!
//! - An output surface owning one panel, tab or dialog buffer
//! - A message formatter for `Command:`/`Files:`/`Output:`/`Error:` blocks
//! - Conflict detection and annotation of the rendered text
//! - TortoiseProc and `svn` operations feeding the formatter
//! - Layered settings (defaults, settings file, environment, CLI)
//!
//! ## Quick Start
//!
//! ```rust
//! use hypnosvn::{MessageFormatter, OutputSurface, Settings};
//! use hypnosvn::host::{EditorHost, MemoryHost};
//!
//! # fn main() -> Result<(), hypnosvn::error::HypnoError> {
//! let mut surface = OutputSurface::new(MemoryHost::new(), Settings::default());
//!
//! let mut formatter = MessageFormatter::new(&mut surface);
//! formatter.add_command("Update", None)?;
//! formatter.add_result("C    src/main.c\nAt revision 42.")?;
//! formatter.end_command()?;
//! let conflicts = formatter.highlight_conflicts()?;
//! assert_eq!(conflicts.len(), 1);
//!
//! let view = surface.get_existing_only().unwrap().view();
//! assert!(surface.host().text(view).ends_with("    Completed\n"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod logging;
pub mod models;
pub mod parsed_property;

// Re-export commonly used types for convenience
pub use config::Settings;
pub use core::output::{MessageFormatter, OutputSurface};
pub use models::{Args, Commands, OutputTo};

/// Core result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
