//! # CLI Behavior
//!
//! This is **one possible UI client** for upkeep, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes and
//! output formatting. For the overall architecture see the crate-level
//! documentation of the `upkeep` library.
//!
//! ## Data Directory
//!
//! `--data-dir` wins, then `$UPKEEP_DATA_DIR`, then the platform data
//! directory. Every invocation reads the tables fresh, so several shells (or
//! another UI) can work on the same directory at once.
//!
//! ## Output
//!
//! Lists render as aligned tables; `--json` prints the records instead.
//! Logging goes to stderr and is filtered by `$UPKEEP_LOG` (e.g.
//! `UPKEEP_LOG=upkeep=debug`), or `-v` for debug output.
//!
//! ## Module Structure
//!
//! - `commands`: context setup, dispatch and per-command handlers
//! - `render`: tables, colors, messages
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
