//! Command runners.
//!
//! Each workflow runner wires a library component (`BulkImporter`,
//! `CheckAllPoller`) to the ambient pieces of a CLI invocation: periodic
//! progress logging, the optional status server, Ctrl-C cancellation and the
//! final statistics.

mod check_all;
mod commands;
mod import;
mod init;
mod resources;

pub use check_all::{run_check_all, CheckAllMode, CheckAllReport};
pub use commands::run_cli;
pub use import::{run_import, ImportReport};
pub use init::init_resources;
pub use resources::ClientResources;
