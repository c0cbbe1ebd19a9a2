//! Export of backend statistics to files.

mod csv;

pub use csv::{default_stats_filename, export_stats_csv, write_stats_csv};
