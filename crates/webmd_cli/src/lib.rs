//! Command-line front end for webmd: argument resolution, run reporting and
//! environment diagnostics.
pub mod args;
pub mod diag;
pub mod report;

pub use args::{resolve, ArgsError, Cli, USAGE};
pub use report::{retrieved_at_clock, summary_lines};
