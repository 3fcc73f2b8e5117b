//! Command-line front-end
//!
//! Loads programs, runs the interpreter and prints what a viewer would
//! show: the point table, point details, source context and total time.

pub mod report;
pub mod runner;
pub mod watch;

pub use runner::{interpret, load_catalog, run, run_with_config};
