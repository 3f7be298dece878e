//! medcalc-cli library root.
//!
//! Re-exports internal modules so that integration tests can exercise the
//! config, the calculator library and terminal output without going
//! through the command-line parser.

pub mod config;
pub mod library;
pub mod terminal;
