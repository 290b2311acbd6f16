//! Ephemeral in-memory secret container.
//!
//! A [`CypherCell`] owns a copy of a secret and decides when it may be
//! read. It wipes itself on explicit disposal, on scope exit, after a
//! one-time read, once its time-to-live has elapsed, and on drop.

pub mod cell;
pub mod config;
pub mod errors;

pub use cell::{CellOptions, CellScope, CypherCell, REDACTED};
pub use config::Settings;
pub use errors::{CypherCellError, Result};
