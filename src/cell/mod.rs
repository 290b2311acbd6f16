//! The secret cell and its helpers.
//!
//! This module provides:
//! - The `CypherCell` lifecycle and disclosure state machine (`cypher`)
//! - Construction options (`options`)
//! - Character-boundary suffix masking (`mask`)
//! - Best-effort page locking of the secret buffer (`memlock`)
//! - RAII scope guard that disposes a cell on exit (`scope`)

pub mod cypher;
pub mod mask;
pub mod memlock;
pub mod options;
pub mod scope;

pub use cypher::{CypherCell, REDACTED};
pub use mask::mask_suffix;
pub use options::CellOptions;
pub use scope::CellScope;
