//! Construction options for a `CypherCell`.

use std::time::Duration;

use super::mask::DEFAULT_MASK_CHAR;

/// How a cell behaves once created.
///
/// Build one with the chained setters:
///
/// ```
/// use std::time::Duration;
/// use cypher_cell::CellOptions;
///
/// let opts = CellOptions::new()
///     .ttl(Duration::from_secs(30))
///     .volatile(true);
/// assert!(opts.is_volatile());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOptions {
    pub(crate) ttl: Option<Duration>,
    pub(crate) volatile: bool,
    pub(crate) lock_memory: bool,
    pub(crate) mask_char: char,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            volatile: false,
            lock_memory: true,
            mask_char: DEFAULT_MASK_CHAR,
        }
    }
}

impl CellOptions {
    /// Options with no TTL, non-volatile, memory locking on, `*` mask.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire the cell `ttl` after construction.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Like [`ttl`](Self::ttl) but accepts an optional value.
    pub fn maybe_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Wipe the cell after the first successful disclosure.
    pub fn volatile(mut self, volatile: bool) -> Self {
        self.volatile = volatile;
        self
    }

    /// Try to `mlock` the secret buffer.
    pub fn lock_memory(mut self, lock: bool) -> Self {
        self.lock_memory = lock;
        self
    }

    /// Character used by masked disclosure.
    pub fn mask_char(mut self, mask: char) -> Self {
        self.mask_char = mask;
        self
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn locks_memory(&self) -> bool {
        self.lock_memory
    }
}
