//! Scoped disposal.
//!
//! A [`CellScope`] borrows a cell and disposes it when the guard goes out
//! of scope, whether the block returns normally, returns early, or
//! unwinds from a panic. The cell itself stays usable afterwards, but
//! every read reports `EmptyCell`.

use std::ops::Deref;

use super::cypher::{CypherCell, WipeReason};

/// RAII guard that wipes its cell on drop. Derefs to the cell.
#[must_use = "the cell is wiped as soon as the scope guard is dropped"]
pub struct CellScope<'a> {
    cell: &'a CypherCell,
}

impl<'a> CellScope<'a> {
    pub fn new(cell: &'a CypherCell) -> Self {
        Self { cell }
    }
}

impl Deref for CellScope<'_> {
    type Target = CypherCell;

    fn deref(&self) -> &CypherCell {
        self.cell
    }
}

impl Drop for CellScope<'_> {
    fn drop(&mut self) {
        self.cell.dispose_for(WipeReason::ScopeExit);
    }
}

impl CypherCell {
    /// Open a disposal scope over this cell.
    ///
    /// ```
    /// use cypher_cell::{CypherCell, CypherCellError};
    ///
    /// let cell = CypherCell::new(b"context-secret", None, false);
    /// {
    ///     let scoped = cell.scope();
    ///     assert_eq!(scoped.reveal().unwrap(), "context-secret");
    /// }
    /// assert!(matches!(cell.reveal(), Err(CypherCellError::EmptyCell)));
    /// ```
    pub fn scope(&self) -> CellScope<'_> {
        CellScope::new(self)
    }

    /// Run `f` with the cell, then dispose it on every exit path.
    pub fn with_scope<R>(&self, f: impl FnOnce(&CypherCell) -> R) -> R {
        let scope = self.scope();
        f(&*scope)
    }
}
