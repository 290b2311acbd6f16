//! The `CypherCell` secret container.
//!
//! A cell copies the caller's bytes into a buffer it owns and guards every
//! read with a small state machine:
//!
//! ```text
//!   Alive ──(ttl elapsed, on access)──► Wiped   (caller gets Expired)
//!   Alive ──(volatile read succeeds)──► Wiped   (caller gets the value)
//!   Alive ──(dispose / scope exit / drop)──► Wiped
//!   Wiped ──(anything)──► Wiped                 (reads get EmptyCell)
//! ```
//!
//! All mutable state sits behind one mutex and every operation takes it
//! exactly once, so the expiry check, the read and any resulting wipe are a
//! single atomic step. Expiry is checked lazily; there is no timer thread.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::config::Settings;
use crate::errors::{CypherCellError, Result};

use super::mask::mask_suffix;
use super::memlock;
use super::options::CellOptions;

/// The only text a cell ever renders as, in every state.
pub const REDACTED: &str = "[REDACTED]";

/// Why a cell was wiped. Used as a log field only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WipeReason {
    Disposed,
    ScopeExit,
    Expired,
    Consumed,
}

impl WipeReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Disposed => "disposed",
            Self::ScopeExit => "scope-exit",
            Self::Expired => "expired",
            Self::Consumed => "consumed",
        }
    }
}

/// Mutable part of a cell, only ever touched under the mutex.
struct CellState {
    buffer: Vec<u8>,
    wiped: bool,
    locked: bool,
}

impl CellState {
    /// Zero the buffer in place and mark the cell wiped.
    ///
    /// Returns `true` if this call performed the wipe, `false` if the cell
    /// was already wiped. Does not allocate and cannot panic.
    fn wipe(&mut self) -> bool {
        if self.wiped {
            return false;
        }

        // Zero in place (volatile writes), keeping the length.
        self.buffer.as_mut_slice().zeroize();

        if self.locked {
            memlock::unlock(&self.buffer);
            self.locked = false;
        }

        self.wiped = true;
        true
    }
}

/// An in-memory secret that controls its own disclosure and destruction.
///
/// `CypherCell` is `Send + Sync`; share it behind an `Arc` when several
/// threads need it. Formatting with `{}` or `{:?}` and serializing with
/// serde always produce [`REDACTED`].
pub struct CypherCell {
    state: Mutex<CellState>,
    created_at: Instant,
    ttl: Option<Duration>,
    volatile: bool,
    mask_char: char,
}

impl CypherCell {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a cell holding a copy of `secret`.
    ///
    /// `ttl` of `None` means the cell never expires from time alone.
    /// A `volatile` cell is wiped by its first successful disclosure.
    pub fn new(secret: &[u8], ttl: Option<Duration>, volatile: bool) -> Self {
        Self::with_options(
            secret,
            CellOptions::new().maybe_ttl(ttl).volatile(volatile),
        )
    }

    /// Create a cell with the full option set.
    pub fn with_options(secret: &[u8], options: CellOptions) -> Self {
        // `to_vec` allocates exactly `len` bytes, so no spare capacity
        // can hold a stale copy.
        let buffer = secret.to_vec();
        let locked = options.lock_memory && memlock::lock(&buffer);

        debug!(
            ttl = ?options.ttl,
            volatile = options.volatile,
            locked,
            "cypher cell created"
        );

        Self {
            state: Mutex::new(CellState {
                buffer,
                wiped: false,
                locked,
            }),
            created_at: Instant::now(),
            ttl: options.ttl,
            volatile: options.volatile,
            mask_char: options.mask_char,
        }
    }

    /// Create a cell using the defaults from a loaded [`Settings`].
    pub fn from_settings(secret: &[u8], settings: &Settings) -> Self {
        Self::with_options(secret, settings.cell_options())
    }

    // ------------------------------------------------------------------
    // Disclosure
    // ------------------------------------------------------------------

    /// Return the secret as text.
    ///
    /// Fails with `EmptyCell` once wiped, with `Expired` (wiping the cell)
    /// when the TTL has elapsed, and with `InvalidEncoding` if the bytes
    /// are not UTF-8. A volatile cell is wiped after a successful call.
    pub fn reveal(&self) -> Result<String> {
        self.disclose(true, |bytes| decode(bytes).map(str::to_owned))
    }

    /// Return the secret with all but the last `visible` characters
    /// replaced by the mask character.
    ///
    /// Same checks and volatile consumption as [`reveal`](Self::reveal).
    pub fn reveal_masked(&self, visible: usize) -> Result<String> {
        let mask = self.mask_char;
        self.disclose(true, |bytes| {
            decode(bytes).map(|text| mask_suffix(text, visible, mask))
        })
    }

    /// Return a copy of the raw bytes, zeroized when the caller drops it.
    ///
    /// Works for secrets that are not valid UTF-8. Same checks and
    /// volatile consumption as [`reveal`](Self::reveal).
    pub fn reveal_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.disclose(true, |bytes| Ok(Zeroizing::new(bytes.to_vec())))
    }

    /// Compare `candidate` with the secret in constant time.
    ///
    /// Nothing is disclosed, so a volatile cell is not consumed. The TTL
    /// and wiped checks still apply.
    pub fn verify(&self, candidate: &[u8]) -> Result<bool> {
        self.disclose(false, |bytes| Ok(bool::from(bytes.ct_eq(candidate))))
    }

    /// Run the access checks, then `read` the buffer, all under one lock.
    fn disclose<T>(
        &self,
        consumes: bool,
        read: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock();

        // 1. Wiped cells never disclose.
        if state.wiped {
            return Err(CypherCellError::EmptyCell);
        }

        // 2. Lazy expiry: the access that notices performs the wipe.
        if self.ttl_elapsed() {
            state.wipe();
            debug!(reason = WipeReason::Expired.as_str(), "cypher cell wiped");
            return Err(CypherCellError::Expired);
        }

        // 3. Read. A failed decode leaves the cell alive.
        let value = read(&state.buffer)?;

        // 4. One-time cells are destroyed before control returns.
        if consumes && self.volatile {
            state.wipe();
            debug!(reason = WipeReason::Consumed.as_str(), "cypher cell wiped");
        }

        Ok(value)
    }

    // ------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------

    /// Zero the secret and mark the cell wiped.
    ///
    /// Idempotent and infallible; safe from any thread and from cleanup
    /// paths. Only the first call does any work.
    pub fn dispose(&self) {
        self.dispose_for(WipeReason::Disposed);
    }

    pub(crate) fn dispose_for(&self, reason: WipeReason) {
        if self.state.lock().wipe() {
            debug!(reason = reason.as_str(), "cypher cell wiped");
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Whether the cell has been wiped. Has no side effects; an expired but
    /// not yet accessed cell still reports `false`.
    pub fn is_wiped(&self) -> bool {
        self.state.lock().wiped
    }

    /// Time left before the TTL elapses, or `None` for cells without one.
    ///
    /// Returns `Duration::ZERO` once elapsed. Does not wipe.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        self.ttl
            .map(|ttl| ttl.saturating_sub(self.created_at.elapsed()))
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    fn ttl_elapsed(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() >= ttl,
            None => false,
        }
    }
}

/// Decode the buffer as UTF-8 without copying.
fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| CypherCellError::InvalidEncoding)
}

// ── Destruction ──────────────────────────────────────────────────────

impl Drop for CypherCell {
    fn drop(&mut self) {
        // Exclusive access to the cell: no cell lock, no logging, no
        // allocation. A locked buffer still passes through the page registry.
        self.state.get_mut().wipe();
    }
}

// ── Redacted representations ─────────────────────────────────────────

impl fmt::Debug for CypherCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for CypherCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for CypherCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
