//! Best-effort page locking for secret buffers.
//!
//! On Unix the buffer's pages are passed to `mlock(2)` so the kernel keeps
//! them out of swap while the cell is alive. Locking commonly fails for
//! unprivileged processes that exceed `RLIMIT_MEMLOCK`; that is not an
//! error for the cell, it only loses the extra protection.
//!
//! Kernel page locks do not stack: one `munlock` releases a page no matter
//! how many buffers on it asked for the lock. Small secrets from different
//! cells routinely share a page, so every locked page is reference counted
//! in a process-wide registry and only unlocked when its last user lets go.
//!
//! On other platforms both calls are no-ops that report "not locked".

/// Try to lock `buf` into RAM. Returns `true` if the OS accepted the request.
pub fn lock(buf: &[u8]) -> bool {
    if buf.is_empty() {
        return false;
    }
    lock_impl(buf)
}

/// Release a lock taken with [`lock`]. Never fails.
///
/// Must be called before the allocation backing `buf` is freed. Pages still
/// used by another locked buffer stay locked.
pub fn unlock(buf: &[u8]) {
    if buf.is_empty() {
        return;
    }
    unlock_impl(buf);
}

#[cfg(unix)]
mod registry {
    use std::collections::BTreeMap;

    use parking_lot::{const_mutex, Mutex};

    /// Page address -> number of locked buffers touching that page.
    static PAGES: Mutex<BTreeMap<usize, usize>> = const_mutex(BTreeMap::new());

    pub(super) fn page_size() -> usize {
        // SAFETY: sysconf has no memory-safety preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    /// Page-aligned start addresses covering `buf`.
    pub(super) fn pages_of(buf: &[u8]) -> impl Iterator<Item = usize> {
        let page = page_size();
        let start = buf.as_ptr() as usize & !(page - 1);
        let end = buf.as_ptr() as usize + buf.len();
        (start..end).step_by(page)
    }

    pub(super) fn lock(buf: &[u8]) -> bool {
        let mut pages = PAGES.lock();

        // Re-locking an already locked page is harmless, so the whole range
        // goes in one call.
        // SAFETY: `buf` is a live slice; mlock only reads the address range.
        let rc = unsafe { libc::mlock(buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
        if rc != 0 {
            tracing::debug!(
                error = %std::io::Error::last_os_error(),
                "mlock unavailable, secret pages may be swapped"
            );
            return false;
        }

        for page in pages_of(buf) {
            *pages.entry(page).or_insert(0) += 1;
        }
        true
    }

    pub(super) fn unlock(buf: &[u8]) {
        let mut pages = PAGES.lock();
        let size = page_size();

        for page in pages_of(buf) {
            let release = match pages.get_mut(&page) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    false
                }
                Some(_) => true,
                None => false,
            };

            if release {
                pages.remove(&page);
                // SAFETY: `page` is a page we locked and still own a mapping
                // to; the result is ignored because nothing useful can be
                // done on failure during teardown.
                let _ = unsafe { libc::munlock(page as *const libc::c_void, size) };
            }
        }
    }

    #[cfg(test)]
    pub(super) fn refs(page: usize) -> usize {
        PAGES.lock().get(&page).copied().unwrap_or(0)
    }
}

#[cfg(unix)]
fn lock_impl(buf: &[u8]) -> bool {
    registry::lock(buf)
}

#[cfg(unix)]
fn unlock_impl(buf: &[u8]) {
    registry::unlock(buf);
}

#[cfg(not(unix))]
fn lock_impl(_buf: &[u8]) -> bool {
    false
}

#[cfg(not(unix))]
fn unlock_impl(_buf: &[u8]) {}
