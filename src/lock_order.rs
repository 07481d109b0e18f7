//! Debug-build checks for the store/index lock ordering.
//!
//! The record store lock must always be taken before the spatial index lock.
//! Each thread counts the index guards it currently holds; taking the store lock
//! while that count is non-zero trips a debug assertion. Release builds compile
//! all of this away.

#[cfg(debug_assertions)]
use std::cell::Cell;

#[cfg(debug_assertions)]
thread_local! {
    static INDEX_LOCKS_HELD: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as holding the spatial index lock while alive.
pub(crate) struct IndexLockScope {
    _private: (),
}

impl IndexLockScope {
    pub(crate) fn enter() -> Self {
        #[cfg(debug_assertions)]
        INDEX_LOCKS_HELD.with(|held| held.set(held.get() + 1));
        Self { _private: () }
    }
}

impl Drop for IndexLockScope {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        INDEX_LOCKS_HELD.with(|held| held.set(held.get().saturating_sub(1)));
    }
}

/// Called right before the record store takes its own lock.
#[inline]
pub(crate) fn assert_store_lock_allowed() {
    #[cfg(debug_assertions)]
    INDEX_LOCKS_HELD.with(|held| {
        debug_assert_eq!(
            held.get(),
            0,
            "record store lock requested while holding the spatial index lock"
        );
    });
}
