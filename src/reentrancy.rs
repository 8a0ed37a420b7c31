//! Debug-only reentrancy guard.
//!
//! A table calls out to user code mid-operation: key equality, the native
//! hash strategy, and the sink. None of those may call back into the same
//! table while a chain is being walked or relinked. In debug builds the
//! guard records which operation is in progress and panics on a nested
//! entry, naming both operations. In release builds it is a no-op.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Keep !Send + !Sync in line with single-threaded design.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosend: PhantomData,
        }
    }

    /// Marks `op` as running until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> OperationGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(running) = self.active.get() {
                panic!("reentrant call to HashTable::{op} while {running} is in progress");
            }
            self.active.set(Some(op));
            OperationGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            OperationGuard { _z: PhantomData }
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<&'static str> {
        #[cfg(debug_assertions)]
        {
            self.active.get()
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

pub(crate) struct OperationGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for OperationGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_operations_are_ok() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter("put");
        }
        let _g = r.enter("get");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn guard_tracks_running_operation() {
        let r = DebugReentrancy::new();
        assert_eq!(r.current(), None);
        {
            let _g = r.enter("remove");
            assert_eq!(r.current(), Some("remove"));
        }
        assert_eq!(r.current(), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_with_both_names() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("put");
            let _inner = r.enter("get");
        }));
        let err = res.expect_err("expected reentrancy to panic in debug builds");
        let msg = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("HashTable::get"), "{msg}");
        assert!(msg.contains("put is in progress"), "{msg}");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _g1 = r.enter("put");
        let _g2 = r.enter("get");
        assert_eq!(r.current(), None);
    }
}
