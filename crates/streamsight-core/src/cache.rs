//! Memoization cell with explicit cache states.
//!
//! Replaces ad-hoc "remember the promise" memoization with a small state
//! machine: `Empty` (nothing cached), `Pending` (one filler in flight),
//! `Resolved` (value cached until invalidated). Concurrent first calls
//! coalesce into a single underlying fill; there is exactly one writer at
//! a time.

use parking_lot::Mutex;
use std::future::Future;
use tokio::sync::Notify;

use crate::error::Result;

/// Cache state of a [`CacheCell`].
#[derive(Debug)]
enum CacheState<T> {
    Empty,
    Pending,
    Resolved(T),
}

/// A manually invalidated memoization cell.
///
/// No TTL: the value lives until [`CacheCell::invalidate`]. A failed fill
/// resets the cell to `Empty` and wakes waiters so one of them can retry.
pub struct CacheCell<T> {
    state: Mutex<CacheState<T>>,
    changed: Notify,
}

impl<T: Clone> CacheCell<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::Empty),
            changed: Notify::new(),
        }
    }

    /// Return the cached value, filling the cell with `fill` if needed.
    ///
    /// The first caller on an empty cell runs `fill`; callers arriving
    /// while the fill is in flight wait for its outcome instead of issuing
    /// their own. `fill` runs outside the state lock.
    pub async fn get_or_fill<F, Fut>(&self, fill: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);

            let fills = {
                let mut state = self.state.lock();
                match &*state {
                    CacheState::Resolved(value) => return Ok(value.clone()),
                    CacheState::Empty => {
                        *state = CacheState::Pending;
                        true
                    }
                    CacheState::Pending => {
                        // Register for the wake-up while still holding the
                        // lock so a notify between unlock and await is not
                        // lost.
                        notified.as_mut().enable();
                        false
                    }
                }
            };

            if !fills {
                notified.await;
                continue;
            }

            // This caller is the single writer. The guard puts the cell
            // back to Empty if the fill future is dropped before
            // completing.
            let guard = PendingGuard { cell: self };
            let outcome = fill().await;
            std::mem::forget(guard);
            let mut state = self.state.lock();
            return match outcome {
                Ok(value) => {
                    *state = CacheState::Resolved(value.clone());
                    drop(state);
                    self.changed.notify_waiters();
                    Ok(value)
                }
                Err(err) => {
                    *state = CacheState::Empty;
                    drop(state);
                    self.changed.notify_waiters();
                    Err(err)
                }
            };
        }
    }

    /// Drop any cached or in-flight value.
    ///
    /// A fill already in flight still completes and writes its result; the
    /// next invalidation clears that too.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        if matches!(&*state, CacheState::Resolved(_)) {
            *state = CacheState::Empty;
        }
        drop(state);
        self.changed.notify_waiters();
    }

    /// The cached value, if the cell is resolved.
    pub fn peek(&self) -> Option<T> {
        match &*self.state.lock() {
            CacheState::Resolved(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Whether a value is currently cached.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.lock(), CacheState::Resolved(_))
    }
}

impl<T: Clone> Default for CacheCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resets a `Pending` cell to `Empty` when the filler is dropped mid-fill.
struct PendingGuard<'a, T> {
    cell: &'a CacheCell<T>,
}

impl<T> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.cell.state.lock();
        if matches!(&*state, CacheState::Pending) {
            *state = CacheState::Empty;
        }
        drop(state);
        self.cell.changed.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_call_reuses_value() {
        let cell = CacheCell::new();
        let calls = AtomicUsize::new(0);
        let fill = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7u32)
        };
        assert_eq!(cell.get_or_fill(fill).await.unwrap(), 7);
        assert_eq!(cell.get_or_fill(fill).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_refills() {
        let cell = CacheCell::new();
        let calls = AtomicUsize::new(0);
        let fill = || async {
            Ok(calls.fetch_add(1, Ordering::SeqCst))
        };
        assert_eq!(cell.get_or_fill(fill).await.unwrap(), 0);
        cell.invalidate();
        assert!(!cell.is_resolved());
        assert_eq!(cell.get_or_fill(fill).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_coalesce() {
        let cell = Arc::new(CacheCell::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cell.get_or_fill(|| {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(42u32)
                    }
                })
                .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fill_resets_to_empty() {
        let cell: CacheCell<u32> = CacheCell::new();
        let err = cell
            .get_or_fill(|| async { Err(Error::Network("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(!cell.is_resolved());
        assert_eq!(cell.get_or_fill(|| async { Ok(5u32) }).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_peek() {
        let cell = CacheCell::new();
        assert_eq!(cell.peek(), None);
        cell.get_or_fill(|| async { Ok("v".to_string()) }).await.unwrap();
        assert_eq!(cell.peek(), Some("v".to_string()));
    }
}
