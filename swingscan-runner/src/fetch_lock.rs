//! Per-credential mutual exclusion around market-data fetches.
//!
//! The upstream provider rate-limits per credential, so every fetch made with
//! one credential goes through a single [`FetchLock`]. Waiters are served in
//! arrival order, give up after their own timeout, and a holder older than the
//! safety ceiling is treated as abandoned and evicted. The screening pipeline
//! itself never takes this lock.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out after {waited_ms} ms waiting for the fetch lock of '{credential}'")]
    Timeout { credential: String, waited_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Holder {
    ticket: u64,
    since: Instant,
}

#[derive(Debug, Default)]
struct LockState {
    holder: Option<Holder>,
    queue: VecDeque<u64>,
    next_ticket: u64,
}

/// FIFO lock with a safety ceiling on how long it may be held.
#[derive(Debug)]
pub struct FetchLock {
    credential: String,
    stale_after: Duration,
    state: Mutex<LockState>,
    wake: Condvar,
}

impl FetchLock {
    pub fn new(credential: impl Into<String>, stale_after: Duration) -> Self {
        Self {
            credential: credential.into(),
            stale_after,
            state: Mutex::new(LockState::default()),
            wake: Condvar::new(),
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until the lock is ours or `timeout` elapses.
    pub fn acquire(&self, timeout: Duration) -> Result<FetchGuard<'_>, LockError> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut st = self.state();
        let ticket = st.next_ticket;
        st.next_ticket += 1;
        st.queue.push_back(ticket);

        loop {
            self.reclaim_stale(&mut st);

            if st.holder.is_none() && st.queue.front() == Some(&ticket) {
                st.queue.pop_front();
                st.holder = Some(Holder {
                    ticket,
                    since: Instant::now(),
                });
                debug!(
                    credential = %self.credential,
                    ticket,
                    waited_ms = start.elapsed().as_millis() as u64,
                    "fetch lock acquired"
                );
                return Ok(FetchGuard { lock: self, ticket });
            }

            let now = Instant::now();
            if now >= deadline {
                st.queue.retain(|t| *t != ticket);
                drop(st);
                // the next waiter may now be at the front
                self.wake.notify_all();
                return Err(LockError::Timeout {
                    credential: self.credential.clone(),
                    waited_ms: timeout.as_millis() as u64,
                });
            }

            let mut wait = deadline - now;
            if let Some(h) = st.holder {
                let stale_at = h.since + self.stale_after;
                wait = wait.min(stale_at.saturating_duration_since(now));
            }
            // wake at least once per millisecond when the holder is already stale
            let wait = wait.max(Duration::from_millis(1));
            st = match self.wake.wait_timeout(st, wait) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// Run `f` while holding the lock. The lock is released on every exit
    /// path, including a panic inside `f`.
    pub fn with_lock<T>(&self, timeout: Duration, f: impl FnOnce() -> T) -> Result<T, LockError> {
        let _guard = self.acquire(timeout)?;
        Ok(f())
    }

    pub fn is_held(&self) -> bool {
        let mut st = self.state();
        self.reclaim_stale(&mut st);
        st.holder.is_some()
    }

    /// Callers currently queued behind the holder.
    pub fn waiting(&self) -> usize {
        self.state().queue.len()
    }

    fn reclaim_stale(&self, st: &mut LockState) {
        if let Some(h) = st.holder {
            let held = h.since.elapsed();
            if held >= self.stale_after {
                warn!(
                    credential = %self.credential,
                    ticket = h.ticket,
                    held_ms = held.as_millis() as u64,
                    "reclaiming abandoned fetch lock"
                );
                st.holder = None;
            }
        }
    }

    fn release(&self, ticket: u64) {
        let mut st = self.state();
        match st.holder {
            Some(h) if h.ticket == ticket => {
                st.holder = None;
                drop(st);
                self.wake.notify_all();
            }
            _ => {
                debug!(
                    credential = %self.credential,
                    ticket,
                    "fetch lock already reclaimed"
                );
            }
        }
    }
}

/// Held fetch lock; dropping it releases the lock.
#[derive(Debug)]
pub struct FetchGuard<'a> {
    lock: &'a FetchLock,
    ticket: u64,
}

impl FetchGuard<'_> {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(self.ticket);
    }
}

/// One [`FetchLock`] per credential, created on first use.
#[derive(Debug)]
pub struct FetchLockRegistry {
    stale_after: Duration,
    locks: Mutex<HashMap<String, Arc<FetchLock>>>,
}

impl FetchLockRegistry {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn lock_for(&self, credential: &str) -> Arc<FetchLock> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            locks
                .entry(credential.to_string())
                .or_insert_with(|| Arc::new(FetchLock::new(credential, self.stale_after))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncontended_acquire_and_release() {
        let lock = FetchLock::new("key", Duration::from_secs(10));
        {
            let guard = lock.acquire(Duration::from_millis(10)).unwrap();
            assert_eq!(guard.ticket(), 0);
            assert!(lock.is_held());
        }
        assert!(!lock.is_held());
        assert_eq!(lock.waiting(), 0);
    }

    #[test]
    fn timeout_leaves_queue_clean() {
        let lock = FetchLock::new("key", Duration::from_secs(10));
        let _held = lock.acquire(Duration::from_millis(10)).unwrap();
        let err = lock.acquire(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, LockError::Timeout { .. }));
        assert_eq!(lock.waiting(), 0);
    }

    #[test]
    fn registry_shares_locks_per_credential() {
        let registry = FetchLockRegistry::new(Duration::from_secs(1));
        let a = registry.lock_for("alpha");
        let b = registry.lock_for("alpha");
        let c = registry.lock_for("beta");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.credential(), "beta");
    }

    #[test]
    fn with_lock_returns_value() {
        let lock = FetchLock::new("key", Duration::from_secs(10));
        let v = lock.with_lock(Duration::from_millis(10), || 7).unwrap();
        assert_eq!(v, 7);
        assert!(!lock.is_held());
    }
}
