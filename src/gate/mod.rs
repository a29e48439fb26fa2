// Copyright 2024 tison <wander4096@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A blocking primitive for one-time execution.
//!
//! The module provides [`OnceGate`]: a gate that runs a designated action
//! exactly once across any number of concurrent callers, and lets no caller
//! return before that action has fully completed.
//!
//! # Design
//!
//! The gate is a flag plus a lock, combined as double-checked locking: every
//! call first performs a lock-free acquire-ordered read of the flag, and only
//! a call that observes a pending gate acquires the lock and re-checks before
//! running the action. Two cheaper-looking shapes fall short of the contract:
//!
//! - A lone compare-and-swap on the flag runs the action exactly once, but a
//!   caller that loses the race returns while the winner's action is still
//!   executing.
//! - Storing the flag before invoking the action lets other callers observe a
//!   completed gate while the action is still executing.
//!
//! The flag is therefore stored with `Release` ordering strictly after the
//! action returns, and the lock holds every concurrent caller until then.

use std::fmt;

use crate::sync::AtomicBool;
use crate::sync::Mutex;
use crate::sync::Ordering;


/// A synchronization primitive which runs a one-time action and blocks every
/// caller until that action has completed.
///
/// Unlike [`std::sync::Once`], a gate whose action panics is not poisoned: the
/// gate is marked completed on every exit path of the one execution attempt,
/// the panic propagates only to the caller that triggered the action, and
/// callers that were blocked while it ran return normally. The action is never
/// retried. Encode failure detection in shared state written by the action
/// (e.g. store a `Result`) when callers need to learn the outcome.
///
/// Once the gate has completed, every later call is a single lock-free atomic
/// load and returns immediately.
///
/// See the [module level documentation](crate::gate) for additional context.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::AtomicUsize;
/// use std::sync::atomic::Ordering;
/// use std::thread;
///
/// use oncegate::gate::OnceGate;
///
/// static GATE: OnceGate = OnceGate::new();
/// static COUNTER: AtomicUsize = AtomicUsize::new(0);
///
/// let handle1 = thread::spawn(|| {
///     GATE.execute(|| {
///         COUNTER.fetch_add(1, Ordering::SeqCst);
///     });
/// });
///
/// let handle2 = thread::spawn(|| {
///     GATE.execute(|| {
///         COUNTER.fetch_add(1, Ordering::SeqCst);
///     });
/// });
///
/// handle1.join().unwrap();
/// handle2.join().unwrap();
///
/// // The counter is incremented only once, even though two threads called `execute`.
/// assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
/// ```
pub struct OnceGate {
    completed: AtomicBool,
    lock: Mutex<()>,
}

impl Default for OnceGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OnceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceGate")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Marks the gate completed when dropped, so the store happens on every exit
/// path of the action, panicking or not.
struct MarkDone<'a> {
    completed: &'a AtomicBool,
}

impl Drop for MarkDone<'_> {
    fn drop(&mut self) {
        // `Release` pairs with the `Acquire` load in `is_completed`, so any
        // caller that observes `true` also observes the action's writes.
        self.completed.store(true, Ordering::Release);
    }
}

impl OnceGate {
    /// Creates a new gate in the pending state.
    ///
    /// # Examples
    ///
    /// ```
    /// use oncegate::gate::OnceGate;
    ///
    /// static GATE: OnceGate = OnceGate::new();
    /// ```
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            completed: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Creates a new gate in the pending state.
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            completed: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Returns `true` if some `execute` call has completed.
    ///
    /// A completed gate stays completed for the rest of its lifetime, even if
    /// the action panicked.
    ///
    /// # Examples
    ///
    /// ```
    /// use oncegate::gate::OnceGate;
    ///
    /// let gate = OnceGate::new();
    ///
    /// assert!(!gate.is_completed());
    ///
    /// gate.execute(|| {});
    ///
    /// assert!(gate.is_completed());
    /// ```
    #[inline(always)]
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Calls the given closure if this is the first time `execute` has been
    /// called on this `OnceGate` instance.
    ///
    /// If another thread is currently running the closure, this call blocks
    /// until that thread completes; every `execute` call returns only once the
    /// one-time action has fully finished, whether it was run by this caller
    /// or another.
    ///
    /// The gate is marked completed even when the closure panics: the panic
    /// propagates to the caller that ran the closure, while callers that were
    /// blocked return normally and no later call runs its closure. The action
    /// is attempted at most once over the lifetime of the gate.
    ///
    /// Calling `execute` recursively on the same `OnceGate` from within the
    /// closure will deadlock, because the closure runs while holding the lock
    /// that the recursive call tries to acquire.
    ///
    /// # Panics
    ///
    /// Panics if and only if the closure runs in this call and panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use oncegate::gate::OnceGate;
    ///
    /// static GATE: OnceGate = OnceGate::new();
    ///
    /// GATE.execute(|| {
    ///     println!("Do some one-time thing.");
    /// });
    /// ```
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce(),
    {
        if self.is_completed() {
            return;
        }

        let _guard = self.lock.lock();

        if self.completed.load(Ordering::Relaxed) {
            // double-checked: another caller completed the action while we
            // were waiting on the lock, which also orders this read.
            return;
        }

        // Declared after `_guard` so it drops first: the completion store
        // happens after the action but before the lock is released.
        let _done = MarkDone {
            completed: &self.completed,
        };
        f();
    }
}
