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

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

//! # OnceGate - one-time execution, every caller waits
//!
//! `oncegate` provides a single blocking synchronization primitive for
//! multi-threaded Rust programs:
//!
//! * [`OnceGate`]: a gate that runs a designated action exactly once across
//!   any number of concurrent callers, and lets no caller return before that
//!   action has fully completed.
//!
//! ## Guarantees
//!
//! The gate makes three promises, regardless of how many threads call in and
//! how they interleave:
//!
//! * The action runs at most once over the lifetime of the gate.
//! * Every call returns only after some call's action has fully finished, so
//!   returning from [`execute`] means the one-time work is done.
//! * A caller that observes a completed gate also observes everything the
//!   action wrote, established by release/acquire ordering on the completion
//!   flag.
//!
//! A panicking action still completes the gate: the panic propagates to the
//! caller that ran it, other callers return normally, and the action is never
//! retried.
//!
//! ## Thread Safety
//!
//! [`OnceGate`] implements `Send` and `Sync`, and its constructor is `const`,
//! so gates can be shared across threads or placed in `static`s.
//!
//! [`OnceGate`]: gate::OnceGate
//! [`execute`]: gate::OnceGate::execute

pub(crate) mod sync;

pub mod gate;

#[cfg(test)]
mod tests {
    use crate::gate::OnceGate;

    #[test]
    fn assert_send_and_sync() {
        fn do_assert_send_and_sync<T: Send + Sync>() {}
        do_assert_send_and_sync::<OnceGate>();
    }

    #[test]
    fn assert_unpin() {
        fn do_assert_unpin<T: Unpin>() {}
        do_assert_unpin::<OnceGate>();
    }
}
