//! # warren_sched
//!
//! The time-ordered deferred action queue driving all "do X, then after D
//! time units do Y" behaviour in the simulation, without ever blocking the
//! tick thread.
//!
//! The queue is generic over the execution context `C` (the simulation
//! world, in practice) so that this crate carries no world model of its
//! own. Scheduled work is guarded: every entry captures a validity check
//! that is re-evaluated when the entry comes due, and an entry whose guard
//! fails is dropped silently — there is no error, no retry, and no
//! cancellation signal.
//!
//! Two layers:
//!
//! - [`DelayQueue`] — a binary min-heap of guarded one-shot actions keyed
//!   by absolute target time.
//! - [`DelayId`] handles — a two-state (pending/completed) awaitable with
//!   an ordered continuation list, for logic that suspends at a delay
//!   point and resumes when the queue reaches that time.

pub mod queue;

pub use queue::{Action, DelayId, DelayQueue, Guard, QueueHost};
