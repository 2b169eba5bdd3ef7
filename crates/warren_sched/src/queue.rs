//! The delay queue and the two-state delay primitive.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A validity check re-evaluated when a scheduled entry comes due.
pub type Guard<C> = Box<dyn Fn(&C) -> bool + Send>;

/// A deferred unit of work, executed at most once.
pub type Action<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Implemented by the execution context so the queue can be driven while
/// it is owned by that same context.
pub trait QueueHost: Sized {
    /// The context's own delay queue.
    fn delay_queue(&mut self) -> &mut DelayQueue<Self>;
}

/// Handle to a two-state delay created by [`DelayQueue::delay_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayId(u64);

/// What a popped heap entry does.
enum Job<C> {
    /// Run a guarded one-shot action.
    Run { guard: Guard<C>, action: Action<C> },
    /// Complete a pending delay, firing its continuations.
    Complete(DelayId),
}

struct Entry<C> {
    target: u64,
    seq: u64,
    job: Job<C>,
}

// Heap order: earliest target first, then insertion order. `BinaryHeap`
// pops the maximum, so the comparison is reversed.
impl<C> Ord for Entry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .target
            .cmp(&self.target)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.seq == other.seq
    }
}

impl<C> Eq for Entry<C> {}

enum DelayState<C> {
    /// Waiting for its target time; continuations fire in attachment order.
    Pending(Vec<Action<C>>),
    /// Target reached; further attachments fire immediately.
    Completed,
}

struct DelaySlot<C> {
    guard: Guard<C>,
    state: DelayState<C>,
}

/// A time-ordered priority queue of deferred, guarded actions.
///
/// The queue keeps its own notion of current time: it advances to each
/// entry's target as the entry is popped, and the tick driver raises it
/// to the simulation clock via [`DelayQueue::sync`] before draining.
pub struct DelayQueue<C> {
    heap: BinaryHeap<Entry<C>>,
    delays: HashMap<DelayId, DelaySlot<C>>,
    now: u64,
    seq: u64,
    next_delay: u64,
}

impl<C> Default for DelayQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DelayQueue<C> {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            delays: HashMap::new(),
            now: 0,
            seq: 0,
            next_delay: 0,
        }
    }

    /// The queue's current time: the largest of the synced simulation time
    /// and the targets of all entries executed so far.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of pending heap entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no entries are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Raise the queue's current time to `now`. Never moves time backward.
    pub fn sync(&mut self, now: u64) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Schedule `action` to run `delay` time units from now. Negative
    /// delays are clamped to zero. Returns the absolute target time.
    ///
    /// The entry only runs if `guard` still passes when it comes due; a
    /// failed guard drops the entry silently.
    pub fn schedule(&mut self, delay: i64, guard: Guard<C>, action: Action<C>) -> u64 {
        let target = self.now + delay.max(0) as u64;
        self.schedule_at(target, guard, action);
        target
    }

    /// Schedule `action` at an absolute target time.
    pub fn schedule_at(&mut self, target: u64, guard: Guard<C>, action: Action<C>) {
        self.push(target, Job::Run { guard, action });
    }

    /// Create a delay completing at the absolute time `target`.
    ///
    /// A target at or before the current time yields an already-completed
    /// delay, so attaching to it fires immediately.
    pub fn delay_at(&mut self, target: u64, guard: Guard<C>) -> DelayId {
        let id = DelayId(self.next_delay);
        self.next_delay += 1;
        if target <= self.now {
            self.delays.insert(
                id,
                DelaySlot {
                    guard,
                    state: DelayState::Completed,
                },
            );
        } else {
            self.delays.insert(
                id,
                DelaySlot {
                    guard,
                    state: DelayState::Pending(Vec::new()),
                },
            );
            self.push(target, Job::Complete(id));
        }
        id
    }

    fn push(&mut self, target: u64, job: Job<C>) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry { target, seq, job });
    }

    fn pop_due(&mut self, until: u64) -> Option<Entry<C>> {
        if self.heap.peek()?.target > until {
            return None;
        }
        let entry = self.heap.pop()?;
        if entry.target > self.now {
            self.now = entry.target;
        }
        Some(entry)
    }
}

impl<C: QueueHost> DelayQueue<C> {
    /// Pop and execute every entry with a target at or before `until`, in
    /// ascending target order (insertion order for equal targets).
    ///
    /// Each entry's guard is re-evaluated as it is popped; a failed guard
    /// drops the action or delay without executing anything. Actions may
    /// schedule further work, which runs in the same drain if it is due.
    pub fn run_due(ctx: &mut C, until: u64) {
        while let Some(entry) = ctx.delay_queue().pop_due(until) {
            match entry.job {
                Job::Run { guard, action } => {
                    if guard(ctx) {
                        action(ctx);
                    }
                }
                Job::Complete(id) => {
                    let Some(slot) = ctx.delay_queue().delays.remove(&id) else {
                        continue;
                    };
                    if !(slot.guard)(ctx) {
                        // Owner gone: the delay and all its continuations
                        // vanish without a signal.
                        continue;
                    }
                    let continuations = match slot.state {
                        DelayState::Pending(list) => list,
                        DelayState::Completed => Vec::new(),
                    };
                    ctx.delay_queue().delays.insert(
                        id,
                        DelaySlot {
                            guard: slot.guard,
                            state: DelayState::Completed,
                        },
                    );
                    for continuation in continuations {
                        continuation(ctx);
                    }
                }
            }
        }
    }

    /// Attach a continuation to a delay.
    ///
    /// Pending: queued to fire, in attachment order, when the delay
    /// completes. Completed: fires immediately if the delay's guard still
    /// passes. Unknown (cancelled) delays swallow the continuation.
    pub fn attach(ctx: &mut C, id: DelayId, action: Action<C>) {
        let Some(slot) = ctx.delay_queue().delays.remove(&id) else {
            return;
        };
        match slot.state {
            DelayState::Pending(mut list) => {
                list.push(action);
                ctx.delay_queue().delays.insert(
                    id,
                    DelaySlot {
                        guard: slot.guard,
                        state: DelayState::Pending(list),
                    },
                );
            }
            DelayState::Completed => {
                let ok = (slot.guard)(ctx);
                ctx.delay_queue().delays.insert(id, slot);
                if ok {
                    action(ctx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        queue: DelayQueue<Ctx>,
        log: Vec<u64>,
        alive: bool,
    }

    impl Ctx {
        fn new() -> Self {
            Self {
                queue: DelayQueue::new(),
                log: Vec::new(),
                alive: true,
            }
        }
    }

    impl QueueHost for Ctx {
        fn delay_queue(&mut self) -> &mut DelayQueue<Self> {
            &mut self.queue
        }
    }

    fn always(_: &Ctx) -> bool {
        true
    }

    fn log(tag: u64) -> Action<Ctx> {
        Box::new(move |ctx: &mut Ctx| ctx.log.push(tag))
    }

    #[test]
    fn test_run_due_orders_by_target() {
        let mut ctx = Ctx::new();
        for delay in [5, 1, 3] {
            ctx.queue.schedule(delay, Box::new(always), log(delay as u64));
        }
        DelayQueue::run_due(&mut ctx, 10);
        assert_eq!(ctx.log, vec![1, 3, 5]);
        // Queue time ends at the largest target reached, not the drain bound.
        assert_eq!(ctx.queue.now(), 5);
    }

    #[test]
    fn test_equal_targets_run_in_insertion_order() {
        let mut ctx = Ctx::new();
        for tag in 0..4 {
            ctx.queue.schedule(2, Box::new(always), log(tag));
        }
        DelayQueue::run_due(&mut ctx, 2);
        assert_eq!(ctx.log, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_entries_beyond_until_stay_queued() {
        let mut ctx = Ctx::new();
        ctx.queue.schedule(5, Box::new(always), log(5));
        DelayQueue::run_due(&mut ctx, 4);
        assert!(ctx.log.is_empty());
        assert_eq!(ctx.queue.len(), 1);
        DelayQueue::run_due(&mut ctx, 5);
        assert_eq!(ctx.log, vec![5]);
    }

    #[test]
    fn test_failed_guard_drops_action_silently() {
        let mut ctx = Ctx::new();
        ctx.queue
            .schedule(1, Box::new(|ctx: &Ctx| ctx.alive), log(1));
        ctx.queue.schedule(2, Box::new(always), log(2));
        ctx.alive = false;
        DelayQueue::run_due(&mut ctx, 5);
        assert_eq!(ctx.log, vec![2]);
    }

    #[test]
    fn test_negative_delay_clamps_to_now() {
        let mut ctx = Ctx::new();
        ctx.queue.sync(7);
        let target = ctx.queue.schedule(-3, Box::new(always), log(0));
        assert_eq!(target, 7);
    }

    #[test]
    fn test_actions_can_schedule_more_work() {
        let mut ctx = Ctx::new();
        ctx.queue.schedule(
            1,
            Box::new(always),
            Box::new(|ctx: &mut Ctx| {
                ctx.log.push(1);
                ctx.queue.schedule(1, Box::new(always), log(2));
            }),
        );
        DelayQueue::run_due(&mut ctx, 10);
        assert_eq!(ctx.log, vec![1, 2]);
    }

    #[test]
    fn test_delay_continuations_fire_in_attachment_order() {
        let mut ctx = Ctx::new();
        let id = ctx.queue.delay_at(3, Box::new(always));
        DelayQueue::attach(&mut ctx, id, log(1));
        DelayQueue::attach(&mut ctx, id, log(2));
        DelayQueue::attach(&mut ctx, id, log(3));
        DelayQueue::run_due(&mut ctx, 3);
        assert_eq!(ctx.log, vec![1, 2, 3]);
    }

    #[test]
    fn test_attach_to_completed_delay_fires_immediately() {
        let mut ctx = Ctx::new();
        let id = ctx.queue.delay_at(1, Box::new(always));
        DelayQueue::run_due(&mut ctx, 1);
        assert!(ctx.log.is_empty());
        DelayQueue::attach(&mut ctx, id, log(9));
        assert_eq!(ctx.log, vec![9]);
    }

    #[test]
    fn test_delay_at_past_target_is_already_completed() {
        let mut ctx = Ctx::new();
        ctx.queue.sync(5);
        let id = ctx.queue.delay_at(5, Box::new(always));
        DelayQueue::attach(&mut ctx, id, log(1));
        assert_eq!(ctx.log, vec![1]);
    }

    #[test]
    fn test_cancelled_delay_never_fires_continuations() {
        let mut ctx = Ctx::new();
        let id = ctx.queue.delay_at(2, Box::new(|ctx: &Ctx| ctx.alive));
        DelayQueue::attach(&mut ctx, id, log(1));
        ctx.alive = false;
        DelayQueue::run_due(&mut ctx, 5);
        assert!(ctx.log.is_empty());
        // The slot is gone; later attachments are swallowed too.
        ctx.alive = true;
        DelayQueue::attach(&mut ctx, id, log(2));
        assert!(ctx.log.is_empty());
    }
}
