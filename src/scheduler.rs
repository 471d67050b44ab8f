//! Deferred work on a virtual clock.
//!
//! Nothing here reads the wall clock: the host advances time explicitly (the
//! terminal demo from `Instant::now()`, tests by fixed steps), so gesture
//! timers, resize debouncing and frame throttling are deterministic.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// A pointer has been held down long enough to start a drag.
    HoldTimeout,
    /// Apply the last size the host reported.
    ResizeDebounce,
    /// Deliver throttled notifications.
    AnimationFrame,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    /// Keyed by (deadline, handle) so due tasks come out in deadline order,
    /// ties broken by scheduling order.
    queue: BTreeMap<(Duration, TaskHandle), Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.queue.insert((self.now + delay, handle), task);
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let key = self.queue.keys().find(|(_, h)| *h == handle).copied();
        key.is_some_and(|key| self.queue.remove(&key).is_some())
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.keys().any(|(_, h)| *h == handle)
    }

    /// Cancel `previous` (if any) and schedule `task` afresh.
    pub fn reschedule(&mut self, previous: Option<TaskHandle>, delay: Duration, task: Task) -> TaskHandle {
        if let Some(previous) = previous {
            self.cancel(previous);
        }
        self.schedule(delay, task)
    }

    /// Move the clock to `now` and return every task that fell due, earliest
    /// first. The clock never runs backwards.
    pub fn advance_to(&mut self, now: Duration) -> Vec<(TaskHandle, Task)> {
        self.now = self.now.max(now);
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            let ((_, handle), task) = entry.remove_entry();
            due.push((handle, task));
        }
        due
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<(TaskHandle, Task)> {
        self.advance_to(self.now + delta)
    }

    /// Time until the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .keys()
            .next()
            .map(|(deadline, _)| deadline.saturating_sub(self.now))
    }
}
