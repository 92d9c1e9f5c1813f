//! A virtual time scheduler for deterministic testing.
//!
//! Time only moves when [`VirtualTimeScheduler::advance_by`] or
//! [`VirtualTimeScheduler::advance_to`] is called. Every task due up to the
//! target time runs synchronously inside that call, ordered by due time and
//! then by submission order.
//!
//! ```rust
//! use std::time::Duration;
//! use rxstream::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let fired = std::rc::Rc::new(std::cell::Cell::new(false));
//! let c_fired = fired.clone();
//! scheduler.schedule_once(Duration::from_millis(100), move || c_fired.set(true));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(!fired.get());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert!(fired.get());
//! ```

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

use super::{Scheduler, TaskHandle};
use crate::{rc::MutRc, subscription::SubscriptionLike};

enum Job {
  Once(Box<dyn FnOnce()>),
  Repeating { interval: Duration, task: Box<dyn FnMut()> },
}

struct ScheduledTask {
  due: Duration,
  id: u64,
  job: Job,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.id == other.id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier due first, then FIFO by id
    other.due.cmp(&self.due).then_with(|| other.id.cmp(&self.id))
  }
}

#[derive(Default)]
struct State {
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_id: u64,
}

impl State {
  fn push(&mut self, due: Duration, job: Job, handle: TaskHandle) {
    let id = self.next_id;
    self.next_id += 1;
    self.queue.push(ScheduledTask { due, id, job, handle });
  }
}

/// Logical clock plus a priority queue of pending tasks.
///
/// Clones share the same clock and queue, so a scheduler can be handed to
/// any number of operators and driven from the test body.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler(MutRc<State>);

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// Move the clock forward by `duration`, running every task that becomes
  /// due, including tasks scheduled by those tasks.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Move the clock to `target`. Moving backwards is a no-op.
  pub fn advance_to(&self, target: Duration) {
    loop {
      let task = {
        let mut state = self.0.rc_deref_mut();
        match state.queue.peek() {
          Some(task) if task.due <= target => {}
          _ => break,
        }
        let Some(task) = state.queue.pop() else {
          break;
        };
        if task.due > state.now {
          state.now = task.due;
        }
        task
      };

      if task.handle.is_closed() {
        continue;
      }
      tracing::trace!(due = ?task.due, id = task.id, "virtual task fired");
      match task.job {
        Job::Once(f) => {
          task.handle.mark_finished();
          f();
        }
        Job::Repeating { interval, task: mut f } => {
          f();
          if !task.handle.is_closed() {
            let due = task.due + interval;
            self.0.rc_deref_mut().push(due, Job::Repeating { interval, task: f }, task.handle);
          }
        }
      }
    }

    let mut state = self.0.rc_deref_mut();
    if target > state.now {
      state.now = target;
    }
  }

  /// Number of tasks still waiting to run.
  pub fn pending_count(&self) -> usize {
    self.0.rc_deref().queue.iter().filter(|t| !t.handle.is_closed()).count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { self.0.rc_deref().now }

  fn schedule_once(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    let mut state = self.0.rc_deref_mut();
    let due = state.now + delay;
    state.push(due, Job::Once(Box::new(task)), handle.clone());
    handle
  }

  /// # Panics
  ///
  /// Panics when `interval` is zero: the task would be due again at the same
  /// instant forever and `advance_to` could never return.
  fn schedule_repeating(&self, interval: Duration, task: impl FnMut() + 'static) -> TaskHandle {
    assert!(!interval.is_zero(), "repeating task needs a non-zero interval");
    let handle = TaskHandle::new();
    let mut state = self.0.rc_deref_mut();
    let due = state.now + interval;
    state.push(due, Job::Repeating { interval, task: Box::new(task) }, handle.clone());
    handle
  }
}

impl std::fmt::Debug for VirtualTimeScheduler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VirtualTimeScheduler")
      .field("now", &self.now())
      .field("pending", &self.pending_count())
      .finish()
  }
}
