//! Schedulers decide *when* work runs.
//!
//! Time-based operators never read a clock or spawn a timer directly; they
//! take a [`Scheduler`] value. Production code uses a real-time scheduler
//! ([`LocalPoolScheduler`] or [`TokioLocalScheduler`]); tests inject a
//! [`VirtualTimeScheduler`] and move the clock by hand.
//!
//! Every scheduled task hands back a [`TaskHandle`], which is a
//! [`SubscriptionLike`] and can be registered as a [`Teardown`] so that an
//! unsubscribed chain cancels its pending timers.

use std::time::Duration;

use crate::{
  rc::MutRc,
  subscription::{SubscriptionLike, Teardown},
};

mod virtual_time;
pub use virtual_time::VirtualTimeScheduler;

#[cfg(feature = "futures-scheduler")]
mod local_pool;
#[cfg(feature = "futures-scheduler")]
pub use local_pool::LocalPoolScheduler;

#[cfg(feature = "tokio-scheduler")]
mod tokio_local;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_local::TokioLocalScheduler;

/// A Scheduler is an object to order task and schedule their execution.
pub trait Scheduler: Clone + 'static {
  /// Time elapsed on this scheduler's clock since its origin.
  fn now(&self) -> Duration;

  /// Run `task` once, `delay` after now.
  fn schedule_once(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle;

  /// Run `task` every `interval`, first run one `interval` after now, until
  /// the returned handle is cancelled.
  fn schedule_repeating(&self, interval: Duration, task: impl FnMut() + 'static) -> TaskHandle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskStatus {
  Pending,
  Finished,
  Cancelled,
}

struct TaskInner {
  status: TaskStatus,
  abort: Option<Box<dyn FnOnce()>>,
}

/// Cancellation handle of a scheduled task.
///
/// Clones refer to the same task. Cancelling a task that already ran, or was
/// already cancelled, does nothing.
#[derive(Clone)]
pub struct TaskHandle(MutRc<TaskInner>);

impl TaskHandle {
  pub fn new() -> Self { Self(MutRc::own(TaskInner { status: TaskStatus::Pending, abort: None })) }

  /// A handle for a task that has nothing left to do.
  pub fn finished() -> Self {
    let handle = Self::new();
    handle.mark_finished();
    handle
  }

  /// Register how to stop the underlying runtime task. Runs at once if the
  /// handle was already cancelled.
  pub fn set_abort(&self, abort: impl FnOnce() + 'static) {
    let cancelled = {
      let mut inner = self.0.rc_deref_mut();
      match inner.status {
        TaskStatus::Pending => {
          inner.abort = Some(Box::new(abort));
          return;
        }
        TaskStatus::Finished => false,
        TaskStatus::Cancelled => true,
      }
    };
    if cancelled {
      abort();
    }
  }

  pub fn mark_finished(&self) {
    let mut inner = self.0.rc_deref_mut();
    if inner.status == TaskStatus::Pending {
      inner.status = TaskStatus::Finished;
      inner.abort = None;
    }
  }

  pub fn is_finished(&self) -> bool { self.0.rc_deref().status == TaskStatus::Finished }

  pub fn is_cancelled(&self) -> bool { self.0.rc_deref().status == TaskStatus::Cancelled }
}

impl Default for TaskHandle {
  fn default() -> Self { Self::new() }
}

impl SubscriptionLike for TaskHandle {
  fn unsubscribe(&self) {
    let abort = {
      let mut inner = self.0.rc_deref_mut();
      if inner.status != TaskStatus::Pending {
        return;
      }
      inner.status = TaskStatus::Cancelled;
      inner.abort.take()
    };
    tracing::trace!("scheduled task cancelled");
    if let Some(abort) = abort {
      abort();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().status != TaskStatus::Pending }
}

impl From<TaskHandle> for Teardown {
  fn from(handle: TaskHandle) -> Self { Teardown::from_subscription(handle) }
}

impl std::fmt::Debug for TaskHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("TaskHandle").field(&self.0.rc_deref().status).finish()
  }
}
