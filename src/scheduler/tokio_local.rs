use std::time::Duration;

use tokio::time::Instant;

use super::{Scheduler, TaskHandle};

/// Real-time scheduler backed by tokio's `spawn_local`.
///
/// Must be used from inside a [`tokio::task::LocalSet`].
#[derive(Clone)]
pub struct TokioLocalScheduler {
  origin: Instant,
}

impl TokioLocalScheduler {
  pub fn new() -> Self { Self { origin: Instant::now() } }
}

impl Default for TokioLocalScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for TokioLocalScheduler {
  fn now(&self) -> Duration { self.origin.elapsed() }

  fn schedule_once(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    let join = tokio::task::spawn_local(async move {
      tokio::time::sleep(delay).await;
      c_handle.mark_finished();
      task();
    });
    handle.set_abort(move || join.abort());
    handle
  }

  fn schedule_repeating(&self, interval: Duration, mut task: impl FnMut() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    let join = tokio::task::spawn_local(async move {
      let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
      loop {
        ticker.tick().await;
        task();
      }
    });
    handle.set_abort(move || join.abort());
    handle
  }
}
