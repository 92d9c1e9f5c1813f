use std::time::{Duration, Instant};

use futures::{executor::LocalSpawner, future::abortable, task::LocalSpawnExt};

use super::{Scheduler, TaskHandle};

/// Real-time scheduler running tasks on a `futures` [`LocalPool`].
///
/// Tasks only make progress while the pool is driven (`run`,
/// `run_until_stalled`, ...), on the thread that owns it.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use futures::executor::LocalPool;
/// use rxstream::prelude::*;
///
/// let mut pool = LocalPool::new();
/// let scheduler = LocalPoolScheduler::new(pool.spawner());
/// observable::timer::<_, (), _>("tick", Duration::from_millis(10), scheduler)
///   .subscribe(|v| println!("{v}"));
/// pool.run();
/// ```
///
/// [`LocalPool`]: futures::executor::LocalPool
#[derive(Clone)]
pub struct LocalPoolScheduler {
  spawner: LocalSpawner,
  origin: Instant,
}

impl LocalPoolScheduler {
  pub fn new(spawner: LocalSpawner) -> Self { Self { spawner, origin: Instant::now() } }

  fn spawn(&self, handle: TaskHandle, fut: impl std::future::Future<Output = ()> + 'static) -> TaskHandle {
    let (fut, abort) = abortable(fut);
    match self.spawner.spawn_local(async move {
      let _ = fut.await;
    }) {
      Ok(()) => {
        handle.set_abort(move || abort.abort());
        handle
      }
      Err(err) => {
        tracing::warn!(error = %err, "local pool refused the task, it will never run");
        TaskHandle::finished()
      }
    }
  }
}

impl Scheduler for LocalPoolScheduler {
  fn now(&self) -> Duration { self.origin.elapsed() }

  fn schedule_once(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    self.spawn(handle, async move {
      futures_time::task::sleep(delay.into()).await;
      c_handle.mark_finished();
      task();
    })
  }

  fn schedule_repeating(&self, interval: Duration, mut task: impl FnMut() + 'static) -> TaskHandle {
    self.spawn(TaskHandle::new(), async move {
      loop {
        futures_time::task::sleep(interval.into()).await;
        task();
      }
    })
  }
}
