use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
};

/// Opens a window of `dur` on the first value that arrives while no window is
/// open, and emits the latest value seen when it closes.
#[derive(Clone)]
pub struct AuditTimeOp<S, Sch> {
  pub source: S,
  pub dur: Duration,
  pub scheduler: Sch,
}

#[doc(hidden)]
pub struct AuditState<Item> {
  latest: Option<Item>,
  window: Option<TaskHandle>,
  completed: bool,
}

impl<S, Sch> Observable for AuditTimeOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = AuditTimeObserver {
      observer: subscriber,
      dur: self.dur,
      scheduler: self.scheduler,
      state: MutRc::own(AuditState { latest: None, window: None, completed: false }),
    };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct AuditTimeObserver<O, Sch, Item> {
  observer: O,
  dur: Duration,
  scheduler: Sch,
  state: MutRc<AuditState<Item>>,
}

impl<Item, Err, Sch> Observer<Item, Err> for AuditTimeObserver<Subscriber<Item, Err>, Sch, Item>
where
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let window_open = {
      let mut state = self.state.rc_deref_mut();
      state.latest = Some(value);
      state.window.is_some()
    };
    if window_open {
      return;
    }

    let (observer, state) = (self.observer.clone(), self.state.clone());
    let window = self.scheduler.schedule_once(self.dur, move || {
      let (latest, completed) = {
        let mut state = state.rc_deref_mut();
        state.window = None;
        (state.latest.take(), state.completed)
      };
      if let Some(value) = latest {
        observer.next(value);
      }
      if completed {
        observer.complete();
      }
    });
    self.observer.add(window.clone());
    self.state.rc_deref_mut().window = Some(window);
  }

  fn error(&mut self, err: Err) {
    self.state.rc_deref_mut().latest = None;
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let window_open = {
      let mut state = self.state.rc_deref_mut();
      state.completed = true;
      state.window.is_some()
    };
    if !window_open {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
