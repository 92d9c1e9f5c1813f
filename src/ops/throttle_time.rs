use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
};

/// Which value of a throttle window is emitted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ThrottleEdge {
  /// Emit the value that opens the window, drop the rest of the window.
  Leading,
  /// Emit the latest value when the window closes. An emission re-opens the
  /// window, so emissions stay at least one window apart.
  Trailing,
}

/// Emits at most one value per window of `dur`.
///
/// ```rust
/// use std::time::Duration;
///
/// use rxstream::prelude::*;
///
/// let scheduler = VirtualTimeScheduler::new();
/// observable::interval::<(), _>(Duration::from_millis(1), scheduler.clone())
///   .throttle_time(Duration::from_millis(9), scheduler.clone(), ThrottleEdge::Leading)
///   .subscribe(|v| println!("{v}"));
/// scheduler.advance_by(Duration::from_millis(30));
/// ```
#[derive(Clone)]
pub struct ThrottleTimeOp<S, Sch> {
  pub source: S,
  pub dur: Duration,
  pub scheduler: Sch,
  pub edge: ThrottleEdge,
}

impl<S, Sch> Observable for ThrottleTimeOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = ThrottleTimeObserver {
      observer: subscriber,
      dur: self.dur,
      scheduler: self.scheduler,
      edge: self.edge,
      state: MutRc::own(ThrottleState { window: None, trailing: None, completed: false }),
    };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

#[doc(hidden)]
pub struct ThrottleState<Item> {
  window: Option<TaskHandle>,
  trailing: Option<Item>,
  completed: bool,
}

pub struct ThrottleTimeObserver<O, Sch, Item> {
  observer: O,
  dur: Duration,
  scheduler: Sch,
  edge: ThrottleEdge,
  state: MutRc<ThrottleState<Item>>,
}

impl<O: Clone, Sch: Clone, Item> Clone for ThrottleTimeObserver<O, Sch, Item> {
  fn clone(&self) -> Self {
    ThrottleTimeObserver {
      observer: self.observer.clone(),
      dur: self.dur,
      scheduler: self.scheduler.clone(),
      edge: self.edge,
      state: self.state.clone(),
    }
  }
}

impl<Item, Err, Sch> ThrottleTimeObserver<Subscriber<Item, Err>, Sch, Item>
where
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn open_window(&self) {
    let this = self.clone();
    let window = self.scheduler.schedule_once(self.dur, move || this.close_window());
    self.observer.add(window.clone());
    self.state.rc_deref_mut().window = Some(window);
  }

  fn close_window(&self) {
    let (trailing, completed) = {
      let mut state = self.state.rc_deref_mut();
      state.window = None;
      (state.trailing.take(), state.completed)
    };
    let Some(value) = trailing else { return };
    self.observer.next(value);
    if completed {
      self.observer.complete();
    } else if !self.observer.is_closed() {
      self.open_window();
    }
  }
}

impl<Item, Err, Sch> Observer<Item, Err> for ThrottleTimeObserver<Subscriber<Item, Err>, Sch, Item>
where
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let window_open = self.state.rc_deref().window.is_some();
    match self.edge {
      ThrottleEdge::Leading => {
        if !window_open {
          self.observer.next(value);
          if !self.observer.is_closed() {
            self.open_window();
          }
        }
      }
      ThrottleEdge::Trailing => {
        self.state.rc_deref_mut().trailing = Some(value);
        if !window_open {
          self.open_window();
        }
      }
    }
  }

  fn error(&mut self, err: Err) {
    self.state.rc_deref_mut().trailing = None;
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let wait_for_window = {
      let mut state = self.state.rc_deref_mut();
      state.completed = true;
      state.window.is_some() && state.trailing.is_some()
    };
    if !wait_for_window {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
