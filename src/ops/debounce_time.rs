use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
  subscription::SubscriptionLike,
};

#[derive(Clone)]
pub struct DebounceTimeOp<S, Sch> {
  pub source: S,
  pub dur: Duration,
  pub scheduler: Sch,
}

impl<S, Sch> Observable for DebounceTimeOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = DebounceTimeObserver {
      observer: subscriber,
      dur: self.dur,
      scheduler: self.scheduler,
      state: MutRc::own(DebounceState { pending: None, timer: None }),
    };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

#[doc(hidden)]
pub struct DebounceState<Item> {
  pending: Option<Item>,
  timer: Option<TaskHandle>,
}

impl<Item> DebounceState<Item> {
  fn cancel_timer(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.unsubscribe();
    }
  }
}

pub struct DebounceTimeObserver<O, Sch, Item> {
  observer: O,
  dur: Duration,
  scheduler: Sch,
  state: MutRc<DebounceState<Item>>,
}

impl<Item, Err, Sch> Observer<Item, Err> for DebounceTimeObserver<Subscriber<Item, Err>, Sch, Item>
where
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    {
      let mut state = self.state.rc_deref_mut();
      state.cancel_timer();
      state.pending = Some(value);
    }

    let (observer, state) = (self.observer.clone(), self.state.clone());
    let timer = self.scheduler.schedule_once(self.dur, move || {
      let pending = {
        let mut state = state.rc_deref_mut();
        state.timer = None;
        state.pending.take()
      };
      if let Some(value) = pending {
        observer.next(value);
      }
    });
    self.observer.add(timer.clone());
    self.state.rc_deref_mut().timer = Some(timer);
  }

  fn error(&mut self, err: Err) {
    {
      let mut state = self.state.rc_deref_mut();
      state.cancel_timer();
      state.pending = None;
    }
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let pending = {
      let mut state = self.state.rc_deref_mut();
      state.cancel_timer();
      state.pending.take()
    };
    if let Some(value) = pending {
      self.observer.next(value);
    }
    self.observer.complete();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  #[test]
  fn emits_after_quiet_period() {
    let scheduler = VirtualTimeScheduler::new();
    let source = Subject::<i32, ()>::new();
    let emitted = Rc::new(RefCell::new(vec![]));
    let (c_emitted, now) = (emitted.clone(), scheduler.clone());
    source
      .clone()
      .debounce_time(ms(300), scheduler.clone())
      .subscribe(move |v| c_emitted.borrow_mut().push((now.now(), v)));

    for (at, v) in [(0, 1), (100, 2), (200, 3), (600, 4)] {
      scheduler.advance_to(ms(at));
      source.next(v);
    }
    scheduler.advance_to(ms(1000));
    assert_eq!(*emitted.borrow(), vec![(ms(500), 3), (ms(900), 4)]);
  }

  #[test]
  fn flushes_pending_value_on_complete() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, c_log2) = (log.clone(), log.clone());
    observable::from_iter::<_, ()>(vec![1, 2, 3])
      .debounce_time(ms(10), scheduler.clone())
      .subscribe_complete(
        move |v| c_log.borrow_mut().push(format!("next {v}")),
        move || c_log2.borrow_mut().push("complete".to_owned()),
      );
    assert_eq!(*log.borrow(), vec!["next 3", "complete"]);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn error_drops_pending_value() {
    let scheduler = VirtualTimeScheduler::new();
    let source = Subject::<i32, &str>::new();
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    source
      .clone()
      .debounce_time(ms(10), scheduler.clone())
      .subscribe_err(move |v| c_values.borrow_mut().push(v), |_| {});
    source.next(1);
    source.error("boom");
    scheduler.advance_by(ms(20));
    assert!(values.borrow().is_empty());
  }
}
