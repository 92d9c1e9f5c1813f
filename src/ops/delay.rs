use std::time::Duration;

use crate::{observable::Observable, observer::Observer, scheduler::Scheduler, subscriber::Subscriber};

/// Shifts every value and the completion `dur` later on `scheduler`. Errors
/// are not delayed: they are forwarded at once and cancel whatever is still
/// pending.
#[derive(Debug, Clone)]
pub struct DelayOp<S, Sch> {
  pub source: S,
  pub dur: Duration,
  pub scheduler: Sch,
}

impl<S, Sch> Observable for DelayOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = DelayObserver { observer: subscriber, dur: self.dur, scheduler: self.scheduler };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct DelayObserver<O, Sch> {
  observer: O,
  dur: Duration,
  scheduler: Sch,
}

impl<Item, Err, Sch> Observer<Item, Err> for DelayObserver<Subscriber<Item, Err>, Sch>
where
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule_once(self.dur, move || observer.next(value));
    self.observer.add(handle);
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule_once(self.dur, move || observer.complete());
    self.observer.add(handle);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  #[test]
  fn shifts_values_and_completion() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, c_log2) = (log.clone(), log.clone());
    let (now, now2) = (scheduler.clone(), scheduler.clone());
    observable::from_iter::<_, ()>(vec![1, 2])
      .delay(ms(50), scheduler.clone())
      .subscribe_complete(
        move |v| c_log.borrow_mut().push(format!("{:?} next {v}", now.now())),
        move || c_log2.borrow_mut().push(format!("{:?} complete", now2.now())),
      );
    assert!(log.borrow().is_empty());
    scheduler.advance_by(ms(50));
    assert_eq!(*log.borrow(), vec!["50ms next 1", "50ms next 2", "50ms complete"]);
  }

  #[test]
  fn error_is_immediate_and_drops_pending_values() {
    let scheduler = VirtualTimeScheduler::new();
    let source = Subject::<i32, &str>::new();
    let values = Rc::new(RefCell::new(vec![]));
    let errors = Rc::new(RefCell::new(vec![]));
    let (c_values, c_errors) = (values.clone(), errors.clone());
    source
      .clone()
      .delay(ms(50), scheduler.clone())
      .subscribe_err(move |v| c_values.borrow_mut().push(v), move |e| c_errors.borrow_mut().push(e));
    source.next(1);
    source.error("boom");
    assert_eq!(*errors.borrow(), vec!["boom"]);
    scheduler.advance_by(ms(100));
    assert!(values.borrow().is_empty());
    assert!(scheduler.is_empty());
  }
}
