use std::time::Duration;

use crate::{
  error::TimeoutError,
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
  subscription::SubscriptionLike,
};

/// Errors with a [`TimeoutError`] when the source stays silent for `dur`,
/// counted from subscription and again from every value.
#[derive(Clone)]
pub struct TimeoutOp<S, Sch> {
  pub source: S,
  pub dur: Duration,
  pub scheduler: Sch,
}

impl<S, Sch> Observable for TimeoutOp<S, Sch>
where
  S: Observable,
  S::Err: From<TimeoutError>,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let mut observer =
      TimeoutObserver { observer: subscriber, timer: None, dur: self.dur, scheduler: self.scheduler };
    observer.arm();
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct TimeoutObserver<O, Sch> {
  observer: O,
  timer: Option<TaskHandle>,
  dur: Duration,
  scheduler: Sch,
}

impl<O, Sch> TimeoutObserver<O, Sch> {
  fn disarm(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.unsubscribe();
    }
  }
}

impl<Item, Err, Sch> TimeoutObserver<Subscriber<Item, Err>, Sch>
where
  Item: 'static,
  Err: From<TimeoutError> + 'static,
  Sch: Scheduler,
{
  fn arm(&mut self) {
    self.disarm();
    let after = self.dur;
    let observer = self.observer.clone();
    let timer = self.scheduler.schedule_once(after, move || {
      tracing::debug!(?after, "timed out waiting for a value");
      observer.error(TimeoutError { after }.into());
    });
    self.observer.add(timer.clone());
    self.timer = Some(timer);
  }
}

impl<Item, Err, Sch> Observer<Item, Err> for TimeoutObserver<Subscriber<Item, Err>, Sch>
where
  Item: 'static,
  Err: From<TimeoutError> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    self.disarm();
    self.observer.next(value);
    if !self.observer.is_closed() {
      self.arm();
    }
  }

  fn error(&mut self, err: Err) {
    self.disarm();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    self.disarm();
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
  fn errors_when_source_is_silent() {
    let scheduler = VirtualTimeScheduler::new();
    let source = Subject::<i32, RxError>::new();
    let values = Rc::new(RefCell::new(vec![]));
    let errors = Rc::new(RefCell::new(vec![]));
    let (c_values, c_errors) = (values.clone(), errors.clone());
    source
      .clone()
      .timeout(ms(50), scheduler.clone())
      .subscribe_err(move |v| c_values.borrow_mut().push(v), move |e| c_errors.borrow_mut().push(e));

    scheduler.advance_by(ms(40));
    source.next(1);
    scheduler.advance_by(ms(40));
    source.next(2);
    assert!(errors.borrow().is_empty());
    scheduler.advance_by(ms(50));
    assert_eq!(*values.borrow(), vec![1, 2]);
    assert_eq!(*errors.borrow(), vec![RxError::Timeout(ms(50))]);
    assert_eq!(source.observer_count(), 0);
  }

  #[test]
  fn completion_cancels_timer() {
    let scheduler = VirtualTimeScheduler::new();
    let completed = Rc::new(RefCell::new(false));
    let c_completed = completed.clone();
    observable::of::<_, RxError>(1)
      .timeout(ms(10), scheduler.clone())
      .subscribe_complete(|_| {}, move || *c_completed.borrow_mut() = true);
    assert!(*completed.borrow());
    assert!(scheduler.is_empty());
  }

  #[test]
  fn string_errors_carry_the_message() {
    let scheduler = VirtualTimeScheduler::new();
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    observable::never::<i32, String>()
      .timeout(ms(5), scheduler.clone())
      .subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));
    scheduler.advance_by(ms(5));
    assert_eq!(*errors.borrow(), vec!["no value arrived within 5ms".to_owned()]);
  }
}
