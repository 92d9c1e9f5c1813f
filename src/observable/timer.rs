use std::{marker::PhantomData, time::Duration};

use crate::{observable::Observable, scheduler::Scheduler, subscriber::Subscriber};

/// Returns an observable which will emit a single `item` once after a given
/// `dur` using a given `scheduler`, then complete.
pub fn timer<Item, Err, S>(item: Item, dur: Duration, scheduler: S) -> TimerObservable<Item, Err, S> {
  TimerObservable { item, dur, scheduler, _err: PhantomData }
}

/// Like [`timer`] but fires at the scheduler time `at`. A time in the past
/// fires on the next scheduler turn.
pub fn timer_at<Item, Err, S>(item: Item, at: Duration, scheduler: S) -> TimerObservable<Item, Err, S>
where
  S: Scheduler,
{
  let dur = at.saturating_sub(scheduler.now());
  TimerObservable { item, dur, scheduler, _err: PhantomData }
}

#[derive(Clone)]
pub struct TimerObservable<Item, Err, S> {
  item: Item,
  dur: Duration,
  scheduler: S,
  _err: PhantomData<fn() -> Err>,
}

impl<Item: 'static, Err: 'static, S: Scheduler> Observable for TimerObservable<Item, Err, S> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let item = self.item;
    let c_subscriber = subscriber.clone();
    let handle = self.scheduler.schedule_once(self.dur, move || {
      c_subscriber.next(item);
      c_subscriber.complete();
    });
    subscriber.add(handle);
  }
}

/// Creates an observable which will fire at `dur` time into the future, and
/// will repeat every `dur` interval after. Emits the tick count starting at
/// zero and never completes.
///
/// # Panics
///
/// Subscribing panics on a [`VirtualTimeScheduler`] when `dur` is zero, as
/// such an interval would fire forever without the clock moving.
///
/// [`VirtualTimeScheduler`]: crate::scheduler::VirtualTimeScheduler
pub fn interval<Err, S>(dur: Duration, scheduler: S) -> IntervalObservable<Err, S> {
  IntervalObservable { dur, scheduler, _err: PhantomData }
}

#[derive(Clone)]
pub struct IntervalObservable<Err, S> {
  dur: Duration,
  scheduler: S,
  _err: PhantomData<fn() -> Err>,
}

impl<Err: 'static, S: Scheduler> Observable for IntervalObservable<Err, S> {
  type Item = usize;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<usize, Err>) {
    let c_subscriber = subscriber.clone();
    let mut count = 0;
    let handle = self.scheduler.schedule_repeating(self.dur, move || {
      c_subscriber.next(count);
      count += 1;
    });
    subscriber.add(handle);
  }
}
