//! End-to-end behavior of operator chains and subjects, driven on virtual
//! time where timing matters.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use proptest::prelude::*;
use rxstream::{
  prelude::*,
  testing::{cold, Recorded, TestObserver},
};

fn ms(v: u64) -> Duration { Duration::from_millis(v) }

fn collect<S>(source: S) -> Rc<RefCell<Vec<S::Item>>>
where
  S: Observable,
  S::Err: std::fmt::Debug,
{
  let values = Rc::new(RefCell::new(vec![]));
  let c_values = values.clone();
  source.subscribe(move |v| c_values.borrow_mut().push(v));
  values
}

#[test]
fn every_subscription_replays_a_cold_source() {
  let source = observable::create(|s: Subscriber<i32, ()>| {
    s.next(1);
    s.next(2);
    s.complete();
  })
  .map(|v| v * 3);

  let first = collect(source.clone());
  let second = collect(source);
  assert_eq!(*first.borrow(), vec![3, 6]);
  assert_eq!(*first.borrow(), *second.borrow());
}

#[test]
fn unsubscribe_is_idempotent() {
  let released = Rc::new(RefCell::new(0));
  let c_released = released.clone();
  let subscription = observable::create(move |_: Subscriber<i32, ()>| {
    Teardown::from_fn(move || *c_released.borrow_mut() += 1)
  })
  .subscribe(|_| {});

  for _ in 0..3 {
    subscription.unsubscribe();
  }
  assert!(subscription.is_closed());
  assert_eq!(*released.borrow(), 1);
}

#[test]
fn behavior_subject_hands_current_value_to_late_subscriber() {
  let subject = BehaviorSubject::<&str, ()>::new("init");
  subject.next("v");
  let seen = collect(subject.clone());
  assert_eq!(*seen.borrow(), vec!["v"]);
  subject.next("w");
  assert_eq!(*seen.borrow(), vec!["v", "w"]);
}

#[test]
fn replay_subject_of_two() {
  let subject = ReplaySubject::<i32, ()>::new(2);
  [1, 2, 3].into_iter().for_each(|v| subject.next(v));
  let seen = collect(subject.clone());
  assert_eq!(*seen.borrow(), vec![2, 3]);
}

#[test]
fn async_subject_delivers_last_value_then_completion() {
  let scheduler = VirtualTimeScheduler::new();
  let subject = AsyncSubject::<i32, &str>::new();
  let early = TestObserver::new(scheduler.clone());
  subject.clone().subscribe_with(early.clone());
  [1, 2, 3].into_iter().for_each(|v| subject.next(v));
  subject.complete();
  let late = TestObserver::new(scheduler.clone());
  subject.clone().subscribe_with(late.clone());

  let expected = vec![Recorded::next(ms(0), 3), Recorded::complete(ms(0))];
  assert_eq!(early.records(), expected);
  assert_eq!(late.records(), expected);

  let failed = AsyncSubject::<i32, &str>::new();
  let observer = TestObserver::new(scheduler);
  failed.clone().subscribe_with(observer.clone());
  [1, 2, 3].into_iter().for_each(|v| failed.next(v));
  failed.error("boom");
  assert_eq!(observer.records(), vec![Recorded::error(ms(0), "boom")]);
}

#[test]
fn switch_map_only_follows_latest_inner() {
  let scheduler = VirtualTimeScheduler::new();
  let table = HashMap::from([('a', 1), ('b', 2)]);
  let outer = cold::<_, (), _>("ab", ms(1), &table, None, scheduler.clone()).unwrap();
  let released = Rc::new(RefCell::new(vec![]));

  let (c_scheduler, c_released) = (scheduler.clone(), released.clone());
  let observer = TestObserver::new(scheduler.clone());
  outer
    .switch_map(move |v| {
      let (now, released) = (c_scheduler.clone(), c_released.clone());
      observable::timer(v * 10, ms(5), c_scheduler.clone())
        .finalize(move || released.borrow_mut().push((v, now.now())))
    })
    .subscribe_with(observer.clone());
  scheduler.advance_by(ms(20));

  assert_eq!(observer.timed_values(), vec![(ms(6), 20)]);
  assert_eq!(*released.borrow(), vec![(1, ms(1)), (2, ms(6))]);
}

#[test]
fn retry_two_means_three_attempts() {
  let attempts = Rc::new(RefCell::new(0));
  let errors = Rc::new(RefCell::new(vec![]));
  let (c_attempts, c_errors) = (attempts.clone(), errors.clone());
  observable::defer(move || {
    *c_attempts.borrow_mut() += 1;
    observable::throw_err::<i32, _>("down")
  })
  .retry(2)
  .subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));

  assert_eq!(*attempts.borrow(), 3);
  assert_eq!(*errors.borrow(), vec!["down"]);
}

#[test]
fn debounce_emits_after_quiet_period() {
  let scheduler = VirtualTimeScheduler::new();
  let table = HashMap::from([('a', 1), ('b', 2), ('c', 3), ('d', 4)]);
  let source = cold::<_, (), _>("abc---d", ms(100), &table, None, scheduler.clone()).unwrap();
  let observer = TestObserver::new(scheduler.clone());
  source.debounce_time(ms(300), scheduler.clone()).subscribe_with(observer.clone());
  scheduler.advance_by(ms(2000));
  assert_eq!(observer.timed_values(), vec![(ms(500), 3), (ms(900), 4)]);
}

#[test]
fn combine_latest_waits_for_every_side() {
  let scheduler = VirtualTimeScheduler::new();
  let table = HashMap::from([('a', 1)]);
  let a = cold::<_, (), _>("a", ms(1), &table, None, scheduler.clone()).unwrap();
  let b = observable::timer(2, ms(5), scheduler.clone());
  let observer = TestObserver::new(scheduler.clone());
  a.combine_latest(b).subscribe_with(observer.clone());

  scheduler.advance_by(ms(4));
  assert!(observer.records().is_empty());
  scheduler.advance_by(ms(1));
  assert_eq!(observer.timed_values(), vec![(ms(5), (1, 2))]);
}

#[test]
fn timeout_surfaces_as_stream_error() {
  let scheduler = VirtualTimeScheduler::new();
  let observer = TestObserver::new(scheduler.clone());
  observable::never::<i32, RxError>()
    .timeout(ms(50), scheduler.clone())
    .subscribe_with(observer.clone());
  scheduler.advance_by(ms(100));
  assert_eq!(observer.records(), vec![Recorded::error(ms(50), RxError::Timeout(ms(50)))]);
}

#[test]
fn shared_interval_feeds_every_subscriber() {
  let scheduler = VirtualTimeScheduler::new();
  let shared = observable::interval::<(), _>(ms(10), scheduler.clone()).take(3).share();
  let first = TestObserver::new(scheduler.clone());
  let second = TestObserver::new(scheduler.clone());
  shared.clone().subscribe_with(first.clone());
  scheduler.advance_by(ms(10));
  shared.subscribe_with(second.clone());
  scheduler.advance_by(ms(50));

  assert_eq!(first.values(), vec![0, 1, 2]);
  assert_eq!(second.values(), vec![1, 2]);
  assert!(first.is_completed() && second.is_completed());
}

proptest! {
  #[test]
  fn replay_subject_replays_the_newest_values(
    values in prop::collection::vec(any::<i32>(), 0..20),
    capacity in 0usize..6,
  ) {
    let subject = ReplaySubject::<i32, ()>::new(capacity);
    values.iter().for_each(|v| subject.next(*v));
    let seen = collect(subject.clone());
    let skip = values.len().saturating_sub(capacity);
    prop_assert_eq!(&*seen.borrow(), &values[skip..]);
  }

  #[test]
  fn take_yields_a_prefix(values in prop::collection::vec(any::<i32>(), 0..20), n in 0usize..25) {
    let seen = collect(observable::from_iter::<_, ()>(values.clone()).take(n));
    prop_assert_eq!(&*seen.borrow(), &values[..n.min(values.len())]);
  }

  #[test]
  fn merge_map_preserves_each_inner_order(
    values in prop::collection::vec(0u64..5, 1..8),
  ) {
    let scheduler = VirtualTimeScheduler::new();
    let observer = TestObserver::new(scheduler.clone());
    let c_scheduler = scheduler.clone();
    observable::from_iter::<_, ()>(values.clone().into_iter().enumerate())
      .merge_map(move |(i, delay)| {
        observable::from_iter(vec![(i, 0), (i, 1)]).delay(ms(delay), c_scheduler.clone())
      })
      .subscribe_with(observer.clone());
    scheduler.advance_by(ms(10));

    let seen = observer.values();
    prop_assert_eq!(seen.len(), values.len() * 2);
    for i in 0..values.len() {
      let order: Vec<_> = seen.iter().filter(|(idx, _)| *idx == i).map(|(_, n)| *n).collect();
      prop_assert_eq!(order, vec![0, 1]);
    }
    prop_assert!(observer.is_completed());
  }
}
