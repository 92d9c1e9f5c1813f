//! MergeMap operator, and `concat_map` as its single-slot special case.
//!
//! Each source value is projected to an inner observable. Up to `concurrent`
//! inners run at once and their values are interleaved as they arrive;
//! source values beyond the limit wait in a FIFO buffer until a running inner
//! completes. The result completes once the source completed, the buffer is
//! empty and no inner is running.

use std::{collections::VecDeque, rc::Rc};

use crate::{observable::Observable, observer::Observer, rc::MutRc, subscriber::Subscriber};

#[derive(Clone)]
pub struct MergeMapOp<S, F> {
  pub source: S,
  pub func: F,
  pub concurrent: usize,
}

#[doc(hidden)]
pub struct MergeMapState<Item> {
  buffer: VecDeque<Item>,
  active: usize,
  outer_completed: bool,
  draining: bool,
}

#[doc(hidden)]
pub struct MergeMapShared<O, Item, F> {
  observer: O,
  state: MutRc<MergeMapState<Item>>,
  func: MutRc<F>,
  concurrent: usize,
}

impl<S, F, R> Observable for MergeMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> R + 'static,
  R: Observable<Err = S::Err>,
{
  type Item = R::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<R::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let shared = Rc::new(MergeMapShared {
      observer: subscriber,
      state: MutRc::own(MergeMapState {
        buffer: VecDeque::new(),
        active: 0,
        outer_completed: false,
        draining: false,
      }),
      func: MutRc::own(self.func),
      concurrent: self.concurrent,
    });
    self.source.actual_subscribe(Subscriber::with_subscription(MergeMapOuterObserver(shared), upstream));
  }
}

impl<Item, B, Err, F, R> MergeMapShared<Subscriber<B, Err>, Item, F>
where
  Item: 'static,
  B: 'static,
  Err: 'static,
  F: FnMut(Item) -> R + 'static,
  R: Observable<Item = B, Err = Err>,
{
  /// Start buffered inners while there is a free slot, then complete if
  /// nothing is left to do. Re-entrant calls return at once; the running
  /// loop picks up their work.
  fn drain(self: &Rc<Self>) {
    {
      let mut state = self.state.rc_deref_mut();
      if state.draining {
        return;
      }
      state.draining = true;
    }

    loop {
      if self.observer.is_closed() {
        break;
      }
      let value = {
        let mut state = self.state.rc_deref_mut();
        if state.active >= self.concurrent {
          None
        } else {
          let value = state.buffer.pop_front();
          if value.is_some() {
            state.active += 1;
          }
          value
        }
      };
      let Some(value) = value else { break };

      let inner = (&mut *self.func.rc_deref_mut())(value);
      let child = self.observer.subscription().child();
      inner.actual_subscribe(Subscriber::with_subscription(MergeMapInnerObserver(self.clone()), child));
    }

    let done = {
      let mut state = self.state.rc_deref_mut();
      state.draining = false;
      state.outer_completed && state.active == 0 && state.buffer.is_empty()
    };
    if done {
      self.observer.complete();
    }
  }
}

#[doc(hidden)]
pub struct MergeMapOuterObserver<Shared>(Rc<Shared>);

#[doc(hidden)]
pub struct MergeMapInnerObserver<Shared>(Rc<Shared>);

impl<Item, B, Err, F, R> Observer<Item, Err> for MergeMapOuterObserver<MergeMapShared<Subscriber<B, Err>, Item, F>>
where
  Item: 'static,
  B: 'static,
  Err: 'static,
  F: FnMut(Item) -> R + 'static,
  R: Observable<Item = B, Err = Err>,
{
  fn next(&mut self, value: Item) {
    self.0.state.rc_deref_mut().buffer.push_back(value);
    self.0.drain();
  }

  fn error(&mut self, err: Err) { self.0.observer.error(err) }

  fn complete(&mut self) {
    self.0.state.rc_deref_mut().outer_completed = true;
    self.0.drain();
  }

  fn is_closed(&self) -> bool { self.0.observer.is_closed() }
}

impl<Item, B, Err, F, R> Observer<B, Err> for MergeMapInnerObserver<MergeMapShared<Subscriber<B, Err>, Item, F>>
where
  Item: 'static,
  B: 'static,
  Err: 'static,
  F: FnMut(Item) -> R + 'static,
  R: Observable<Item = B, Err = Err>,
{
  fn next(&mut self, value: B) { self.0.observer.next(value) }

  fn error(&mut self, err: Err) { self.0.observer.error(err) }

  fn complete(&mut self) {
    self.0.state.rc_deref_mut().active -= 1;
    self.0.drain();
  }

  fn is_closed(&self) -> bool { self.0.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  #[test]
  fn interleaves_inner_values() {
    let scheduler = VirtualTimeScheduler::new();
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    let c_scheduler = scheduler.clone();
    observable::from_iter::<_, ()>(vec![(30, "slow"), (10, "fast")])
      .merge_map(move |(ms, tag)| observable::timer(tag, Duration::from_millis(ms), c_scheduler.clone()))
      .subscribe_complete(move |v| c_values.borrow_mut().push(v), move || *c_completed.borrow_mut() = true);

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*values.borrow(), vec!["fast"]);
    assert!(!*completed.borrow());
    scheduler.advance_by(Duration::from_millis(20));
    assert_eq!(*values.borrow(), vec!["fast", "slow"]);
    assert!(*completed.borrow());
  }

  #[test]
  fn concat_map_runs_inners_in_order() {
    let scheduler = VirtualTimeScheduler::new();
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    let (c_scheduler, now) = (scheduler.clone(), scheduler.clone());
    observable::from_iter::<_, ()>(vec![(30, "first"), (10, "second")])
      .concat_map(move |(ms, tag)| observable::timer(tag, Duration::from_millis(ms), c_scheduler.clone()))
      .subscribe(move |v| c_values.borrow_mut().push((now.now(), v)));

    scheduler.advance_by(Duration::from_millis(40));
    assert_eq!(
      *values.borrow(),
      vec![(Duration::from_millis(30), "first"), (Duration::from_millis(40), "second")]
    );
  }

  #[test]
  fn respects_concurrency_limit() {
    let inners: Vec<Subject<i32, ()>> = (0..3).map(|_| Subject::new()).collect();
    let c_inners = inners.clone();
    let completed = Rc::new(RefCell::new(false));
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(0..3)
      .merge_map_with_concurrency(move |i: usize| c_inners[i].clone(), 2)
      .subscribe_complete(|_| {}, move || *c_completed.borrow_mut() = true);

    let counts = || inners.iter().map(|s| s.observer_count()).collect::<Vec<_>>();
    assert_eq!(counts(), vec![1, 1, 0]);
    inners[0].complete();
    assert_eq!(counts(), vec![0, 1, 1]);
    inners[1].complete();
    assert!(!*completed.borrow());
    inners[2].complete();
    assert!(*completed.borrow());
  }

  #[test]
  fn zero_concurrency_runs_one_inner_at_a_time() {
    let inners: Vec<Subject<i32, ()>> = (0..2).map(|_| Subject::new()).collect();
    let c_inners = inners.clone();
    observable::from_iter::<_, ()>(0..2)
      .merge_map_with_concurrency(move |i: usize| c_inners[i].clone(), 0)
      .subscribe(|_| {});

    assert_eq!(inners[0].observer_count(), 1);
    assert_eq!(inners[1].observer_count(), 0);
    inners[0].complete();
    assert_eq!(inners[1].observer_count(), 1);
  }

  #[test]
  fn outer_values_emitted_while_draining_are_kept() {
    let source = Subject::<i32, ()>::new();
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    let c_source = source.clone();
    source
      .clone()
      .concat_map(move |v| {
        if v == 1 {
          c_source.next(2);
        }
        observable::of(v)
      })
      .subscribe(move |v| c_values.borrow_mut().push(v));
    source.next(1);
    assert_eq!(*values.borrow(), vec![1, 2]);
  }

  #[test]
  fn unsubscribe_releases_running_inners() {
    let inner = Subject::<i32, ()>::new();
    let c_inner = inner.clone();
    let subscription = observable::of::<_, ()>(()).merge_map(move |_| c_inner.clone()).subscribe(|_| {});
    assert_eq!(inner.observer_count(), 1);
    subscription.unsubscribe();
    assert_eq!(inner.observer_count(), 0);
  }
}
