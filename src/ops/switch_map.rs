//! SwitchMap operator
//!
//! Transforms each value emitted by the source into an inner observable, and
//! forwards items from only the most recently created one. When a new value
//! arrives the previous inner observable is unsubscribed before the
//! projection runs, so at most one inner subscription is ever alive.
//!
//! - Errors from the source or from the current inner are propagated
//!   immediately.
//! - The operator completes once the source completed and the current inner
//!   (if any) completed.
//!
//! Typical use: cancelling an in-flight request when a newer query arrives.
//!
//! ```rust
//! use rxstream::prelude::*;
//!
//! let queries = Subject::<&str, ()>::new();
//! let mut results = vec![];
//! queries
//!   .clone()
//!   .switch_map(|q| observable::of(q.len()))
//!   .subscribe(move |len| results.push(len));
//! queries.next("rx");
//! ```

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

#[derive(Clone)]
pub struct SwitchMapOp<S, F> {
  pub source: S,
  pub func: F,
}

#[doc(hidden)]
#[derive(Default)]
pub struct SwitchState {
  inner: Option<Subscription>,
  /// Identifies the current inner, so a stale inner completing late is
  /// ignored.
  generation: usize,
  outer_completed: bool,
}

impl<S, F, R> Observable for SwitchMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> R + 'static,
  R: Observable<Err = S::Err>,
{
  type Item = R::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<R::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let outer = SwitchMapOuterObserver {
      observer: subscriber,
      state: MutRc::own(SwitchState::default()),
      func: self.func,
    };
    self.source.actual_subscribe(Subscriber::with_subscription(outer, upstream));
  }
}

#[doc(hidden)]
pub struct SwitchMapOuterObserver<O, F> {
  observer: O,
  state: MutRc<SwitchState>,
  func: F,
}

#[doc(hidden)]
pub struct SwitchMapInnerObserver<O> {
  observer: O,
  state: MutRc<SwitchState>,
  generation: usize,
}

impl<Item, Err, B, F, R> Observer<Item, Err> for SwitchMapOuterObserver<Subscriber<B, Err>, F>
where
  B: 'static,
  Err: 'static,
  F: FnMut(Item) -> R,
  R: Observable<Item = B, Err = Err>,
{
  fn next(&mut self, value: Item) {
    let previous = self.state.rc_deref_mut().inner.take();
    if let Some(previous) = previous {
      previous.unsubscribe();
    }
    if self.observer.is_closed() {
      return;
    }

    let inner = (self.func)(value);
    let child = self.observer.subscription().child();
    let generation = {
      let mut state = self.state.rc_deref_mut();
      state.generation += 1;
      state.inner = Some(child.clone());
      state.generation
    };
    let observer =
      SwitchMapInnerObserver { observer: self.observer.clone(), state: self.state.clone(), generation };
    inner.actual_subscribe(Subscriber::with_subscription(observer, child));
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let idle = {
      let mut state = self.state.rc_deref_mut();
      state.outer_completed = true;
      state.inner.is_none()
    };
    if idle {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item, Err> Observer<Item, Err> for SwitchMapInnerObserver<Subscriber<Item, Err>> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let done = {
      let mut state = self.state.rc_deref_mut();
      if state.generation != self.generation {
        return;
      }
      state.inner = None;
      state.outer_completed
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  #[test]
  fn only_latest_inner_is_forwarded() {
    let scheduler = VirtualTimeScheduler::new();
    let source = Subject::<u64, ()>::new();
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    let c_scheduler = scheduler.clone();
    source
      .clone()
      .switch_map(move |v| observable::timer(v, Duration::from_millis(10), c_scheduler.clone()))
      .subscribe(move |v| c_values.borrow_mut().push(v));

    source.next(1);
    scheduler.advance_by(Duration::from_millis(5));
    source.next(2);
    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*values.borrow(), vec![2]);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn previous_inner_released_before_projecting_next() {
    let log = Rc::new(RefCell::new(vec![]));
    let source = Subject::<i32, ()>::new();
    let c_log = log.clone();
    source
      .clone()
      .switch_map(move |v| {
        c_log.borrow_mut().push(format!("project {v}"));
        let r_log = c_log.clone();
        observable::never::<i32, ()>().finalize(move || r_log.borrow_mut().push(format!("release {v}")))
      })
      .subscribe(|_| {});

    source.next(1);
    source.next(2);
    assert_eq!(*log.borrow(), vec!["project 1", "release 1", "project 2"]);
  }

  #[test]
  fn completes_after_outer_and_current_inner() {
    let source = Subject::<i32, ()>::new();
    let inner = Subject::<i32, ()>::new();
    let completed = Rc::new(RefCell::new(false));
    let c_completed = completed.clone();
    let c_inner = inner.clone();
    source
      .clone()
      .switch_map(move |_| c_inner.clone())
      .subscribe_complete(|_| {}, move || *c_completed.borrow_mut() = true);

    source.next(1);
    source.complete();
    assert!(!*completed.borrow());
    inner.complete();
    assert!(*completed.borrow());
  }

  #[test]
  fn synchronous_inners_complete_in_place() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    observable::from_iter::<_, ()>(1..=3)
      .switch_map(|v| observable::from_iter(vec![v, v * 10]))
      .subscribe_complete(move |v| c_values.borrow_mut().push(v), move || *c_completed.borrow_mut() = true);
    assert_eq!(*values.borrow(), vec![1, 10, 2, 20, 3, 30]);
    assert!(*completed.borrow());
  }

  #[test]
  fn inner_error_propagates() {
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    observable::of::<_, &str>(1)
      .switch_map(|_| observable::throw_err::<i32, _>("inner failed"))
      .subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));
    assert_eq!(*errors.borrow(), vec!["inner failed"]);
  }
}
