use std::marker::PhantomData;

use crate::{observable::Observable, subscriber::Subscriber, subscription::Teardown};

/// Creates an observable from a producer function.
///
/// `f` runs synchronously each time the observable is subscribed. It emits
/// through the [`Subscriber`] it receives and returns what must be released
/// on unsubscribe (anything convertible to a [`Teardown`], `()` for nothing).
///
/// ```rust
/// use rxstream::prelude::*;
///
/// let mut emitted = vec![];
/// observable::create(|s: Subscriber<i32, ()>| {
///   s.next(1);
///   s.next(2);
///   s.complete();
/// })
/// .subscribe(move |v| emitted.push(v));
/// ```
pub fn create<F, R, Item, Err>(f: F) -> ObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>) -> R,
  R: Into<Teardown>,
{
  ObservableFn(f, PhantomData)
}

/// Like [`create`] but the producer may fail before it starts emitting.
///
/// An `Err` returned by `f` is delivered to the subscriber's `error` instead
/// of escaping `subscribe`.
pub fn try_create<F, R, Item, Err>(f: F) -> TryObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>) -> Result<R, Err>,
  R: Into<Teardown>,
{
  TryObservableFn(f, PhantomData)
}

pub struct ObservableFn<F, Item, Err>(F, PhantomData<fn() -> (Item, Err)>);

impl<F: Clone, Item, Err> Clone for ObservableFn<F, Item, Err> {
  fn clone(&self) -> Self { ObservableFn(self.0.clone(), PhantomData) }
}

impl<F, R, Item, Err> Observable for ObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>) -> R,
  R: Into<Teardown>,
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let teardown = (self.0)(subscriber.clone());
    subscriber.add(teardown);
  }
}

pub struct TryObservableFn<F, Item, Err>(F, PhantomData<fn() -> (Item, Err)>);

impl<F: Clone, Item, Err> Clone for TryObservableFn<F, Item, Err> {
  fn clone(&self) -> Self { TryObservableFn(self.0.clone(), PhantomData) }
}

impl<F, R, Item, Err> Observable for TryObservableFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>) -> Result<R, Err>,
  R: Into<Teardown>,
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    match (self.0)(subscriber.clone()) {
      Ok(teardown) => subscriber.add(teardown),
      Err(err) => subscriber.error(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn proxy_call() {
    let next = Rc::new(Cell::new(0));
    let err = Rc::new(Cell::new(0));
    let complete = Rc::new(Cell::new(0));
    let (c_next, c_err, c_complete) = (next.clone(), err.clone(), complete.clone());

    observable::create(|s: Subscriber<i32, &str>| {
      s.next(1);
      s.next(2);
      s.next(3);
      s.complete();
      s.next(3);
      s.error("never dispatch error");
    })
    .subscribe_all(
      move |_| c_next.set(c_next.get() + 1),
      move |_| c_err.set(c_err.get() + 1),
      move || c_complete.set(c_complete.get() + 1),
    );

    assert_eq!(next.get(), 3);
    assert_eq!(complete.get(), 1);
    assert_eq!(err.get(), 0);
  }

  #[test]
  fn cold_producer_runs_per_subscription() {
    let runs = Rc::new(Cell::new(0));
    let c_runs = runs.clone();
    let source = observable::create(move |s: Subscriber<i32, ()>| {
      c_runs.set(c_runs.get() + 1);
      s.next(c_runs.get());
      s.complete();
    });

    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let (c_first, c_second) = (first.clone(), second.clone());
    source.clone().subscribe(move |v| c_first.set(v));
    source.subscribe(move |v| c_second.set(v));
    assert_eq!(runs.get(), 2);
    assert_eq!((first.get(), second.get()), (1, 2));
  }

  #[test]
  fn teardown_runs_once_after_completion() {
    let torn = Rc::new(Cell::new(0));
    let c_torn = torn.clone();
    let subscription = observable::create(move |s: Subscriber<i32, ()>| {
      s.next(1);
      s.complete();
      Teardown::from_fn(move || c_torn.set(c_torn.get() + 1))
    })
    .subscribe(|_| {});
    assert_eq!(torn.get(), 1);
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(torn.get(), 1);
  }

  #[test]
  fn unsubscribe_runs_teardown() {
    let torn = Rc::new(Cell::new(false));
    let c_torn = torn.clone();
    let subscription = observable::create(move |_: Subscriber<i32, ()>| {
      Teardown::from_fn(move || c_torn.set(true))
    })
    .subscribe(|_| {});
    assert!(!torn.get());
    subscription.unsubscribe();
    assert!(torn.get());
  }

  #[test]
  fn failing_producer_errors() {
    let err = Rc::new(Cell::new(""));
    let c_err = err.clone();
    observable::try_create(|_: Subscriber<i32, &'static str>| -> Result<(), &'static str> {
      Err("refused")
    })
    .subscribe_err(|_| {}, move |e| c_err.set(e));
    assert_eq!(err.get(), "refused");
  }
}
