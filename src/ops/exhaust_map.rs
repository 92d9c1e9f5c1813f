use std::{cell::Cell, rc::Rc};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Projects a source value to an inner observable only while no other inner
/// is running; values arriving in the meantime are dropped.
#[derive(Clone)]
pub struct ExhaustMapOp<S, F> {
  pub source: S,
  pub func: F,
}

#[derive(Default)]
struct ExhaustState {
  active: Cell<bool>,
  outer_completed: Cell<bool>,
}

impl<S, F, R> Observable for ExhaustMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> R + 'static,
  R: Observable<Err = S::Err>,
{
  type Item = R::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<R::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let outer =
      ExhaustMapOuterObserver { observer: subscriber, state: Rc::new(ExhaustState::default()), func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(outer, upstream));
  }
}

#[doc(hidden)]
pub struct ExhaustMapOuterObserver<O, F> {
  observer: O,
  state: Rc<ExhaustState>,
  func: F,
}

#[doc(hidden)]
pub struct ExhaustMapInnerObserver<O> {
  observer: O,
  state: Rc<ExhaustState>,
}

impl<Item, Err, B, F, R> Observer<Item, Err> for ExhaustMapOuterObserver<Subscriber<B, Err>, F>
where
  B: 'static,
  Err: 'static,
  F: FnMut(Item) -> R,
  R: Observable<Item = B, Err = Err>,
{
  fn next(&mut self, value: Item) {
    if self.state.active.get() {
      return;
    }
    self.state.active.set(true);
    let inner = (self.func)(value);
    let observer = ExhaustMapInnerObserver { observer: self.observer.clone(), state: self.state.clone() };
    let child = self.observer.subscription().child();
    inner.actual_subscribe(Subscriber::with_subscription(observer, child));
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    self.state.outer_completed.set(true);
    if !self.state.active.get() {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item, Err> Observer<Item, Err> for ExhaustMapInnerObserver<Subscriber<Item, Err>> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    self.state.active.set(false);
    if self.state.outer_completed.get() {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
