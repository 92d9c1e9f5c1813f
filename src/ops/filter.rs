use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub source: S,
  pub filter: F,
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = FilterObserver { observer: subscriber, filter: self.filter };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, F> Observer<Item, Err> for FilterObserver<Subscriber<Item, Err>, F>
where
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn fork_and_shared() {
    let evens = Rc::new(RefCell::new(vec![]));
    let c_evens = evens.clone();
    let filtered = observable::from_iter::<_, ()>(0..10).filter(|v| v % 2 == 0);
    filtered.clone().subscribe(|_| {});
    filtered.subscribe(move |v| c_evens.borrow_mut().push(v));
    assert_eq!(*evens.borrow(), vec![0, 2, 4, 6, 8]);
  }

  #[test]
  fn errors_pass_through() {
    let errors = Rc::new(RefCell::new(0));
    let c_errors = errors.clone();
    observable::throw_err::<i32, _>("bad")
      .filter(|_| false)
      .subscribe_err(|_| {}, move |_| *c_errors.borrow_mut() += 1);
    assert_eq!(*errors.borrow(), 1);
  }
}
