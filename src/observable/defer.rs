use crate::{observable::Observable, subscriber::Subscriber};

/// Creates an observable that calls `f` on every subscription and
/// subscribes to the observable it returns.
///
/// Use it to capture state that must be fresh per subscriber, such as the
/// time of subscription.
pub fn defer<F, O>(f: F) -> ObservableDefer<F>
where
  F: FnOnce() -> O,
  O: Observable,
{
  ObservableDefer(f)
}

#[derive(Clone)]
pub struct ObservableDefer<F>(F);

impl<F, O> Observable for ObservableDefer<F>
where
  F: FnOnce() -> O,
  O: Observable,
{
  type Item = O::Item;
  type Err = O::Err;

  fn actual_subscribe(self, subscriber: Subscriber<O::Item, O::Err>) {
    (self.0)().actual_subscribe(subscriber)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn no_results_before_deferred_subscribe() {
    let calls = Rc::new(Cell::new(0));
    let sum = Rc::new(Cell::new(0));
    let (c_calls, c_sum) = (calls.clone(), sum.clone());
    let deferred = observable::defer(move || {
      c_calls.set(c_calls.get() + 1);
      observable::of::<_, ()>(2)
    });
    assert_eq!(calls.get(), 0);

    for _ in 0..2 {
      let c_sum = c_sum.clone();
      deferred.clone().subscribe(move |v| c_sum.set(c_sum.get() + v));
    }
    assert_eq!(calls.get(), 2);
    assert_eq!(sum.get(), 4);
  }
}
