use crate::{observable::Observable, subscriber::Subscriber};

/// Emits `values` synchronously on subscribe, then mirrors the source.
#[derive(Clone)]
pub struct StartWithOp<S: Observable> {
  pub source: S,
  pub values: Vec<S::Item>,
}

impl<S: Observable> Observable for StartWithOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    for value in self.values {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(value);
    }
    if !subscriber.is_closed() {
      self.source.actual_subscribe(subscriber);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn prepends_values() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(vec![3, 4])
      .start_with(vec![1, 2])
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![1, 2, 3, 4]);
  }

  #[test]
  fn stops_when_downstream_closes() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    let source = Subject::<i32, ()>::new();
    source
      .clone()
      .start_with(vec![1, 2, 3])
      .take(2)
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![1, 2]);
    assert_eq!(source.observer_count(), 0);
  }
}
