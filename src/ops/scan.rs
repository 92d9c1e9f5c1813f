use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct ScanOp<S, F, Acc> {
  pub source: S,
  pub func: F,
  pub seed: Acc,
}

impl<S, F, Acc> Observable for ScanOp<S, F, Acc>
where
  S: Observable,
  F: FnMut(Acc, S::Item) -> Acc + 'static,
  Acc: Clone + 'static,
{
  type Item = Acc;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Acc, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = ScanObserver { observer: subscriber, func: self.func, acc: Some(self.seed) };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct ScanObserver<O, F, Acc> {
  observer: O,
  func: F,
  acc: Option<Acc>,
}

impl<Item, Err, F, Acc> Observer<Item, Err> for ScanObserver<Subscriber<Acc, Err>, F, Acc>
where
  F: FnMut(Acc, Item) -> Acc,
  Acc: Clone,
{
  fn next(&mut self, value: Item) {
    if let Some(acc) = self.acc.take() {
      let acc = (self.func)(acc, value);
      self.acc = Some(acc.clone());
      self.observer.next(acc);
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
  fn running_sum() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(vec![1, 1, 1, 1, 1])
      .scan(0, |acc, v| acc + v)
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn each_subscription_starts_from_seed() {
    let values = Rc::new(RefCell::new(vec![]));
    let source = observable::from_iter::<_, ()>(vec![2, 3]).scan(10, |acc, v| acc * v);
    for _ in 0..2 {
      let values = values.clone();
      source.clone().subscribe(move |v| values.borrow_mut().push(v));
    }
    assert_eq!(*values.borrow(), vec![20, 60, 20, 60]);
  }
}
