use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

#[derive(Clone)]
pub struct TakeWhileOp<S, F> {
  pub source: S,
  pub predicate: F,
}

impl<S, F> Observable for TakeWhileOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer =
      TakeWhileObserver { observer: subscriber, upstream: upstream.clone(), predicate: self.predicate };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct TakeWhileObserver<O, F> {
  observer: O,
  upstream: Subscription,
  predicate: F,
}

impl<Item, Err, F> Observer<Item, Err> for TakeWhileObserver<Subscriber<Item, Err>, F>
where
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.observer.next(value);
    } else {
      self.upstream.unsubscribe();
      self.observer.complete();
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
  fn stops_at_first_failure() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    observable::from_iter::<_, ()>(vec![1, 2, 5, 1])
      .take_while(|v| *v < 3)
      .subscribe_complete(move |v| c_values.borrow_mut().push(v), move || *c_completed.borrow_mut() = true);
    assert_eq!(*values.borrow(), vec![1, 2]);
    assert!(*completed.borrow());
  }
}
