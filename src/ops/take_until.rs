use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct TakeUntilOp<S, N> {
  pub source: S,
  pub notifier: N,
}

impl<S, N> Observable for TakeUntilOp<S, N>
where
  S: Observable,
  N: Observable<Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let notifier = NotifierObserver { observer: subscriber.clone() };
    let notifier_subscription = subscriber.subscription().child();
    self.notifier.actual_subscribe(Subscriber::with_subscription(notifier, notifier_subscription));
    if subscriber.is_closed() {
      return;
    }
    self.source.actual_subscribe(subscriber);
  }
}

pub struct NotifierObserver<O> {
  observer: O,
}

impl<Item, N, Err> Observer<N, Err> for NotifierObserver<Subscriber<Item, Err>> {
  fn next(&mut self, _: N) { self.observer.complete() }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  // A notifier that completes without emitting leaves the source running.
  fn complete(&mut self) {}

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn completes_when_notifier_emits() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    let source = Subject::<i32, ()>::new();
    let stop = Subject::<(), ()>::new();
    source.clone().take_until(stop.clone()).subscribe_complete(
      move |v| c_values.borrow_mut().push(v),
      move || *c_completed.borrow_mut() = true,
    );
    source.next(1);
    source.next(2);
    stop.next(());
    source.next(3);
    assert_eq!(*values.borrow(), vec![1, 2]);
    assert!(*completed.borrow());
    assert_eq!(source.observer_count(), 0);
    assert_eq!(stop.observer_count(), 0);
  }

  #[test]
  fn notifier_completing_silently_is_ignored() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(0..3)
      .take_until(observable::empty::<(), ()>())
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![0, 1, 2]);
  }
}
