use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// On error, switches to the observable built from that error.
///
/// Values already forwarded stay forwarded; the replacement's notifications
/// follow directly, and its error type becomes the stream's error type.
#[derive(Clone)]
pub struct CatchErrorOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F, R> Observable for CatchErrorOp<S, F>
where
  S: Observable,
  F: FnOnce(S::Err) -> R + 'static,
  R: Observable<Item = S::Item>,
{
  type Item = S::Item;
  type Err = R::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, R::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = CatchErrorObserver { observer: subscriber, func: Some(self.func) };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct CatchErrorObserver<O, F> {
  observer: O,
  func: Option<F>,
}

impl<Item, E1, E2, F, R> Observer<Item, E1> for CatchErrorObserver<Subscriber<Item, E2>, F>
where
  Item: 'static,
  E2: 'static,
  F: FnOnce(E1) -> R,
  R: Observable<Item = Item, Err = E2>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: E1) {
    if let Some(func) = self.func.take() {
      tracing::debug!("recovering from error with a replacement observable");
      func(err).actual_subscribe(self.observer.clone());
    }
  }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn switches_to_fallback() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    observable::from_iter::<_, &str>(vec![1, 2])
      .merge(observable::throw_err("lost connection"))
      .catch_error(|_| observable::from_iter::<_, ()>(vec![-1]))
      .subscribe_complete(move |v| c_values.borrow_mut().push(v), move || *c_completed.borrow_mut() = true);
    assert_eq!(*values.borrow(), vec![1, 2, -1]);
    assert!(*completed.borrow());
  }

  #[test]
  fn replacement_sees_the_error() {
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    observable::throw_err::<i32, _>(RxError::producer("disk"))
      .catch_error(|e| observable::throw_err::<i32, _>(format!("wrapped: {e}")))
      .subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));
    assert_eq!(*errors.borrow(), vec!["wrapped: producer failed: disk".to_owned()]);
  }

  #[test]
  fn unsubscribe_reaches_replacement() {
    let fallback = Subject::<i32, ()>::new();
    let c_fallback = fallback.clone();
    let subscription =
      observable::throw_err::<i32, ()>(()).catch_error(move |_| c_fallback.clone()).subscribe(|_| {});
    assert_eq!(fallback.observer_count(), 1);
    subscription.unsubscribe();
    assert_eq!(fallback.observer_count(), 0);
  }
}
