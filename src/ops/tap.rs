use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct TapOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F> Observable for TapOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = TapObserver { observer: subscriber, func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, F> Observer<Item, Err> for TapObserver<Subscriber<Item, Err>, F>
where
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
