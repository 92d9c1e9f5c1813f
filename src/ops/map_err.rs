use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct MapErrOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F, E2> Observable for MapErrOp<S, F>
where
  S: Observable,
  F: FnMut(S::Err) -> E2 + 'static,
  E2: 'static,
{
  type Item = S::Item;
  type Err = E2;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, E2>) {
    let upstream = subscriber.subscription().child();
    let observer = MapErrObserver { observer: subscriber, func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct MapErrObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, E2, F> Observer<Item, Err> for MapErrObserver<Subscriber<Item, E2>, F>
where
  F: FnMut(Err) -> E2,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) { self.observer.error((self.func)(err)) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
