use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct SkipOp<S> {
  pub source: S,
  pub count: usize,
}

impl<S: Observable> Observable for SkipOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = SkipObserver { observer: subscriber, remaining: self.count };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct SkipObserver<O> {
  observer: O,
  remaining: usize,
}

impl<Item, Err> Observer<Item, Err> for SkipObserver<Subscriber<Item, Err>> {
  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
    } else {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
