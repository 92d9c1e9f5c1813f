use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

/// Emits only the first `count` values emitted by the source Observable.
///
/// `take` returns an Observable that emits only the first `count` values
/// emitted by the source Observable. If the source emits fewer than `count`
/// values then all of its values are emitted. After that, it completes,
/// regardless if the source completes.
#[derive(Clone)]
pub struct TakeOp<S> {
  pub source: S,
  pub count: usize,
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    if self.count == 0 {
      subscriber.complete();
      return;
    }
    let upstream = subscriber.subscription().child();
    let observer = TakeObserver { observer: subscriber, upstream: upstream.clone(), remaining: self.count };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct TakeObserver<O> {
  observer: O,
  upstream: Subscription,
  remaining: usize,
}

impl<Item, Err> Observer<Item, Err> for TakeObserver<Subscriber<Item, Err>> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.observer.next(value);
    if self.remaining == 0 {
      self.upstream.unsubscribe();
      self.observer.complete();
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.remaining == 0 || self.observer.is_closed() }
}
