use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct DistinctUntilChangedOp<S> {
  pub source: S,
}

impl<S> Observable for DistinctUntilChangedOp<S>
where
  S: Observable,
  S::Item: PartialEq + Clone,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let eq: fn(&S::Item, &S::Item) -> bool = PartialEq::eq;
    DistinctUntilChangedByOp { source: self.source, eq }.actual_subscribe(subscriber)
  }
}

#[derive(Clone)]
pub struct DistinctUntilChangedByOp<S, F> {
  pub source: S,
  pub eq: F,
}

impl<S, F> Observable for DistinctUntilChangedByOp<S, F>
where
  S: Observable,
  S::Item: Clone,
  F: FnMut(&S::Item, &S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = DistinctUntilChangedObserver { observer: subscriber, eq: self.eq, last: None };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct DistinctUntilChangedObserver<O, F, Item> {
  observer: O,
  eq: F,
  last: Option<Item>,
}

impl<Item, Err, F> Observer<Item, Err> for DistinctUntilChangedObserver<Subscriber<Item, Err>, F, Item>
where
  Item: Clone,
  F: FnMut(&Item, &Item) -> bool,
{
  fn next(&mut self, value: Item) {
    let unchanged = match &self.last {
      Some(last) => (self.eq)(last, &value),
      None => false,
    };
    if !unchanged {
      self.last = Some(value.clone());
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
