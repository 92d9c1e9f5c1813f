use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct MapOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B + 'static,
  B: 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<B, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = MapObserver { observer: subscriber, func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, F> Observer<Item, Err> for MapObserver<Subscriber<B, Err>, F>
where
  F: FnMut(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct TryMapOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F, B> Observable for TryMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> Result<B, S::Err> + 'static,
  B: 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<B, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = TryMapObserver { observer: subscriber, func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct TryMapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, F> Observer<Item, Err> for TryMapObserver<Subscriber<B, Err>, F>
where
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
      Err(err) => self.observer.error(err),
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct PluckOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F, B> Observable for PluckOp<S, F>
where
  S: Observable,
  F: for<'a> FnMut(&'a S::Item) -> &'a B + 'static,
  B: Clone + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<B, S::Err>) {
    let upstream = subscriber.subscription().child();
    let observer = PluckObserver { observer: subscriber, func: self.func };
    self.source.actual_subscribe(Subscriber::with_subscription(observer, upstream));
  }
}

pub struct PluckObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, F> Observer<Item, Err> for PluckObserver<Subscriber<B, Err>, F>
where
  F: for<'a> FnMut(&'a Item) -> &'a B,
  B: Clone,
{
  fn next(&mut self, value: Item) {
    let field = (self.func)(&value).clone();
    self.observer.next(field)
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
