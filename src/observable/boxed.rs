use crate::{observable::Observable, subscriber::Subscriber};

trait BoxSubscribe<Item, Err> {
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<Item, Err>);
}

impl<O: Observable> BoxSubscribe<O::Item, O::Err> for O {
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<O::Item, O::Err>) {
    (*self).actual_subscribe(subscriber)
  }
}

trait BoxSubscribeClone<Item, Err>: BoxSubscribe<Item, Err> {
  fn box_clone(&self) -> Box<dyn BoxSubscribeClone<Item, Err>>;
}

impl<O> BoxSubscribeClone<O::Item, O::Err> for O
where
  O: Observable + Clone + 'static,
{
  fn box_clone(&self) -> Box<dyn BoxSubscribeClone<O::Item, O::Err>> { Box::new(self.clone()) }
}

/// A type-erased observable that can be subscribed once.
///
/// Useful to store observables of different concrete types in one place, or
/// to return one branch of several from a function.
pub struct BoxedObservable<Item, Err>(Box<dyn BoxSubscribe<Item, Err>>);

impl<Item: 'static, Err: 'static> BoxedObservable<Item, Err> {
  pub fn new(source: impl Observable<Item = Item, Err = Err> + 'static) -> Self {
    BoxedObservable(Box::new(source))
  }
}

impl<Item: 'static, Err: 'static> Observable for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { self.0.box_subscribe(subscriber) }
}

/// A type-erased observable that keeps `Clone`, so it can be subscribed any
/// number of times.
pub struct BoxedObservableClone<Item, Err>(Box<dyn BoxSubscribeClone<Item, Err>>);

impl<Item: 'static, Err: 'static> BoxedObservableClone<Item, Err> {
  pub fn new(source: impl Observable<Item = Item, Err = Err> + Clone + 'static) -> Self {
    BoxedObservableClone(Box::new(source))
  }
}

impl<Item, Err> Clone for BoxedObservableClone<Item, Err> {
  fn clone(&self) -> Self { BoxedObservableClone(self.0.box_clone()) }
}

impl<Item: 'static, Err: 'static> Observable for BoxedObservableClone<Item, Err> {
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { self.0.box_subscribe(subscriber) }
}
