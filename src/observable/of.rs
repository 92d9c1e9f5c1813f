use std::marker::PhantomData;

use crate::{observable::Observable, subscriber::Subscriber};

/// Creates an observable producing a single value, then completing.
///
/// ```rust
/// use rxstream::prelude::*;
///
/// observable::of::<_, ()>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item, Err>(v: Item) -> ObservableOf<Item, Err> { ObservableOf(v, PhantomData) }

#[derive(Clone)]
pub struct ObservableOf<Item, Err>(Item, PhantomData<fn() -> Err>);

impl<Item: 'static, Err: 'static> Observable for ObservableOf<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    subscriber.next(self.0);
    subscriber.complete();
  }
}

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Stops pulling from the
/// iterator as soon as the subscriber is closed, so an infinite iterator is
/// fine behind `take`.
///
/// ```rust
/// use rxstream::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).subscribe(|v| println!("{v}"));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, PhantomData)
}

#[derive(Clone)]
pub struct ObservableIter<Iter, Err>(Iter, PhantomData<fn() -> Err>);

impl<Iter, Err> Observable for ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
  Iter::Item: 'static,
  Err: 'static,
{
  type Item = Iter::Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Iter::Item, Err>) {
    for v in self.0 {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(v);
    }
    subscriber.complete();
  }
}

/// Creates an observable that completes immediately without emitting.
pub fn empty<Item, Err>() -> ObservableEmpty<Item, Err> { ObservableEmpty(PhantomData) }

pub struct ObservableEmpty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for ObservableEmpty<Item, Err> {
  fn clone(&self) -> Self { ObservableEmpty(PhantomData) }
}

impl<Item: 'static, Err: 'static> Observable for ObservableEmpty<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { subscriber.complete(); }
}

/// Creates an observable that never emits anything, not even a terminal
/// notification.
pub fn never<Item, Err>() -> ObservableNever<Item, Err> { ObservableNever(PhantomData) }

pub struct ObservableNever<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for ObservableNever<Item, Err> {
  fn clone(&self) -> Self { ObservableNever(PhantomData) }
}

impl<Item: 'static, Err: 'static> Observable for ObservableNever<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, _: Subscriber<Item, Err>) {}
}

/// Creates an observable that errors immediately with `err`.
pub fn throw_err<Item, Err>(err: Err) -> ObservableThrow<Item, Err> {
  ObservableThrow(err, PhantomData)
}

pub struct ObservableThrow<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ObservableThrow<Item, Err> {
  fn clone(&self) -> Self { ObservableThrow(self.0.clone(), PhantomData) }
}

impl<Item: 'static, Err: 'static> Observable for ObservableThrow<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) { subscriber.error(self.0); }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn from_range() {
    let hit_count = Rc::new(RefCell::new(0));
    let completed = Rc::new(RefCell::new(false));
    let (c_hit, c_completed) = (hit_count.clone(), completed.clone());
    observable::from_iter::<_, ()>(0..100)
      .subscribe_complete(move |_| *c_hit.borrow_mut() += 1, move || *c_completed.borrow_mut() = true);

    assert_eq!(*hit_count.borrow(), 100);
    assert!(*completed.borrow());
  }

  #[test]
  fn from_vec() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(vec![0, 1, 2, 3])
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![0, 1, 2, 3]);
  }

  #[test]
  fn infinite_iterator_behind_take() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    observable::from_iter::<_, ()>(0..)
      .take(3)
      .subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![0, 1, 2]);
  }

  #[test]
  fn of_single_value() {
    let value = Rc::new(RefCell::new(0));
    let completed = Rc::new(RefCell::new(false));
    let (c_value, c_completed) = (value.clone(), completed.clone());
    observable::of::<_, ()>(100)
      .subscribe_complete(move |v| *c_value.borrow_mut() = v, move || *c_completed.borrow_mut() = true);
    assert_eq!(*value.borrow(), 100);
    assert!(*completed.borrow());
  }

  #[test]
  fn empty_completes() {
    let hits = Rc::new(RefCell::new(0));
    let completed = Rc::new(RefCell::new(false));
    let (c_hits, c_completed) = (hits.clone(), completed.clone());
    observable::empty::<i32, ()>()
      .subscribe_complete(move |_| *c_hits.borrow_mut() += 1, move || *c_completed.borrow_mut() = true);
    assert_eq!(*hits.borrow(), 0);
    assert!(*completed.borrow());
  }

  #[test]
  fn never_stays_open() {
    let subscription = observable::never::<i32, ()>().subscribe(|_| {});
    assert!(!subscription.is_closed());
    subscription.unsubscribe();
    assert!(subscription.is_closed());
  }

  #[test]
  fn throw_err_errors() {
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    observable::throw_err::<i32, _>("boom")
      .subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));
    assert_eq!(*errors.borrow(), vec!["boom"]);
  }
}
