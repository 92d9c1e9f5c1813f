use std::{cell::Cell, rc::Rc};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  pub source1: S1,
  pub source2: S2,
}

impl<S1, S2> Observable for MergeOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item, Err = S1::Err>,
{
  type Item = S1::Item;
  type Err = S1::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S1::Item, S1::Err>) {
    let remaining = Rc::new(Cell::new(2));
    let o1 = MergeObserver { observer: subscriber.clone(), remaining: remaining.clone() };
    let child = subscriber.subscription().child();
    self.source1.actual_subscribe(Subscriber::with_subscription(o1, child));

    let o2 = MergeObserver { observer: subscriber.clone(), remaining };
    let child = subscriber.subscription().child();
    self.source2.actual_subscribe(Subscriber::with_subscription(o2, child));
  }
}

/// Subscribes to every source at once and interleaves their values.
///
/// Completes once all sources completed, errors as soon as one of them
/// errors. With no sources it completes immediately.
pub fn merge_all<S, I>(sources: I) -> MergeAllOp<S>
where
  I: IntoIterator<Item = S>,
  S: Observable,
{
  MergeAllOp { sources: sources.into_iter().collect() }
}

#[derive(Clone)]
pub struct MergeAllOp<S> {
  pub sources: Vec<S>,
}

impl<S: Observable> Observable for MergeAllOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    if self.sources.is_empty() {
      subscriber.complete();
      return;
    }
    let remaining = Rc::new(Cell::new(self.sources.len()));
    for source in self.sources {
      if subscriber.is_closed() {
        break;
      }
      let observer = MergeObserver { observer: subscriber.clone(), remaining: remaining.clone() };
      let child = subscriber.subscription().child();
      source.actual_subscribe(Subscriber::with_subscription(observer, child));
    }
  }
}

pub struct MergeObserver<O> {
  observer: O,
  remaining: Rc<Cell<usize>>,
}

impl<Item, Err> Observer<Item, Err> for MergeObserver<Subscriber<Item, Err>> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let remaining = self.remaining.get() - 1;
    self.remaining.set(remaining);
    if remaining == 0 {
      self.observer.complete()
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn odd_even_merge() {
    let numbers = Subject::<i32, ()>::new();
    let odd = numbers.clone().filter(|v| v % 2 != 0);
    let even = numbers.clone().filter(|v| v % 2 == 0);

    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    odd.merge(even).subscribe(move |v| c_values.borrow_mut().push(v));
    (0..5).for_each(|v| numbers.next(v));
    assert_eq!(*values.borrow(), vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn completes_after_both() {
    let s1 = Subject::<i32, ()>::new();
    let s2 = Subject::<i32, ()>::new();
    let completed = Rc::new(RefCell::new(false));
    let c_completed = completed.clone();
    s1.clone().merge(s2.clone()).subscribe_complete(|_| {}, move || *c_completed.borrow_mut() = true);
    s1.complete();
    assert!(!*completed.borrow());
    s2.complete();
    assert!(*completed.borrow());
  }

  #[test]
  fn error_tears_down_other_source() {
    let s1 = Subject::<i32, &str>::new();
    let s2 = Subject::<i32, &str>::new();
    let errors = Rc::new(RefCell::new(vec![]));
    let c_errors = errors.clone();
    s1.clone().merge(s2.clone()).subscribe_err(|_| {}, move |e| c_errors.borrow_mut().push(e));
    s1.error("boom");
    assert_eq!(*errors.borrow(), vec!["boom"]);
    assert_eq!(s2.observer_count(), 0);
  }

  #[test]
  fn unsubscribe_cascades_to_sources() {
    let s1 = Subject::<i32, ()>::new();
    let s2 = Subject::<i32, ()>::new();
    let subscription = s1.clone().merge(s2.clone()).subscribe(|_| {});
    assert_eq!((s1.observer_count(), s2.observer_count()), (1, 1));
    subscription.unsubscribe();
    assert_eq!((s1.observer_count(), s2.observer_count()), (0, 0));
  }

  #[test]
  fn merge_all_sources() {
    let values = Rc::new(RefCell::new(vec![]));
    let completed = Rc::new(RefCell::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    observable::merge_all(vec![
      observable::from_iter::<_, ()>(vec![1, 2]),
      observable::from_iter(vec![3]),
      observable::from_iter(vec![]),
    ])
    .subscribe_complete(move |v| c_values.borrow_mut().push(v), move || *c_completed.borrow_mut() = true);
    assert_eq!(*values.borrow(), vec![1, 2, 3]);
    assert!(*completed.borrow());
  }

  #[test]
  fn merge_all_empty_completes() {
    let completed = Rc::new(RefCell::new(false));
    let c_completed = completed.clone();
    observable::merge_all(Vec::<observable::ObservableEmpty<i32, ()>>::new())
      .subscribe_complete(|_| {}, move || *c_completed.borrow_mut() = true);
    assert!(*completed.borrow());
  }
}
