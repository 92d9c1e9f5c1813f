use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use crate::{
  notification::Notification,
  observer::{BoxedObserver, Observer},
  subscription::{Subscription, SubscriptionLike, Teardown},
};

/// Implements the Observer trait and Subscription trait. While the Observer is
/// the public API for consuming the values of an Observable, all Observers get
/// converted to a Subscriber, in order to provide Subscription capabilities.
///
/// A `Subscriber` is what a producer talks to. It guarantees the observer
/// grammar to the wrapped observer:
///
/// - nothing is delivered once the subscription is closed,
/// - at most one terminal notification is delivered, after which the
///   subscription tears itself down,
/// - notifications emitted while another one is being delivered (e.g. an
///   observer feeding a subject it is subscribed to) are queued and delivered
///   afterwards in emission order, never nested.
///
/// Clones share the same observer and subscription.
pub struct Subscriber<Item, Err>(Rc<Inner<Item, Err>>);

struct Inner<Item, Err> {
  observer: RefCell<Option<BoxedObserver<Item, Err>>>,
  queue: RefCell<VecDeque<Notification<Item, Err>>>,
  draining: Cell<bool>,
  stopped: Cell<bool>,
  subscription: Subscription,
}

impl<Item: 'static, Err: 'static> Subscriber<Item, Err> {
  pub fn new(observer: impl Observer<Item, Err> + 'static) -> Self {
    Self::with_subscription(observer, Subscription::default())
  }

  /// Wrap `observer`, using `subscription` to control its lifetime.
  ///
  /// Operators use this with a child of their downstream subscription so the
  /// upstream is torn down together with the downstream.
  pub fn with_subscription(
    observer: impl Observer<Item, Err> + 'static, subscription: Subscription,
  ) -> Self {
    let inner = Rc::new(Inner {
      observer: RefCell::new(Some(Box::new(observer) as BoxedObserver<Item, Err>)),
      queue: RefCell::new(VecDeque::new()),
      draining: Cell::new(false),
      stopped: Cell::new(false),
      subscription: subscription.clone(),
    });

    // Release the observer as soon as the subscription closes, so captured
    // state is freed even though the producer may keep this subscriber.
    let weak = Rc::downgrade(&inner);
    subscription.add(Teardown::from_fn(move || {
      if let Some(inner) = weak.upgrade() {
        inner.release_observer();
      }
    }));
    Subscriber(inner)
  }
}

impl<Item, Err> Subscriber<Item, Err> {
  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.0.subscription }

  /// Register `teardown` on this subscriber's subscription.
  #[inline]
  pub fn add(&self, teardown: impl Into<Teardown>) { self.0.subscription.add(teardown) }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.stopped.get() || self.0.subscription.is_closed() }

  pub fn next(&self, value: Item) {
    if !self.is_closed() {
      self.deliver(Notification::Next(value));
    }
  }

  pub fn error(&self, err: Err) {
    if !self.is_closed() {
      self.0.stopped.set(true);
      self.deliver(Notification::Error(err));
    }
  }

  pub fn complete(&self) {
    if !self.is_closed() {
      self.0.stopped.set(true);
      self.deliver(Notification::Complete);
    }
  }

  /// Queue every value before delivering any of them, so values emitted
  /// while the batch is being delivered arrive after the whole batch.
  pub fn next_all(&self, values: impl IntoIterator<Item = Item>) {
    if !self.is_closed() {
      self.0.queue.borrow_mut().extend(values.into_iter().map(Notification::Next));
      self.drain();
    }
  }

  pub fn unsubscribe(&self) { self.0.subscription.unsubscribe() }

  fn deliver(&self, notification: Notification<Item, Err>) {
    self.0.queue.borrow_mut().push_back(notification);
    self.drain();
  }

  fn drain(&self) {
    let inner = &*self.0;
    if inner.draining.replace(true) {
      return;
    }

    loop {
      let notification = inner.queue.borrow_mut().pop_front();
      let Some(notification) = notification else {
        break;
      };
      if inner.subscription.is_closed() {
        inner.queue.borrow_mut().clear();
        break;
      }
      if notification.is_terminal() {
        let observer = inner.observer.borrow_mut().take();
        if let Some(mut observer) = observer {
          notification.accept(&mut observer);
        }
        inner.subscription.unsubscribe();
      } else if let Some(observer) = inner.observer.borrow_mut().as_mut() {
        notification.accept(observer);
      }
    }

    inner.draining.set(false);
    if inner.subscription.is_closed() {
      inner.release_observer();
    }
  }
}

impl<Item, Err> Inner<Item, Err> {
  fn release_observer(&self) {
    // Still borrowed when unsubscribed from inside its own callback; the
    // drain loop releases it once the callback returns.
    let observer = self.observer.try_borrow_mut().ok().and_then(|mut o| o.take());
    drop(observer);
  }
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self { Subscriber(self.0.clone()) }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subscriber::is_closed(self) }
}

impl<Item, Err> SubscriptionLike for Subscriber<Item, Err> {
  #[inline]
  fn unsubscribe(&self) { Subscriber::unsubscribe(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subscriber::is_closed(self) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::observer::ObserverAll;

  type Log = Rc<RefCell<Vec<String>>>;

  fn logging_subscriber() -> (Log, Subscriber<i32, &'static str>) {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscriber = Subscriber::new(ObserverAll {
      next: move |v: i32| l1.borrow_mut().push(format!("next {v}")),
      error: move |e: &'static str| l2.borrow_mut().push(format!("error {e}")),
      complete: move || l3.borrow_mut().push("complete".to_owned()),
    });
    (log, subscriber)
  }

  #[test]
  fn next_and_complete() {
    let (log, subscriber) = logging_subscriber();
    subscriber.next(1);
    subscriber.next(2);
    subscriber.complete();
    subscriber.next(3);
    subscriber.complete();
    assert_eq!(*log.borrow(), vec!["next 1", "next 2", "complete"]);
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn next_and_error() {
    let (log, subscriber) = logging_subscriber();
    subscriber.next(1);
    subscriber.error("boom");
    subscriber.next(2);
    subscriber.error("again");
    assert_eq!(*log.borrow(), vec!["next 1", "error boom"]);
  }

  #[test]
  fn nothing_after_unsubscribe() {
    let (log, subscriber) = logging_subscriber();
    subscriber.next(1);
    subscriber.unsubscribe();
    subscriber.next(2);
    subscriber.complete();
    assert_eq!(*log.borrow(), vec!["next 1"]);
  }

  #[test]
  fn terminal_runs_teardown_once() {
    let (_, subscriber) = logging_subscriber();
    let runs = Rc::new(Cell::new(0));
    let c_runs = runs.clone();
    subscriber.add(Teardown::from_fn(move || c_runs.set(c_runs.get() + 1)));
    subscriber.complete();
    subscriber.unsubscribe();
    assert_eq!(runs.get(), 1);
  }

  #[test]
  fn reentrant_emissions_are_queued_in_order() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, ()>>>> = Rc::new(RefCell::new(None));
    let (c_log, c_slot) = (log.clone(), slot.clone());
    let subscriber = Subscriber::new(ObserverAll {
      next: move |v: i32| {
        c_log.borrow_mut().push(format!("start {v}"));
        if v == 1 {
          let s = c_slot.borrow().clone();
          if let Some(s) = s {
            s.next(2);
            s.complete();
          }
        }
        c_log.borrow_mut().push(format!("end {v}"));
      },
      error: |_: ()| {},
      complete: {
        let log = log.clone();
        move || log.borrow_mut().push("complete".to_owned())
      },
    });
    *slot.borrow_mut() = Some(subscriber.clone());
    subscriber.next(1);
    slot.borrow_mut().take();
    assert_eq!(*log.borrow(), vec!["start 1", "end 1", "start 2", "end 2", "complete"]);
  }

  #[test]
  fn batch_is_delivered_before_values_emitted_during_it() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, ()>>>> = Rc::new(RefCell::new(None));
    let (c_log, c_slot) = (log.clone(), slot.clone());
    let subscriber = Subscriber::new(ObserverAll {
      next: move |v: i32| {
        c_log.borrow_mut().push(format!("next {v}"));
        let s = c_slot.borrow().clone();
        if let (1, Some(s)) = (v, s) {
          s.next(99);
        }
      },
      error: |_: ()| {},
      complete: || {},
    });
    *slot.borrow_mut() = Some(subscriber.clone());
    subscriber.next_all(vec![1, 2, 3]);
    slot.borrow_mut().take();
    assert_eq!(*log.borrow(), vec!["next 1", "next 2", "next 3", "next 99"]);
  }

  #[test]
  fn unsubscribe_from_inside_next() {
    let log: Log = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, ()>>>> = Rc::new(RefCell::new(None));
    let (c_log, c_slot) = (log.clone(), slot.clone());
    let subscriber = Subscriber::new(ObserverAll {
      next: move |v: i32| {
        c_log.borrow_mut().push(format!("next {v}"));
        let s = c_slot.borrow().clone();
        if let Some(s) = s {
          s.unsubscribe();
          s.next(v + 100);
        }
      },
      error: |_: ()| {},
      complete: || {},
    });
    *slot.borrow_mut() = Some(subscriber.clone());
    subscriber.next(1);
    subscriber.next(2);
    slot.borrow_mut().take();
    assert_eq!(*log.borrow(), vec!["next 1"]);
  }
}
