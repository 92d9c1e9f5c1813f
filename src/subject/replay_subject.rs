use std::collections::VecDeque;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subject::Subject,
  subscriber::Subscriber,
};

/// A subject that replays the last `capacity` values, oldest first, to every
/// new observer. After termination the replay is followed by the terminal
/// notification.
pub struct ReplaySubject<Item, Err> {
  subject: Subject<Item, Err>,
  buffer: MutRc<VecDeque<Item>>,
  capacity: usize,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  pub fn new(capacity: usize) -> Self {
    ReplaySubject {
      subject: Subject::new(),
      buffer: MutRc::own(VecDeque::with_capacity(capacity)),
      capacity,
    }
  }

  pub fn capacity(&self) -> usize { self.capacity }

  /// Number of values currently held for replay.
  pub fn buffered(&self) -> usize { self.buffer.rc_deref().len() }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }

  pub fn is_closed(&self) -> bool { self.subject.is_closed() }

  pub fn next(&self, value: Item)
  where
    Item: Clone,
  {
    if self.subject.is_closed() {
      return;
    }
    if self.capacity > 0 {
      let mut buffer = self.buffer.rc_deref_mut();
      if buffer.len() == self.capacity {
        buffer.pop_front();
      }
      buffer.push_back(value.clone());
    }
    self.subject.next(value);
  }

  pub fn error(&self, err: Err)
  where
    Err: Clone,
  {
    self.subject.error(err)
  }

  pub fn complete(&self) { self.subject.complete() }
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self {
    ReplaySubject { subject: self.subject.clone(), buffer: self.buffer.clone(), capacity: self.capacity }
  }
}

impl<Item, Err> Observable for ReplaySubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    let replay: Vec<Item> = self.buffer.rc_deref().iter().cloned().collect();
    let registered = self.subject.register(&subscriber);
    subscriber.next_all(replay);
    if !registered {
      if let Some(terminal) = self.subject.terminal() {
        terminal.deliver(&subscriber);
      }
    }
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for ReplaySubject<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { ReplaySubject::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { ReplaySubject::error(self, err) }

  #[inline]
  fn complete(&mut self) { ReplaySubject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { ReplaySubject::is_closed(self) }
}
