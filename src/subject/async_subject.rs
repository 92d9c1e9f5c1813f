use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subject::{Subject, Terminal},
  subscriber::Subscriber,
};

/// A subject that emits only its last value, and only when it completes.
///
/// Observers attached before completion receive the last value followed by
/// `complete`; observers attached after completion receive the same. An
/// error discards the last value and is the only thing delivered.
pub struct AsyncSubject<Item, Err> {
  subject: Subject<Item, Err>,
  last: MutRc<Option<Item>>,
}

impl<Item, Err> AsyncSubject<Item, Err> {
  pub fn new() -> Self { AsyncSubject { subject: Subject::new(), last: MutRc::own(None) } }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }

  pub fn is_closed(&self) -> bool { self.subject.is_closed() }

  pub fn next(&self, value: Item) {
    if !self.subject.is_closed() {
      *self.last.rc_deref_mut() = Some(value);
    }
  }

  pub fn error(&self, err: Err)
  where
    Err: Clone,
  {
    if !self.subject.is_closed() {
      self.last.rc_deref_mut().take();
      self.subject.error(err);
    }
  }

  pub fn complete(&self)
  where
    Item: Clone,
  {
    if self.subject.is_closed() {
      return;
    }
    let last = self.last.rc_deref().clone();
    self.subject.complete_with(last);
  }
}

impl<Item, Err> Default for AsyncSubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for AsyncSubject<Item, Err> {
  fn clone(&self) -> Self { AsyncSubject { subject: self.subject.clone(), last: self.last.clone() } }
}

impl<Item, Err> Observable for AsyncSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    if self.subject.register(&subscriber) {
      return;
    }
    if let Some(Terminal::Completed) = self.subject.terminal() {
      let last = self.last.rc_deref().clone();
      if let Some(value) = last {
        subscriber.next(value);
      }
    }
    self.subject.actual_subscribe(subscriber);
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for AsyncSubject<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { AsyncSubject::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { AsyncSubject::error(self, err) }

  #[inline]
  fn complete(&mut self) { AsyncSubject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { AsyncSubject::is_closed(self) }
}
