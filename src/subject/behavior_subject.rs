use crate::{
  error::SubjectError,
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subject::Subject,
  subscriber::Subscriber,
};

/// A subject holding a current value.
///
/// Every new observer synchronously receives the current value first, then
/// the values that follow. Once the subject terminated, late observers only
/// receive the terminal notification.
///
/// ```rust
/// use rxstream::prelude::*;
///
/// let state = BehaviorSubject::<_, ()>::new("idle");
/// state.next("loading");
/// let mut seen = vec![];
/// state.clone().subscribe(move |v| seen.push(v));
/// assert_eq!(state.value(), "loading");
/// ```
pub struct BehaviorSubject<Item, Err> {
  subject: Subject<Item, Err>,
  value: MutRc<Item>,
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(value: Item) -> Self { BehaviorSubject { subject: Subject::new(), value: MutRc::own(value) } }

  /// Build from an optional seed; a behavior subject cannot exist without
  /// one.
  pub fn try_new(value: Option<Item>) -> Result<Self, SubjectError> {
    value.map(Self::new).ok_or(SubjectError::MissingInitialValue)
  }

  /// The current value.
  pub fn value(&self) -> Item
  where
    Item: Clone,
  {
    self.value.rc_deref().clone()
  }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }

  pub fn is_closed(&self) -> bool { self.subject.is_closed() }

  /// Replace the current value and forward it. Ignored once terminated.
  pub fn next(&self, value: Item)
  where
    Item: Clone,
  {
    if self.subject.is_closed() {
      return;
    }
    *self.value.rc_deref_mut() = value.clone();
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

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { BehaviorSubject { subject: self.subject.clone(), value: self.value.clone() } }
}

impl<Item, Err> Observable for BehaviorSubject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    // Registered before the current value goes out, so a value pushed from
    // inside the observer's callback is queued behind it rather than lost.
    if self.subject.register(&subscriber) {
      let current = self.value();
      subscriber.next(current);
    } else {
      self.subject.actual_subscribe(subscriber);
    }
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for BehaviorSubject<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { BehaviorSubject::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { BehaviorSubject::error(self, err) }

  #[inline]
  fn complete(&mut self) { BehaviorSubject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { BehaviorSubject::is_closed(self) }
}
