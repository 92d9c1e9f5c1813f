use smallvec::SmallVec;

use crate::subscriber::Subscriber;

/// Registry of the observers attached to a subject.
///
/// Every entry gets a unique id at registration, which is what its teardown
/// uses to remove it again. Delivery never iterates the registry in place:
/// callers take a [`snapshot`](Subscribers::snapshot) (for `next`) or
/// [`drain`](Subscribers::drain) it (for terminal notifications), release
/// the borrow, and only then call into the observers.
pub struct Subscribers<Item, Err> {
  next_id: usize,
  entries: SmallVec<[(usize, Subscriber<Item, Err>); 2]>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, entries: SmallVec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add an observer and return its id.
  pub fn add(&mut self, subscriber: Subscriber<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.entries.push((id, subscriber));
    id
  }

  pub fn remove(&mut self, id: usize) -> Option<Subscriber<Item, Err>> {
    let pos = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
    Some(self.entries.remove(pos).1)
  }

  #[inline]
  pub fn len(&self) -> usize { self.entries.len() }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// The registered observers, in registration order.
  pub fn snapshot(&self) -> SmallVec<[Subscriber<Item, Err>; 2]> {
    self.entries.iter().map(|(_, s)| s.clone()).collect()
  }

  /// Remove and return every registered observer.
  pub fn drain(&mut self) -> SmallVec<[Subscriber<Item, Err>; 2]> {
    self.entries.drain(..).map(|(_, s)| s).collect()
  }
}

/// Deliver `value` to every target, cloning for all but the last, which gets
/// the value itself.
pub(crate) fn broadcast_value<Item: Clone, Err>(targets: &[Subscriber<Item, Err>], value: Item) {
  let Some((last, rest)) = targets.split_last() else { return };
  for subscriber in rest {
    subscriber.next(value.clone());
  }
  last.next(value);
}

/// Deliver `err` to every target, cloning for all but the last.
pub(crate) fn broadcast_error<Item, Err: Clone>(targets: &[Subscriber<Item, Err>], err: Err) {
  let Some((last, rest)) = targets.split_last() else { return };
  for subscriber in rest {
    subscriber.error(err.clone());
  }
  last.error(err);
}
