//! Hot, multicast observables.
//!
//! A subject is both an [`Observer`] (values are pushed into it with `next`,
//! `error` and `complete`) and an [`Observable`] (any number of observers can
//! attach to it). Unlike a cold observable, subscribing never starts a
//! producer: an observer only sees what is pushed while it is attached, plus
//! whatever the subject variant replays on attach:
//!
//! | Variant             | Replayed to a new observer                        |
//! |---------------------|---------------------------------------------------|
//! | [`Subject`]         | nothing                                           |
//! | [`BehaviorSubject`] | the current value                                 |
//! | [`ReplaySubject`]   | the last `n` values                               |
//! | [`AsyncSubject`]    | the last value, and only once completed           |
//!
//! Once a subject terminated, later observers immediately receive the stored
//! terminal notification (after the variant's replay, if any).
//!
//! All handles are cheap clones of one shared core.

use std::fmt::{Debug, Formatter};

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subscriber::Subscriber,
  subscription::Teardown,
};

mod async_subject;
mod behavior_subject;
mod replay_subject;
mod subscribers;

pub use async_subject::AsyncSubject;
pub use behavior_subject::BehaviorSubject;
pub use replay_subject::ReplaySubject;
use subscribers::{broadcast_error, broadcast_value, Subscribers};

/// How a subject ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Terminal<Err> {
  Completed,
  Errored(Err),
}

impl<Err> Terminal<Err> {
  fn deliver<Item>(self, subscriber: &Subscriber<Item, Err>) {
    match self {
      Terminal::Completed => subscriber.complete(),
      Terminal::Errored(err) => subscriber.error(err),
    }
  }
}

struct SubjectCore<Item, Err> {
  observers: Subscribers<Item, Err>,
  terminal: Option<Terminal<Err>>,
}

/// A plain multicast subject: nothing is replayed to late observers.
///
/// ```rust
/// use rxstream::prelude::*;
///
/// let subject = Subject::<i32, ()>::new();
/// subject.clone().subscribe(|v| println!("A: {v}"));
/// subject.next(1);
/// subject.clone().subscribe(|v| println!("B: {v}"));
/// subject.next(2);
/// ```
pub struct Subject<Item, Err> {
  core: MutRc<SubjectCore<Item, Err>>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self {
    Subject { core: MutRc::own(SubjectCore { observers: Subscribers::default(), terminal: None }) }
  }

  /// Number of observers currently attached.
  pub fn observer_count(&self) -> usize { self.core.rc_deref().observers.len() }

  /// `true` once `error` or `complete` was called.
  pub fn is_closed(&self) -> bool { self.core.rc_deref().terminal.is_some() }

  /// Forward `value` to every observer attached when the call starts, in
  /// registration order. Ignored once the subject terminated.
  pub fn next(&self, value: Item)
  where
    Item: Clone,
  {
    let targets = {
      let core = self.core.rc_deref();
      if core.terminal.is_some() {
        return;
      }
      core.observers.snapshot()
    };
    broadcast_value(&targets, value);
  }

  pub fn error(&self, err: Err)
  where
    Err: Clone,
  {
    let targets = {
      let mut core = self.core.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.terminal = Some(Terminal::Errored(err.clone()));
      core.observers.drain()
    };
    broadcast_error(&targets, err);
  }

  pub fn complete(&self) {
    let targets = {
      let mut core = self.core.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.terminal = Some(Terminal::Completed);
      core.observers.drain()
    };
    for subscriber in targets {
      subscriber.complete();
    }
  }

  /// Complete after handing `last` to the observers attached right now. The
  /// subject is already terminated while `last` is delivered, so an observer
  /// attaching from inside that delivery goes through the terminal path.
  pub(crate) fn complete_with(&self, last: Option<Item>)
  where
    Item: Clone,
  {
    let targets = {
      let mut core = self.core.rc_deref_mut();
      if core.terminal.is_some() {
        return;
      }
      core.terminal = Some(Terminal::Completed);
      core.observers.drain()
    };
    if let Some(value) = last {
      broadcast_value(&targets, value);
    }
    for subscriber in targets {
      subscriber.complete();
    }
  }

  pub(crate) fn terminal(&self) -> Option<Terminal<Err>>
  where
    Err: Clone,
  {
    self.core.rc_deref().terminal.clone()
  }

  /// Attach `subscriber` without replaying anything. Returns `false` when the
  /// subject already terminated, in which case nothing was registered.
  pub(crate) fn register(&self, subscriber: &Subscriber<Item, Err>) -> bool
  where
    Item: 'static,
    Err: 'static,
  {
    if subscriber.is_closed() {
      return true;
    }
    let id = {
      let mut core = self.core.rc_deref_mut();
      if core.terminal.is_some() {
        return false;
      }
      core.observers.add(subscriber.clone())
    };
    tracing::debug!(id, "observer attached to subject");

    let weak = self.core.downgrade();
    subscriber.add(Teardown::from_fn(move || {
      if let Some(core) = weak.upgrade() {
        core.rc_deref_mut().observers.remove(id);
      }
    }));
    true
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { core: self.core.clone() } }
}

impl<Item, Err> Observable for Subject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    if !self.register(&subscriber) {
      if let Some(terminal) = self.terminal() {
        terminal.deliver(&subscriber);
      }
    }
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subject::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subject::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { Subject::is_closed(self) }
}

impl<Item, Err> Debug for Subject<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subject")
      .field("observers", &self.observer_count())
      .field("closed", &self.is_closed())
      .finish()
  }
}
