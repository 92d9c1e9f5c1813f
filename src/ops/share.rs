//! Share operator
//!
//! Turns a cold observable into a hot, reference-counted one. The first
//! subscriber connects a single subscription of the source to an internal
//! [`Subject`]; later subscribers attach to that subject. When the last
//! subscriber leaves, the source subscription is released. When the source
//! terminates, the connection is reset, so the next subscriber starts a
//! fresh one.

use crate::{
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  subject::Subject,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike, Teardown},
};

#[derive(Clone)]
pub struct ShareOp<S: Observable> {
  source: S,
  state: MutRc<ShareState<S::Item, S::Err>>,
}

#[doc(hidden)]
pub struct ShareState<Item, Err> {
  connection: Option<(Subject<Item, Err>, Subscription)>,
  ref_count: usize,
  /// Bumped on every connect and reset, so a subscriber of an old connection
  /// leaving late does not disturb the current one.
  generation: usize,
}

impl<S: Observable> ShareOp<S> {
  pub fn new(source: S) -> Self {
    ShareOp { source, state: MutRc::own(ShareState { connection: None, ref_count: 0, generation: 0 }) }
  }

  /// Number of subscribers attached to the current connection.
  pub fn ref_count(&self) -> usize { self.state.rc_deref().ref_count }
}

impl<S> Observable for ShareOp<S>
where
  S: Observable + Clone,
  S::Item: Clone,
  S::Err: Clone,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let (subject, connect, generation) = {
      let mut state = self.state.rc_deref_mut();
      let connect = state.connection.is_none();
      if connect {
        state.generation += 1;
        state.connection = Some((Subject::new(), Subscription::new()));
      }
      state.ref_count += 1;
      let subject = state.connection.as_ref().map(|(subject, _)| subject.clone());
      (subject, connect, state.generation)
    };
    let Some(subject) = subject else { return };

    let state = self.state.clone();
    subscriber.add(Teardown::from_fn(move || {
      let released = {
        let mut state = state.rc_deref_mut();
        if state.generation != generation {
          return;
        }
        state.ref_count -= 1;
        if state.ref_count == 0 { state.connection.take() } else { None }
      };
      if let Some((_, connection)) = released {
        tracing::trace!("last shared subscriber left, disconnecting source");
        connection.unsubscribe();
      }
    }));
    subject.clone().actual_subscribe(subscriber);

    if connect {
      let connection = self.state.rc_deref().connection.as_ref().map(|(_, c)| c.clone());
      let Some(connection) = connection else { return };
      tracing::trace!("first shared subscriber, connecting source");
      let observer = ShareObserver { subject, state: self.state.clone(), generation };
      self.source.actual_subscribe(Subscriber::with_subscription(observer, connection));
    }
  }
}

pub struct ShareObserver<Item, Err> {
  subject: Subject<Item, Err>,
  state: MutRc<ShareState<Item, Err>>,
  generation: usize,
}

impl<Item, Err> ShareObserver<Item, Err> {
  fn reset(&self) {
    let mut state = self.state.rc_deref_mut();
    if state.generation == self.generation {
      state.generation += 1;
      state.connection = None;
      state.ref_count = 0;
    }
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for ShareObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.subject.next(value) }

  fn error(&mut self, err: Err) {
    self.reset();
    self.subject.error(err);
  }

  fn complete(&mut self) {
    self.reset();
    self.subject.complete();
  }

  fn is_closed(&self) -> bool { self.subject.is_closed() }
}
