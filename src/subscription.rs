use std::fmt::{Debug, Formatter};

use smallvec::SmallVec;

use crate::rc::MutRc;

/// Anything that can be cancelled.
///
/// `unsubscribe` must be idempotent: calling it N times has the same effect
/// as calling it once.
pub trait SubscriptionLike {
  /// This allows deregistering a stream before it has finished receiving all
  /// events (i.e. before `complete` is called).
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;
}

// ============================================================================
// Teardown
// ============================================================================

/// A cleanup action run when a subscription ends, by cancellation, error or
/// completion.
///
/// A `Teardown` is consumed when it runs, so it can never run twice.
pub struct Teardown(TeardownKind);

enum TeardownKind {
  Noop,
  Fn(Box<dyn FnOnce()>),
  Subscription(Box<dyn SubscriptionLike>),
}

impl Teardown {
  /// A teardown with nothing to release.
  pub fn none() -> Self { Teardown(TeardownKind::Noop) }

  pub fn from_fn(f: impl FnOnce() + 'static) -> Self { Teardown(TeardownKind::Fn(Box::new(f))) }

  pub fn from_subscription(subscription: impl SubscriptionLike + 'static) -> Self {
    Teardown(TeardownKind::Subscription(Box::new(subscription)))
  }

  /// `true` when running this teardown would have no effect.
  fn is_closed(&self) -> bool {
    match &self.0 {
      TeardownKind::Noop => true,
      TeardownKind::Fn(_) => false,
      TeardownKind::Subscription(s) => s.is_closed(),
    }
  }

  pub(crate) fn run(self) {
    match self.0 {
      TeardownKind::Noop => {}
      TeardownKind::Fn(f) => f(),
      TeardownKind::Subscription(s) => s.unsubscribe(),
    }
  }
}

impl Default for Teardown {
  fn default() -> Self { Teardown::none() }
}

impl From<()> for Teardown {
  fn from(_: ()) -> Self { Teardown::none() }
}

impl From<Subscription> for Teardown {
  fn from(s: Subscription) -> Self { Teardown::from_subscription(s) }
}

impl Debug for Teardown {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let kind = match &self.0 {
      TeardownKind::Noop => "noop",
      TeardownKind::Fn(_) => "fn",
      TeardownKind::Subscription(_) => "subscription",
    };
    f.debug_tuple("Teardown").field(&kind).finish()
  }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle to a live binding between an observable and an observer.
///
/// Clones share the same state. A subscription aggregates child teardowns;
/// unsubscribing runs every one of them exactly once, in registration order.
#[derive(Clone, Default)]
pub struct Subscription(MutRc<Inner>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[Teardown; 1]>,
}

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A subscription that is already closed.
  pub fn closed() -> Self {
    let s = Self::default();
    s.unsubscribe();
    s
  }

  /// Register `teardown` to run on unsubscribe. If this subscription is
  /// already closed the teardown runs immediately.
  pub fn add(&self, teardown: impl Into<Teardown>) {
    let teardown = teardown.into();
    let rejected = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        Some(teardown)
      } else {
        inner.teardown.retain(|t| !t.is_closed());
        inner.teardown.push(teardown);
        None
      }
    };
    if let Some(teardown) = rejected {
      teardown.run();
    }
  }

  /// Create a subscription that is torn down together with this one.
  pub fn child(&self) -> Subscription {
    let child = Subscription::default();
    self.add(child.clone());
    child
  }

  pub fn teardown_size(&self) -> usize { self.0.rc_deref().teardown.len() }

  pub fn ptr_eq(&self, other: &Subscription) -> bool { self.0.ptr_eq(&other.0) }
}

impl SubscriptionLike for Subscription {
  fn unsubscribe(&self) {
    let teardown = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    tracing::trace!(teardowns = teardown.len(), "subscription closed");
    for t in teardown {
      t.run();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_closed", &self.is_closed())
      .field("teardown_size", &self.teardown_size())
      .finish()
  }
}

impl<T: SubscriptionLike + ?Sized> SubscriptionLike for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

// ============================================================================
// Wrapper & guard
// ============================================================================

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
#[derive(Clone, Debug)]
pub struct SubscriptionWrapper(pub(crate) Subscription);

impl SubscriptionWrapper {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self.0) }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> Subscription { self.0 }
}

impl SubscriptionLike for SubscriptionWrapper {
  #[inline]
  fn unsubscribe(&self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl From<SubscriptionWrapper> for Teardown {
  fn from(s: SubscriptionWrapper) -> Self { Teardown::from_subscription(s.0) }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(pub(crate) Subscription);

impl SubscriptionGuard {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(subscription) }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}
