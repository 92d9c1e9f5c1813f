//! Observer trait and the closure adapters used by `subscribe*`.
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::fmt::Debug;

use crate::hooks::report_unhandled_error;

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. Implementations do not need to guard against calls after a
/// terminal notification: the [`Subscriber`](crate::subscriber::Subscriber)
/// wrapping every observer enforces that grammar.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable. No further calls follow.
  fn error(&mut self, err: Err);

  /// Handle completion of the observable. No further calls follow.
  fn complete(&mut self);

  /// Returns `true` if the observer will not accept more values.
  ///
  /// Sources such as `from_iter` poll this to stop producing early.
  fn is_closed(&self) -> bool { false }
}

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Boxed observer, the storage type of every subscriber.
pub type BoxedObserver<Item, Err> = Box<dyn Observer<Item, Err>>;

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from a `next` closure only.
///
/// Errors are reported to the unhandled-error hook (see [`crate::hooks`]).
#[derive(Clone)]
pub struct ObserverNext<N>(pub N);

impl<Item, Err, N> Observer<Item, Err> for ObserverNext<N>
where
  N: FnMut(Item),
  Err: Debug,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  fn error(&mut self, err: Err) { report_unhandled_error(err) }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer with `next` and `error` closures.
#[derive(Clone)]
pub struct ObserverErr<N, E> {
  pub next: N,
  pub error: E,
}

impl<Item, Err, N, E> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnMut(Err),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) {}
}

/// Observer with `next` and `complete` closures.
///
/// Errors are reported to the unhandled-error hook.
#[derive(Clone)]
pub struct ObserverComp<N, C> {
  pub next: N,
  pub complete: C,
}

impl<Item, Err, N, C> Observer<Item, Err> for ObserverComp<N, C>
where
  N: FnMut(Item),
  C: FnMut(),
  Err: Debug,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  fn error(&mut self, err: Err) { report_unhandled_error(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

/// Observer with all three callbacks.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  pub next: N,
  pub error: E,
  pub complete: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}
