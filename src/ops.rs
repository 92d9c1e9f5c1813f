//! Operators and the subscribe entry points.
//!
//! Every method of [`ObservableExt`] is an operator: it wraps its source in
//! a new observable that, once subscribed, subscribes to the source and
//! forwards a transformed notification stream. Unsubscribing the derived
//! observable unsubscribes the source.
//!
//! Operators compose left to right, either by method chaining or through
//! [`ObservableExt::pipe`] and the [`pipe!`](crate::pipe) macro, which accept
//! any `FnOnce(Observable) -> Observable`, so custom operators are plain
//! functions:
//!
//! ```rust
//! use rxstream::prelude::*;
//!
//! fn doubled_evens<S>(source: S) -> impl Observable<Item = i32, Err = S::Err>
//! where
//!   S: Observable<Item = i32>,
//! {
//!   source.filter(|v| v % 2 == 0).map(|v| v * 2)
//! }
//!
//! let mut out = vec![];
//! rxstream::pipe!(observable::from_iter::<_, ()>(0..6), doubled_evens, |s| s.take(2))
//!   .subscribe(move |v| out.push(v));
//! ```

use std::{fmt::Debug, time::Duration};

use crate::{
  error::TimeoutError,
  observable::{BoxedObservable, BoxedObservableClone, Observable},
  observer::{Observer, ObserverAll, ObserverComp, ObserverErr, ObserverNext},
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::SubscriptionWrapper,
};

pub mod audit_time;
pub mod catch_error;
pub mod combine_latest;
pub mod debounce_time;
pub mod delay;
pub mod distinct_until_changed;
pub mod exhaust_map;
pub mod filter;
pub mod finalize;
pub mod map;
pub mod map_err;
pub mod merge;
pub mod merge_map;
pub mod retry;
pub mod scan;
pub mod share;
pub mod skip;
pub mod start_with;
pub mod switch_map;
pub mod take;
pub mod take_until;
pub mod take_while;
pub mod tap;
pub mod throttle_time;
pub mod timeout;
pub mod zip;

use self::{
  audit_time::AuditTimeOp,
  catch_error::CatchErrorOp,
  combine_latest::CombineLatestOp,
  debounce_time::DebounceTimeOp,
  delay::DelayOp,
  distinct_until_changed::{DistinctUntilChangedByOp, DistinctUntilChangedOp},
  exhaust_map::ExhaustMapOp,
  filter::FilterOp,
  finalize::FinalizeOp,
  map::{MapOp, PluckOp, TryMapOp},
  map_err::MapErrOp,
  merge::MergeOp,
  merge_map::MergeMapOp,
  retry::{RetryOp, RetryPolicy},
  scan::ScanOp,
  share::ShareOp,
  skip::SkipOp,
  start_with::StartWithOp,
  switch_map::SwitchMapOp,
  take::TakeOp,
  take_until::TakeUntilOp,
  take_while::TakeWhileOp,
  tap::TapOp,
  throttle_time::{ThrottleEdge, ThrottleTimeOp},
  timeout::TimeoutOp,
  zip::ZipOp,
};

/// A runtime operator for [`ObservableExt::pipe_all`].
pub type BoxedOperator<Item, Err> =
  Box<dyn FnOnce(BoxedObservable<Item, Err>) -> BoxedObservable<Item, Err>>;

/// Box an operator closure so it can be stored in a runtime list.
///
/// ```rust
/// use rxstream::{ops::boxed_operator, prelude::*};
///
/// let ops = vec![
///   boxed_operator(|s: BoxedObservable<i32, ()>| s.map(|v| v + 1)),
///   boxed_operator(|s: BoxedObservable<i32, ()>| s.filter(|v| v % 2 == 0)),
/// ];
/// observable::from_iter(0..10).pipe_all(ops).subscribe(|v| println!("{v}"));
/// ```
pub fn boxed_operator<Item, Err, F, O>(f: F) -> BoxedOperator<Item, Err>
where
  Item: 'static,
  Err: 'static,
  F: FnOnce(BoxedObservable<Item, Err>) -> O + 'static,
  O: Observable<Item = Item, Err = Err> + 'static,
{
  Box::new(move |source| f(source).box_it())
}

/// Applies operators left to right: `pipe!(source, a, b)` is
/// `source.pipe(a).pipe(b)`.
#[macro_export]
macro_rules! pipe {
  ($source:expr $(, $op:expr)* $(,)?) => {{
    let source = $source;
    $(let source = $crate::ops::ObservableExt::pipe(source, $op);)*
    source
  }};
}

/// Operators and subscribe methods, available on every [`Observable`].
pub trait ObservableExt: Observable {
  /// Subscribe with a full [`Observer`] implementation.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper
  where
    O: Observer<Self::Item, Self::Err> + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = subscriber.subscription().clone();
    tracing::trace!("subscribe");
    self.actual_subscribe(subscriber);
    SubscriptionWrapper(subscription)
  }

  /// Subscribe with a `next` callback only. An error reaching this observer
  /// is reported through [`crate::hooks`] (a panic by default).
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper
  where
    N: FnMut(Self::Item) + 'static,
    Self::Err: Debug,
  {
    self.subscribe_with(ObserverNext(next))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper
  where
    N: FnMut(Self::Item) + 'static,
    E: FnMut(Self::Err) + 'static,
  {
    self.subscribe_with(ObserverErr { next, error })
  }

  fn subscribe_complete<N, C>(self, next: N, complete: C) -> SubscriptionWrapper
  where
    N: FnMut(Self::Item) + 'static,
    C: FnMut() + 'static,
    Self::Err: Debug,
  {
    self.subscribe_with(ObserverComp { next, complete })
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> SubscriptionWrapper
  where
    N: FnMut(Self::Item) + 'static,
    E: FnMut(Self::Err) + 'static,
    C: FnMut() + 'static,
  {
    self.subscribe_with(ObserverAll { next, error, complete })
  }

  /// Apply an operator: any function from this observable to another one.
  #[inline]
  fn pipe<F, O>(self, f: F) -> O
  where
    F: FnOnce(Self) -> O,
  {
    f(self)
  }

  /// Apply a runtime list of operators, in order.
  fn pipe_all<I>(self, ops: I) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: 'static,
    I: IntoIterator<Item = BoxedOperator<Self::Item, Self::Err>>,
  {
    ops.into_iter().fold(self.box_it(), |source, op| op(source))
  }

  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: 'static,
  {
    BoxedObservable::new(self)
  }

  fn box_clone(self) -> BoxedObservableClone<Self::Item, Self::Err>
  where
    Self: Clone + 'static,
  {
    BoxedObservableClone::new(self)
  }

  // ---------------------------------------------------------------------------
  // Transformation
  // ---------------------------------------------------------------------------

  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Like [`map`](ObservableExt::map) but `f` may fail; an `Err` ends the
  /// stream with that error.
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err>,
  {
    TryMapOp { source: self, func: f }
  }

  /// Emits a clone of the field `f` selects from each value.
  fn pluck<B, F>(self, f: F) -> PluckOp<Self, F>
  where
    F: for<'a> FnMut(&'a Self::Item) -> &'a B,
    B: Clone,
  {
    PluckOp { source: self, func: f }
  }

  fn map_err<E2, F>(self, f: F) -> MapErrOp<Self, F>
  where
    F: FnMut(Self::Err) -> E2,
  {
    MapErrOp { source: self, func: f }
  }

  /// Emits each intermediate accumulation of `f`, starting from `seed`.
  fn scan<Acc, F>(self, seed: Acc, f: F) -> ScanOp<Self, F, Acc>
  where
    F: FnMut(Acc, Self::Item) -> Acc,
    Acc: Clone,
  {
    ScanOp { source: self, func: f, seed }
  }

  /// Calls `f` with a reference to each value before forwarding it.
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Self::Item),
  {
    TapOp { source: self, func: f }
  }

  // ---------------------------------------------------------------------------
  // Filtering
  // ---------------------------------------------------------------------------

  /// Emit only those items from an Observable that pass a predicate test.
  fn filter<F>(self, f: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, filter: f }
  }

  /// Emits only the first `count` values, then unsubscribes the source and
  /// completes. `take(0)` completes without subscribing.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Ignores the first `count` values.
  fn skip(self, count: usize) -> SkipOp<Self> { SkipOp { source: self, count } }

  /// Drops values equal to the last forwarded one.
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self>
  where
    Self::Item: PartialEq + Clone,
  {
    DistinctUntilChangedOp { source: self }
  }

  /// Drops values for which `eq(last_forwarded, value)` holds.
  fn distinct_until_changed_by<F>(self, eq: F) -> DistinctUntilChangedByOp<Self, F>
  where
    F: FnMut(&Self::Item, &Self::Item) -> bool,
    Self::Item: Clone,
  {
    DistinctUntilChangedByOp { source: self, eq }
  }

  /// Forwards values while `f` holds, completes on the first one that fails.
  fn take_while<F>(self, f: F) -> TakeWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    TakeWhileOp { source: self, predicate: f }
  }

  /// Forwards values until `notifier` emits, then completes.
  fn take_until<N>(self, notifier: N) -> TakeUntilOp<Self, N>
  where
    N: Observable<Err = Self::Err>,
  {
    TakeUntilOp { source: self, notifier }
  }

  // ---------------------------------------------------------------------------
  // Combination
  // ---------------------------------------------------------------------------

  /// Interleaves values of both sources as they arrive. Completes once both
  /// complete, errors as soon as either errors.
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    MergeOp { source1: self, source2: other }
  }

  /// Emits `(a, b)` with the latest value of each source, once both have
  /// emitted, and again on every later emission of either.
  fn combine_latest<S>(self, other: S) -> CombineLatestOp<Self, S>
  where
    S: Observable<Err = Self::Err>,
    Self::Item: Clone,
    S::Item: Clone,
  {
    CombineLatestOp { source1: self, source2: other }
  }

  /// Pairs values of both sources by arrival index.
  fn zip<S>(self, other: S) -> ZipOp<Self, S>
  where
    S: Observable<Err = Self::Err>,
  {
    ZipOp { source1: self, source2: other }
  }

  // ---------------------------------------------------------------------------
  // Higher-order flattening
  // ---------------------------------------------------------------------------

  /// Maps each value to an inner observable and mirrors only the latest one,
  /// unsubscribing the previous inner first.
  fn switch_map<R, F>(self, f: F) -> SwitchMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> R,
    R: Observable<Err = Self::Err>,
  {
    SwitchMapOp { source: self, func: f }
  }

  /// Maps each value to an inner observable and merges all of them.
  fn merge_map<R, F>(self, f: F) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> R,
    R: Observable<Err = Self::Err>,
  {
    self.merge_map_with_concurrency(f, usize::MAX)
  }

  /// Like [`merge_map`](ObservableExt::merge_map) with at most `limit` inner
  /// observables active; outer values wait in a queue beyond that. A `limit`
  /// of zero is treated as one.
  fn merge_map_with_concurrency<R, F>(self, f: F, limit: usize) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> R,
    R: Observable<Err = Self::Err>,
  {
    MergeMapOp { source: self, func: f, concurrent: limit.max(1) }
  }

  /// Subscribes to each inner observable only after the previous one
  /// completed, preserving order.
  fn concat_map<R, F>(self, f: F) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> R,
    R: Observable<Err = Self::Err>,
  {
    self.merge_map_with_concurrency(f, 1)
  }

  /// Ignores outer values while an inner observable is active.
  fn exhaust_map<R, F>(self, f: F) -> ExhaustMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> R,
    R: Observable<Err = Self::Err>,
  {
    ExhaustMapOp { source: self, func: f }
  }

  // ---------------------------------------------------------------------------
  // Error recovery
  // ---------------------------------------------------------------------------

  /// On error, continues with the observable `f` builds from the error.
  fn catch_error<R, F>(self, f: F) -> CatchErrorOp<Self, F>
  where
    F: FnOnce(Self::Err) -> R,
    R: Observable<Item = Self::Item>,
  {
    CatchErrorOp { source: self, func: f }
  }

  /// Re-subscribes to the source up to `count` more times on error.
  fn retry(self, count: usize) -> RetryOp<Self, usize, ()>
  where
    Self: Clone,
  {
    RetryOp { source: self, policy: count, scheduler: () }
  }

  /// Re-subscribes according to `policy`, waiting on `scheduler` between
  /// attempts.
  fn retry_with<P, Sch>(self, policy: P, scheduler: Sch) -> RetryOp<Self, P, Sch>
  where
    Self: Clone,
    P: RetryPolicy<Self::Err>,
    Sch: Scheduler,
  {
    RetryOp { source: self, policy, scheduler }
  }

  /// Errors with [`TimeoutError`] when no value arrives within `dur` of
  /// subscribing or of the previous value.
  fn timeout<Sch>(self, dur: Duration, scheduler: Sch) -> TimeoutOp<Self, Sch>
  where
    Sch: Scheduler,
    Self::Err: From<TimeoutError>,
  {
    TimeoutOp { source: self, dur, scheduler }
  }

  // ---------------------------------------------------------------------------
  // Rate limiting
  // ---------------------------------------------------------------------------

  /// Emits a value only once `dur` passed without another emission.
  fn debounce_time<Sch: Scheduler>(self, dur: Duration, scheduler: Sch) -> DebounceTimeOp<Self, Sch> {
    DebounceTimeOp { source: self, dur, scheduler }
  }

  /// Emits at most one value per `dur` window, see [`ThrottleEdge`].
  fn throttle_time<Sch: Scheduler>(
    self, dur: Duration, scheduler: Sch, edge: ThrottleEdge,
  ) -> ThrottleTimeOp<Self, Sch> {
    ThrottleTimeOp { source: self, dur, scheduler, edge }
  }

  /// Emits the latest value at the end of a `dur` window opened by the first
  /// value that arrives while no window is open.
  fn audit_time<Sch: Scheduler>(self, dur: Duration, scheduler: Sch) -> AuditTimeOp<Self, Sch> {
    AuditTimeOp { source: self, dur, scheduler }
  }

  // ---------------------------------------------------------------------------
  // Utilities
  // ---------------------------------------------------------------------------

  /// Shifts every value and the completion by `dur`.
  fn delay<Sch: Scheduler>(self, dur: Duration, scheduler: Sch) -> DelayOp<Self, Sch> {
    DelayOp { source: self, dur, scheduler }
  }

  /// Runs `f` once when the subscription ends for any reason.
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce() + 'static,
  {
    FinalizeOp { source: self, func: f }
  }

  /// Emits `values` before the values of the source.
  fn start_with(self, values: Vec<Self::Item>) -> StartWithOp<Self> {
    StartWithOp { source: self, values }
  }

  /// Shares one subscription of the source among all subscribers through a
  /// [`Subject`](crate::subject::Subject).
  fn share(self) -> ShareOp<Self>
  where
    Self::Item: Clone,
    Self::Err: Clone,
  {
    ShareOp::new(self)
  }
}

impl<T: Observable> ObservableExt for T {}
