//! Retry operator
//!
//! Resubscribes to the source when it errors, as decided by a
//! [`RetryPolicy`]. Every attempt is a fresh subscription of a clone of the
//! source; the previous attempt is unsubscribed first. Values emitted by
//! failed attempts have already been forwarded and are not taken back.
//!
//! Simple retry with count, `retry(2)` allows three attempts in total:
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//!
//! use rxstream::prelude::*;
//!
//! let attempts = Rc::new(Cell::new(0));
//! let c_attempts = attempts.clone();
//! observable::create(move |s: Subscriber<i32, &'static str>| {
//!   c_attempts.set(c_attempts.get() + 1);
//!   s.error("unavailable");
//! })
//! .retry(2)
//! .subscribe_err(|_| {}, |_| {});
//! assert_eq!(attempts.get(), 3);
//! ```
//!
//! Delayed retry with a [`RetryConfig`]:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxstream::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! observable::throw_err::<(), _>("always fails")
//!   .retry_with(RetryConfig::new().count(3).delay(Duration::from_millis(100)), scheduler.clone())
//!   .subscribe_err(|_| {}, |e| println!("gave up: {e}"));
//! scheduler.advance_by(Duration::from_millis(300));
//! ```

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::Duration,
};

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
};

/// Policy for determining whether to retry an error.
///
/// `usize` retries that many times without delay. [`RetryConfig`] adds a
/// delay and counter reset. Implement it for custom logic, e.g. retrying
/// only server-side failures:
///
/// ```rust
/// use std::time::Duration;
///
/// use rxstream::prelude::*;
///
/// #[derive(Clone)]
/// struct ServerErrors;
///
/// impl RetryPolicy<u16> for ServerErrors {
///   fn should_retry(&self, status: &u16, attempt: usize) -> Option<Duration> {
///     match status {
///       500..=599 if attempt < 3 => Some(Duration::from_millis(500)),
///       _ => None,
///     }
///   }
/// }
/// ```
pub trait RetryPolicy<Err>: Clone {
  /// `Some(delay)` to retry after `delay`, `None` to propagate `err`.
  ///
  /// `attempt` counts the retries already made: 0 for the first error.
  fn should_retry(&self, err: &Err, attempt: usize) -> Option<Duration>;

  /// Whether a value emitted by the source resets the retry counter.
  fn reset_on_success(&self) -> bool { false }
}

impl<Err> RetryPolicy<Err> for usize {
  fn should_retry(&self, _err: &Err, attempt: usize) -> Option<Duration> {
    if attempt < *self { Some(Duration::ZERO) } else { None }
  }
}

/// Builder for a count, delay and reset policy.
///
/// ```rust
/// use std::time::Duration;
///
/// use rxstream::prelude::*;
///
/// let config = RetryConfig::new().count(5).delay(Duration::from_secs(1)).reset_on_success();
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  delay: Option<Duration>,
  reset_on_success: bool,
}

impl RetryConfig {
  /// No limit, no delay, no reset.
  pub fn new() -> Self { Self::default() }

  /// At most `count` retries, i.e. `count + 1` attempts in total.
  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Reset the retry counter whenever the source emits a value.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }
}

impl<Err> RetryPolicy<Err> for RetryConfig {
  fn should_retry(&self, _err: &Err, attempt: usize) -> Option<Duration> {
    match self.count {
      Some(count) if attempt >= count => None,
      _ => Some(self.delay.unwrap_or(Duration::ZERO)),
    }
  }

  fn reset_on_success(&self) -> bool { self.reset_on_success }
}

/// Where a delayed retry waits.
///
/// `()` resubscribes immediately, whatever the delay. Any [`Scheduler`]
/// waits on its clock; a zero delay still resubscribes synchronously.
pub trait RetryTimer: Clone + 'static {
  /// Run `task` after `delay`, returning the handle of a pending timer.
  fn defer(&self, delay: Duration, task: impl FnOnce() + 'static) -> Option<TaskHandle>;
}

impl RetryTimer for () {
  fn defer(&self, _delay: Duration, task: impl FnOnce() + 'static) -> Option<TaskHandle> {
    task();
    None
  }
}

impl<T: Scheduler> RetryTimer for T {
  fn defer(&self, delay: Duration, task: impl FnOnce() + 'static) -> Option<TaskHandle> {
    if delay.is_zero() {
      task();
      None
    } else {
      Some(self.schedule_once(delay, task))
    }
  }
}

#[derive(Clone)]
pub struct RetryOp<S, P, Sch> {
  pub source: S,
  pub policy: P,
  pub scheduler: Sch,
}

#[doc(hidden)]
pub struct RetryShared<S, P, Sch, O> {
  source: S,
  policy: P,
  scheduler: Sch,
  observer: O,
  attempts: Cell<usize>,
  current: RefCell<Option<Subscription>>,
  /// Set while an attempt is being subscribed; a synchronous failure then
  /// only flags `resubscribe` and the outer loop starts the next attempt.
  subscribing: Cell<bool>,
  resubscribe: Cell<bool>,
}

impl<S, P, Sch> Observable for RetryOp<S, P, Sch>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
  Sch: RetryTimer,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let shared = Rc::new(RetryShared {
      source: self.source,
      policy: self.policy,
      scheduler: self.scheduler,
      observer: subscriber,
      attempts: Cell::new(0),
      current: RefCell::new(None),
      subscribing: Cell::new(false),
      resubscribe: Cell::new(false),
    });
    shared.subscribe_attempt();
  }
}

impl<S, P, Sch> RetryShared<S, P, Sch, Subscriber<S::Item, S::Err>>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
  Sch: RetryTimer,
{
  fn subscribe_attempt(self: &Rc<Self>) {
    if self.subscribing.replace(true) {
      self.resubscribe.set(true);
      return;
    }
    loop {
      self.resubscribe.set(false);
      if self.observer.is_closed() {
        break;
      }
      let child = self.observer.subscription().child();
      let previous = self.current.borrow_mut().replace(child.clone());
      if let Some(previous) = previous {
        previous.unsubscribe();
      }
      let observer = RetryObserver(self.clone());
      self.source.clone().actual_subscribe(Subscriber::with_subscription(observer, child));
      if !self.resubscribe.get() {
        break;
      }
    }
    self.subscribing.set(false);
  }
}

#[doc(hidden)]
pub struct RetryObserver<Shared>(Rc<Shared>);

impl<S, P, Sch> Observer<S::Item, S::Err> for RetryObserver<RetryShared<S, P, Sch, Subscriber<S::Item, S::Err>>>
where
  S: Observable + Clone + 'static,
  P: RetryPolicy<S::Err> + 'static,
  Sch: RetryTimer,
{
  fn next(&mut self, value: S::Item) {
    let shared = &self.0;
    if shared.attempts.get() > 0 && shared.policy.reset_on_success() {
      shared.attempts.set(0);
    }
    shared.observer.next(value);
  }

  fn error(&mut self, err: S::Err) {
    let shared = &self.0;
    let attempt = shared.attempts.get();
    let Some(delay) = shared.policy.should_retry(&err, attempt) else {
      shared.observer.error(err);
      return;
    };
    shared.attempts.set(attempt + 1);
    tracing::debug!(attempt = attempt + 1, ?delay, "retrying after error");

    let c_shared = shared.clone();
    if let Some(handle) = shared.scheduler.defer(delay, move || c_shared.subscribe_attempt()) {
      shared.observer.add(handle);
    }
  }

  fn complete(&mut self) { self.0.observer.complete() }

  fn is_closed(&self) -> bool { self.0.observer.is_closed() }
}
