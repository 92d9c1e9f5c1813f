//! # rxstream: a push-based reactive stream engine
//!
//! Cold observables, composable operators, multicast subjects and
//! schedulers with a virtual clock for deterministic tests. Everything runs
//! on one thread: shared state lives in `Rc<RefCell<_>>` cells and
//! "concurrency" is the interleaving of scheduled callbacks.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxstream::prelude::*;
//!
//! let mut evens = vec![];
//! observable::from_iter::<_, ()>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(move |v| evens.push(v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy push sequence; operators live on [`ObservableExt`] |
//! | [`Observer`] | Consumes `next`, `error` and `complete` |
//! | [`Subscriber`] | The sink handed to producers, guards the notification grammar |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subject`] | Hot multicast observable and observer at once |
//! | [`Scheduler`] | Decides when delayed and periodic work runs |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `LocalPoolScheduler` built on a
//!   `futures` local pool.
//! - **`tokio-scheduler`**: `TokioLocalScheduler` for tokio `LocalSet`s.
//!
//! The library logs through `tracing` and installs no subscriber.
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: ops::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod hooks;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod testing;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __readme_doctests {
  #![doc = include_str!("../README.md")]
}
