//! The producer side of the engine.
//!
//! An [`Observable`] is a lazy description of a push-based sequence. Nothing
//! happens until it is subscribed; every subscription runs the producer
//! again (cold), so an observable that needs to be subscribed more than once
//! is cloned first.
//!
//! The functions in this module create observables from scratch. Operators
//! live on [`ObservableExt`](crate::ops::ObservableExt).

use crate::subscriber::Subscriber;

mod boxed;
pub use boxed::*;
mod create;
pub use create::*;
mod defer;
pub use defer::*;
mod of;
pub use of::*;
mod timer;
pub use timer::*;

pub use crate::ops::combine_latest::combine_latest_all;
pub use crate::ops::merge::merge_all;

/// A lazily evaluated, cancellable push sequence.
///
/// `actual_subscribe` starts producing into `subscriber`. Implementations
/// register whatever they need to release on `subscriber`'s subscription and
/// must stop emitting once `subscriber.is_closed()` is `true`.
pub trait Observable: Sized {
  type Item: 'static;
  type Err: 'static;

  fn actual_subscribe(self, subscriber: Subscriber<Self::Item, Self::Err>);
}
