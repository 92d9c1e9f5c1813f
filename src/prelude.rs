//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Errors
pub use crate::error::{MarbleError, RxError, SubjectError, TimeoutError};
// Boxed types and the observable module for creation functions
pub use crate::observable::{self, BoxedObservable, BoxedObservableClone, Observable};
// Observer trait and closure adapters
pub use crate::observer::{Observer, ObserverAll, ObserverComp, ObserverErr, ObserverNext};
// Operators
pub use crate::ops::{
  boxed_operator,
  retry::{RetryConfig, RetryPolicy},
  throttle_time::ThrottleEdge,
  BoxedOperator, ObservableExt,
};
// Default schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::LocalPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
// Scheduler core types
pub use crate::scheduler::{Scheduler, TaskHandle, VirtualTimeScheduler};
// Subject
pub use crate::subject::*;
// Subscription
pub use crate::subscription::*;
pub use crate::{hooks::*, notification::Notification, subscriber::Subscriber};
