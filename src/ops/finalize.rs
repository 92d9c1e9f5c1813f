use crate::{observable::Observable, subscriber::Subscriber, subscription::Teardown};

/// Calls `func` once the subscription ends, whether by completion, error or
/// unsubscribe. It runs after the terminal notification was delivered and
/// after the source was released.
#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  pub source: S,
  pub func: F,
}

impl<S, F> Observable for FinalizeOp<S, F>
where
  S: Observable,
  F: FnOnce() + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream = subscriber.subscription().child();
    self.source.actual_subscribe(Subscriber::with_subscription(subscriber.clone(), upstream));
    subscriber.add(Teardown::from_fn(self.func));
  }
}
