//! Zip operator
//!
//! Pairs the n-th value of one source with the n-th value of the other.
//! Values that arrive early wait in a per-side queue. The zipped stream
//! completes as soon as one side has completed and has nothing left queued,
//! since no further pair can be formed.

use std::collections::VecDeque;

use crate::{observable::Observable, observer::Observer, rc::MutRc, subscriber::Subscriber};

#[derive(Clone)]
pub struct ZipOp<S1, S2> {
  pub source1: S1,
  pub source2: S2,
}

#[doc(hidden)]
pub struct ZipState<A, B> {
  a: VecDeque<A>,
  b: VecDeque<B>,
  a_done: bool,
  b_done: bool,
}

impl<A, B> ZipState<A, B> {
  fn exhausted(&self) -> bool { (self.a_done && self.a.is_empty()) || (self.b_done && self.b.is_empty()) }
}

impl<S1, S2> Observable for ZipOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Err = S1::Err>,
{
  type Item = (S1::Item, S2::Item);
  type Err = S1::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Self::Item, S1::Err>) {
    let state =
      MutRc::own(ZipState { a: VecDeque::new(), b: VecDeque::new(), a_done: false, b_done: false });

    let a = ZipAObserver { observer: subscriber.clone(), state: state.clone() };
    let child = subscriber.subscription().child();
    self.source1.actual_subscribe(Subscriber::with_subscription(a, child));

    let b = ZipBObserver { observer: subscriber.clone(), state };
    let child = subscriber.subscription().child();
    self.source2.actual_subscribe(Subscriber::with_subscription(b, child));
  }
}

pub struct ZipAObserver<O, State> {
  observer: O,
  state: MutRc<State>,
}

pub struct ZipBObserver<O, State> {
  observer: O,
  state: MutRc<State>,
}

impl<A, B, Err> Observer<A, Err> for ZipAObserver<Subscriber<(A, B), Err>, ZipState<A, B>> {
  fn next(&mut self, value: A) {
    let (pair, exhausted) = {
      let mut state = self.state.rc_deref_mut();
      match state.b.pop_front() {
        Some(b) => (Some((value, b)), state.exhausted()),
        None => {
          state.a.push_back(value);
          (None, false)
        }
      }
    };
    if let Some(pair) = pair {
      self.observer.next(pair);
    }
    if exhausted {
      self.observer.complete();
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let exhausted = {
      let mut state = self.state.rc_deref_mut();
      state.a_done = true;
      state.exhausted()
    };
    if exhausted {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<A, B, Err> Observer<B, Err> for ZipBObserver<Subscriber<(A, B), Err>, ZipState<A, B>> {
  fn next(&mut self, value: B) {
    let (pair, exhausted) = {
      let mut state = self.state.rc_deref_mut();
      match state.a.pop_front() {
        Some(a) => (Some((a, value)), state.exhausted()),
        None => {
          state.b.push_back(value);
          (None, false)
        }
      }
    };
    if let Some(pair) = pair {
      self.observer.next(pair);
    }
    if exhausted {
      self.observer.complete();
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let exhausted = {
      let mut state = self.state.rc_deref_mut();
      state.b_done = true;
      state.exhausted()
    };
    if exhausted {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
