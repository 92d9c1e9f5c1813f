use crate::{observable::Observable, observer::Observer, rc::MutRc, subscriber::Subscriber};

#[derive(Clone)]
pub struct CombineLatestOp<S1, S2> {
  pub source1: S1,
  pub source2: S2,
}

pub struct PairState<A, B> {
  a: Option<A>,
  b: Option<B>,
  completed: usize,
}

impl<S1, S2> Observable for CombineLatestOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Err = S1::Err>,
  S1::Item: Clone,
  S2::Item: Clone,
{
  type Item = (S1::Item, S2::Item);
  type Err = S1::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Self::Item, S1::Err>) {
    let state = MutRc::own(PairState { a: None, b: None, completed: 0 });

    let left = CombineLatestObserver { observer: subscriber.clone(), state: state.clone(), side: Left };
    let child = subscriber.subscription().child();
    self.source1.actual_subscribe(Subscriber::with_subscription(left, child));

    let right = CombineLatestObserver { observer: subscriber.clone(), state, side: Right };
    let child = subscriber.subscription().child();
    self.source2.actual_subscribe(Subscriber::with_subscription(right, child));
  }
}

#[derive(Clone, Copy)]
pub struct Left;
#[derive(Clone, Copy)]
pub struct Right;

pub struct CombineLatestObserver<O, State, Side> {
  observer: O,
  state: MutRc<State>,
  side: Side,
}

/// Which slot of the shared pair a side writes to.
pub trait PairSide<A, B> {
  type Item;
  fn store(&self, state: &mut PairState<A, B>, value: Self::Item);
  fn has_value(&self, state: &PairState<A, B>) -> bool;
}

impl<A, B> PairSide<A, B> for Left {
  type Item = A;
  fn store(&self, state: &mut PairState<A, B>, value: A) { state.a = Some(value) }
  fn has_value(&self, state: &PairState<A, B>) -> bool { state.a.is_some() }
}

impl<A, B> PairSide<A, B> for Right {
  type Item = B;
  fn store(&self, state: &mut PairState<A, B>, value: B) { state.b = Some(value) }
  fn has_value(&self, state: &PairState<A, B>) -> bool { state.b.is_some() }
}

impl<A, B, Err, Side> Observer<Side::Item, Err>
  for CombineLatestObserver<Subscriber<(A, B), Err>, PairState<A, B>, Side>
where
  A: Clone,
  B: Clone,
  Side: PairSide<A, B>,
{
  fn next(&mut self, value: Side::Item) {
    let pair = {
      let mut state = self.state.rc_deref_mut();
      self.side.store(&mut state, value);
      match (&state.a, &state.b) {
        (Some(a), Some(b)) => Some((a.clone(), b.clone())),
        _ => None,
      }
    };
    if let Some(pair) = pair {
      self.observer.next(pair);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let done = {
      let mut state = self.state.rc_deref_mut();
      state.completed += 1;
      state.completed == 2 || !self.side.has_value(&state)
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Combines any number of sources of the same type, emitting a `Vec` of their
/// latest values.
///
/// Nothing is emitted until every source has emitted once. Completes when
/// all sources completed, or as soon as one completes without ever having
/// emitted. With no sources it completes immediately.
pub fn combine_latest_all<S, I>(sources: I) -> CombineLatestAllOp<S>
where
  I: IntoIterator<Item = S>,
  S: Observable,
  S::Item: Clone,
{
  CombineLatestAllOp { sources: sources.into_iter().collect() }
}

#[derive(Clone)]
pub struct CombineLatestAllOp<S> {
  pub sources: Vec<S>,
}

pub struct VecState<Item> {
  values: Vec<Option<Item>>,
  missing: usize,
  completed: usize,
}

impl<S> Observable for CombineLatestAllOp<S>
where
  S: Observable,
  S::Item: Clone,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn actual_subscribe(self, subscriber: Subscriber<Vec<S::Item>, S::Err>) {
    let len = self.sources.len();
    if len == 0 {
      subscriber.complete();
      return;
    }
    let state = MutRc::own(VecState { values: (0..len).map(|_| None).collect(), missing: len, completed: 0 });
    for (index, source) in self.sources.into_iter().enumerate() {
      if subscriber.is_closed() {
        break;
      }
      let observer = CombineLatestAllObserver { observer: subscriber.clone(), state: state.clone(), index };
      let child = subscriber.subscription().child();
      source.actual_subscribe(Subscriber::with_subscription(observer, child));
    }
  }
}

pub struct CombineLatestAllObserver<O, State> {
  observer: O,
  state: MutRc<State>,
  index: usize,
}

impl<Item, Err> Observer<Item, Err> for CombineLatestAllObserver<Subscriber<Vec<Item>, Err>, VecState<Item>>
where
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    let combined = {
      let mut state = self.state.rc_deref_mut();
      if state.values[self.index].replace(value).is_none() {
        state.missing -= 1;
      }
      if state.missing == 0 { state.values.iter().cloned().collect::<Option<Vec<_>>>() } else { None }
    };
    if let Some(combined) = combined {
      self.observer.next(combined);
    }
  }

  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    let done = {
      let mut state = self.state.rc_deref_mut();
      state.completed += 1;
      state.completed == state.values.len() || state.values[self.index].is_none()
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
