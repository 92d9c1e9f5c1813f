//! Helpers for testing stream code against virtual time.
//!
//! [`TestObserver`] records every notification together with the scheduler
//! time it arrived at. [`cold`] builds an observable from a marble diagram
//! whose frames are played back on a scheduler:
//!
//! | marble      | meaning                                              |
//! |-------------|------------------------------------------------------|
//! | `-`         | one frame passes                                     |
//! | `a`, `1`, … | emit the value registered for that character         |
//! | `\|`        | complete                                             |
//! | `#`         | error with the given error value                     |
//! | `( … )`     | everything inside happens in the same frame          |
//! | ` `         | ignored                                              |
//!
//! Every emission, and every group as a whole, also takes up one frame.
//!
//! ```rust
//! use std::{collections::HashMap, time::Duration};
//! use rxstream::{prelude::*, testing::{cold, Recorded, TestObserver}};
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let values = HashMap::from([('a', 1), ('b', 2)]);
//! let frame = Duration::from_millis(10);
//! let source = cold::<_, (), _>("-a--b|", frame, &values, None, scheduler.clone()).unwrap();
//!
//! let observer = TestObserver::new(scheduler.clone());
//! source.map(|v| v * 10).subscribe_with(observer.clone());
//! scheduler.advance_by(Duration::from_millis(100));
//!
//! assert_eq!(
//!   observer.records(),
//!   vec![
//!     Recorded::next(Duration::from_millis(10), 10),
//!     Recorded::next(Duration::from_millis(40), 20),
//!     Recorded::complete(Duration::from_millis(50)),
//!   ]
//! );
//! ```

use std::{collections::HashMap, time::Duration};

use crate::{
  error::MarbleError,
  notification::Notification,
  observable::Observable,
  observer::Observer,
  rc::MutRc,
  scheduler::{Scheduler, VirtualTimeScheduler},
  subscriber::Subscriber,
};

/// A notification stamped with the scheduler time it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<Item, Err> {
  pub time: Duration,
  pub notification: Notification<Item, Err>,
}

impl<Item, Err> Recorded<Item, Err> {
  pub fn next(time: Duration, value: Item) -> Self {
    Recorded { time, notification: Notification::Next(value) }
  }

  pub fn error(time: Duration, err: Err) -> Self {
    Recorded { time, notification: Notification::Error(err) }
  }

  pub fn complete(time: Duration) -> Self { Recorded { time, notification: Notification::Complete } }
}

/// An observer that records what it receives. Clones share one record list,
/// so keep a clone to inspect after handing one to `subscribe_with`.
pub struct TestObserver<Item, Err> {
  scheduler: VirtualTimeScheduler,
  records: MutRc<Vec<Recorded<Item, Err>>>,
}

impl<Item, Err> TestObserver<Item, Err> {
  pub fn new(scheduler: VirtualTimeScheduler) -> Self { TestObserver { scheduler, records: MutRc::own(vec![]) } }

  pub fn records(&self) -> Vec<Recorded<Item, Err>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.records.rc_deref().clone()
  }

  /// Only the values, in arrival order.
  pub fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self
      .records
      .rc_deref()
      .iter()
      .filter_map(|r| match &r.notification {
        Notification::Next(v) => Some(v.clone()),
        _ => None,
      })
      .collect()
  }

  /// Values paired with their arrival time.
  pub fn timed_values(&self) -> Vec<(Duration, Item)>
  where
    Item: Clone,
  {
    self
      .records
      .rc_deref()
      .iter()
      .filter_map(|r| match &r.notification {
        Notification::Next(v) => Some((r.time, v.clone())),
        _ => None,
      })
      .collect()
  }

  pub fn is_completed(&self) -> bool {
    self.records.rc_deref().iter().any(|r| matches!(r.notification, Notification::Complete))
  }

  pub fn error(&self) -> Option<Err>
  where
    Err: Clone,
  {
    self.records.rc_deref().iter().find_map(|r| match &r.notification {
      Notification::Error(e) => Some(e.clone()),
      _ => None,
    })
  }

  fn record(&self, notification: Notification<Item, Err>) {
    let time = self.scheduler.now();
    self.records.rc_deref_mut().push(Recorded { time, notification });
  }
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self { TestObserver { scheduler: self.scheduler.clone(), records: self.records.clone() } }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)) }

  fn error(&mut self, err: Err) { self.record(Notification::Error(err)) }

  fn complete(&mut self) { self.record(Notification::Complete) }
}

/// Parse a marble diagram into notifications timed relative to frame zero.
pub fn parse_marbles<Item, Err>(
  marbles: &str, frame: Duration, values: &HashMap<char, Item>, error: Option<Err>,
) -> Result<Vec<Recorded<Item, Err>>, MarbleError>
where
  Item: Clone,
  Err: Clone,
{
  let mut records = vec![];
  let mut frames = 0u32;
  let mut group: Option<usize> = None;
  let mut terminated = false;

  for (pos, marble) in marbles.chars().enumerate() {
    let time = frame * frames;
    let notification = match marble {
      ' ' => continue,
      '-' if group.is_none() => {
        frames += 1;
        continue;
      }
      '(' if group.is_none() => {
        group = Some(pos);
        continue;
      }
      ')' if group.is_some() => {
        group = None;
        frames += 1;
        continue;
      }
      '-' | '(' | ')' => return Err(MarbleError::Unexpected { found: marble, pos }),
      _ if terminated => return Err(MarbleError::Unexpected { found: marble, pos }),
      '|' => Notification::Complete,
      '#' => match &error {
        Some(err) => Notification::Error(err.clone()),
        None => return Err(MarbleError::MissingError { pos }),
      },
      _ => match values.get(&marble) {
        Some(v) => Notification::Next(v.clone()),
        None => return Err(MarbleError::UnknownValue { marble, pos }),
      },
    };
    terminated = notification.is_terminal();
    records.push(Recorded { time, notification });
    if group.is_none() {
      frames += 1;
    }
  }

  match group {
    Some(pos) => Err(MarbleError::UnclosedGroup { pos }),
    None => Ok(records),
  }
}

/// A cold observable that replays a marble diagram on `scheduler`, starting
/// from the moment it is subscribed. Frame-zero notifications are delivered
/// synchronously during subscribe.
pub fn cold<Item, Err, S>(
  marbles: &str, frame: Duration, values: &HashMap<char, Item>, error: Option<Err>, scheduler: S,
) -> Result<ColdObservable<Item, Err, S>, MarbleError>
where
  Item: Clone,
  Err: Clone,
{
  let records = parse_marbles(marbles, frame, values, error)?;
  Ok(ColdObservable { records, scheduler })
}

#[derive(Clone)]
pub struct ColdObservable<Item, Err, S> {
  records: Vec<Recorded<Item, Err>>,
  scheduler: S,
}

impl<Item: 'static, Err: 'static, S: Scheduler> Observable for ColdObservable<Item, Err, S> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(self, subscriber: Subscriber<Item, Err>) {
    for Recorded { time, notification } in self.records {
      if time.is_zero() {
        notification.accept(&mut subscriber.clone());
        continue;
      }
      let mut c_subscriber = subscriber.clone();
      let handle = self.scheduler.schedule_once(time, move || notification.accept(&mut c_subscriber));
      subscriber.add(handle);
    }
  }
}
