//! Runtime configuration for errors nobody handled.
//!
//! An observer subscribed through [`subscribe`](crate::ops::ObservableExt::subscribe)
//! has no error callback. Errors reaching such an observer are never dropped:
//! they are logged and handed to the unhandled-error hook. Without a hook the
//! error is rethrown as a panic on the thread that delivered it.
//!
//! Hooks are thread-local, matching the single-threaded execution model.

use std::{cell::RefCell, fmt::Debug, rc::Rc};

type Hook = Rc<dyn Fn(&str)>;

thread_local! {
  static UNHANDLED_ERROR_HOOK: RefCell<Option<Hook>> = const { RefCell::new(None) };
}

/// Install `hook` for errors reaching an observer without an error handler.
/// The hook receives the `Debug` rendering of the error.
pub fn set_unhandled_error_hook(hook: impl Fn(&str) + 'static) {
  UNHANDLED_ERROR_HOOK.with(|h| *h.borrow_mut() = Some(Rc::new(hook)));
}

/// Restore the default behavior (panic).
pub fn reset_unhandled_error_hook() { UNHANDLED_ERROR_HOOK.with(|h| *h.borrow_mut() = None); }

pub(crate) fn report_unhandled_error<Err: Debug>(err: Err) {
  let msg = format!("{err:?}");
  tracing::error!(error = %msg, "unhandled error in observable");
  let hook = UNHANDLED_ERROR_HOOK.with(|h| h.borrow().clone());
  match hook {
    Some(hook) => hook(&msg),
    None => panic!("unhandled error in observable: {msg}"),
  }
}
