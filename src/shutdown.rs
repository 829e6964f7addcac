//! Handshake between the console control thread and the UI thread at exit.
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// One-shot latch set once the bootstrapper has torn everything down.
pub struct TeardownLatch {
  done: Mutex<bool>,
  changed: Condvar,
}

impl TeardownLatch {
  pub const fn new() -> Self {
    Self {
      done: Mutex::new(false),
      changed: Condvar::new(),
    }
  }

  /// Mark teardown as finished and wake every waiter.
  pub fn complete(&self) {
    let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
    *done = true;
    self.changed.notify_all();
  }

  /// Block until `complete` is called or `timeout` elapses.
  /// Returns whether teardown finished in time.
  pub fn wait(&self, timeout: Duration) -> bool {
    let done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
    let (done, _) = self
      .changed
      .wait_timeout_while(done, timeout, |done| !*done)
      .unwrap_or_else(PoisonError::into_inner);
    *done
  }
}

impl Default for TeardownLatch {
  fn default() -> Self {
    Self::new()
  }
}

/// Set by `run` after the window, the runtime and COM have been released.
pub static TEARDOWN: TeardownLatch = TeardownLatch::new();

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::thread;
  use std::time::Instant;

  #[test]
  fn test_wait_times_out_without_teardown() {
    let latch = TeardownLatch::new();
    let start = Instant::now();
    assert!(!latch.wait(Duration::from_millis(50)));
    assert!(start.elapsed() >= Duration::from_millis(50));
  }

  #[test]
  fn test_wait_returns_once_teardown_completes() {
    let latch = Arc::new(TeardownLatch::new());
    let waiter = {
      let latch = latch.clone();
      thread::spawn(move || latch.wait(Duration::from_secs(10)))
    };
    thread::sleep(Duration::from_millis(20));
    latch.complete();
    assert!(waiter.join().unwrap());
  }

  #[test]
  fn test_completed_latch_does_not_block() {
    let latch = TeardownLatch::new();
    latch.complete();
    let start = Instant::now();
    assert!(latch.wait(Duration::from_secs(10)));
    assert!(start.elapsed() < Duration::from_secs(1));
  }
}
