//! One-shot completion signalling between the build backend and the
//! waiting test thread.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A counting latch: waiters block until the count reaches zero.
///
/// The trigger counts the latch down from its completion callback; the test
/// thread blocks in [`wait`](CompletionLatch::wait). This is the only
/// concurrency primitive the harness needs: one-shot signalling, no shared
/// mutable state.
#[derive(Debug)]
pub struct CompletionLatch {
  count: Mutex<usize>,
  signal: Condvar,
}

impl CompletionLatch {
  pub fn new(count: usize) -> Self {
    Self {
      count: Mutex::new(count),
      signal: Condvar::new(),
    }
  }

  /// Decrement the count, waking all waiters when it reaches zero.
  ///
  /// Counting down past zero is a no-op.
  pub fn count_down(&self) {
    let mut count = self.count.lock().unwrap();
    if *count > 0 {
      *count -= 1;
      if *count == 0 {
        self.signal.notify_all();
      }
    }
  }

  /// Block until the count reaches zero. Unbounded.
  pub fn wait(&self) {
    let mut count = self.count.lock().unwrap();
    while *count > 0 {
      count = self.signal.wait(count).unwrap();
    }
  }

  /// Block until the count reaches zero or `timeout` elapses.
  ///
  /// Returns true when the latch was released.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let mut count = self.count.lock().unwrap();
    while *count > 0 {
      let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
        return false;
      };
      let (guard, result) = self.signal.wait_timeout(count, remaining).unwrap();
      count = guard;
      if result.timed_out() && *count > 0 {
        return false;
      }
    }
    true
  }
}
