/*!
Leading-edge + trailing-edge throttle.

Raw accessibility notifications arrive in bursts (a Space transition
fires activation, focus, move, and resize events within a few
milliseconds). The throttle collapses a burst into one immediate check
and one trailing check after the burst quiesces.

The decision core is pure and clock-free, extracted for testability:
callers pass the current instant in and own the single pending trailing
task. Storing a new trailing task replaces (cancels) the previous one,
so at most one is ever pending.
*/

use std::time::{Duration, Instant};

/// Default throttle window between accepted triggers.
pub(crate) const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(120);

/// What the caller must do with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThrottleDecision {
  /// Outside the throttle window: run the action now (leading edge).
  FireNow,
  /// Inside the throttle window: schedule the action to run once after
  /// the remaining time, replacing any pending trailing task.
  Defer(Duration),
}

/// Throttle state: the timestamp of the last leading-edge fire.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Throttle {
  interval: Duration,
  last_fire: Option<Instant>,
}

impl Throttle {
  pub(crate) const fn new(interval: Duration) -> Self {
    Self {
      interval,
      last_fire: None,
    }
  }

  /// Record a raw trigger at `now` and decide how to act on it.
  ///
  /// Only leading-edge fires advance the timestamp; a trailing
  /// execution does not, so a trigger arriving right after the window
  /// elapses fires immediately.
  pub(crate) fn trigger(&mut self, now: Instant) -> ThrottleDecision {
    if let Some(last) = self.last_fire {
      let elapsed = now.duration_since(last);
      if elapsed < self.interval {
        return ThrottleDecision::Defer(self.interval - elapsed);
      }
    }
    self.last_fire = Some(now);
    ThrottleDecision::FireNow
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const INTERVAL: Duration = Duration::from_millis(120);

  fn throttle() -> (Throttle, Instant) {
    (Throttle::new(INTERVAL), Instant::now())
  }

  #[test]
  fn first_trigger_fires_immediately() {
    let (mut throttle, start) = throttle();
    assert_eq!(throttle.trigger(start), ThrottleDecision::FireNow);
  }

  #[test]
  fn trigger_inside_window_defers_for_the_remainder() {
    let (mut throttle, start) = throttle();
    assert_eq!(throttle.trigger(start), ThrottleDecision::FireNow);

    let decision = throttle.trigger(start + Duration::from_millis(40));
    assert_eq!(
      decision,
      ThrottleDecision::Defer(Duration::from_millis(80)),
      "remaining time should complete the window"
    );
  }

  #[test]
  fn trigger_after_window_fires_immediately() {
    let (mut throttle, start) = throttle();
    assert_eq!(throttle.trigger(start), ThrottleDecision::FireNow);
    assert_eq!(
      throttle.trigger(start + Duration::from_millis(121)),
      ThrottleDecision::FireNow
    );
  }

  #[test]
  fn burst_yields_one_leading_fire() {
    let (mut throttle, start) = throttle();
    let mut fires = 0;
    for offset_ms in [0, 10, 20, 50, 90, 110] {
      if throttle.trigger(start + Duration::from_millis(offset_ms)) == ThrottleDecision::FireNow {
        fires += 1;
      }
    }
    assert_eq!(fires, 1, "a sub-interval burst fires exactly once");
  }

  #[test]
  fn deferred_fire_does_not_reset_the_window() {
    let (mut throttle, start) = throttle();
    assert_eq!(throttle.trigger(start), ThrottleDecision::FireNow);
    assert!(matches!(
      throttle.trigger(start + Duration::from_millis(100)),
      ThrottleDecision::Defer(_)
    ));

    // The trailing task runs at start+120; a fresh trigger just after
    // is outside the window measured from the leading fire.
    assert_eq!(
      throttle.trigger(start + Duration::from_millis(125)),
      ThrottleDecision::FireNow
    );
  }
}
