/*! Detection signals and coordinator state. */

use std::time::Duration;

/// The evaluator's answer for the currently focused window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenSignal {
  /// No window is bound, or the query failed.
  #[default]
  Unknown,
  /// The focused window occupies its screen.
  Fullscreen,
  /// The focused window is a regular window.
  Windowed,
}

impl FullscreenSignal {
  /// Build a signal from a definite answer.
  pub const fn from_bool(fullscreen: bool) -> Self {
    if fullscreen {
      Self::Fullscreen
    } else {
      Self::Windowed
    }
  }

  /// Definite answer, or `None` when the signal is inconclusive.
  pub const fn as_bool(self) -> Option<bool> {
    match self {
      Self::Unknown => None,
      Self::Fullscreen => Some(true),
      Self::Windowed => Some(false),
    }
  }

  /// Whether this signal positively reports a fullscreen window.
  pub const fn is_fullscreen(self) -> bool {
    matches!(self, Self::Fullscreen)
  }
}

/// Overlay visibility as decided by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  /// The overlay is (or should be) on screen.
  Shown,
  /// The overlay is suppressed for a fullscreen Space.
  Hidden,
}

/// Cadence of the coordinator's safety-net poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTier {
  /// 1 Hz. Used while hidden with a live accessibility observer; the
  /// poll only backstops a missed exit notification.
  ActiveAx,
  /// 4 Hz. Sole detection path when the push observer is unavailable.
  Fallback,
}

impl PollTier {
  /// Tick interval for this tier.
  pub const fn interval(self) -> Duration {
    match self {
      Self::ActiveAx => Duration::from_millis(1000),
      Self::Fallback => Duration::from_millis(250),
    }
  }
}
