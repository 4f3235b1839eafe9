/*!
Fullscreen evaluation for the bound window.

Primary path: the window's fullscreen attribute. Not all applications
populate it, so a geometry comparison against the main screen's frame
is the fallback, not an afterthought. A fixed pixel tolerance absorbs
sub-pixel and scaling discrepancies.
*/

use std::rc::Rc;

use crate::platform::traits::{ElementHandle, Platform};
use crate::types::{Bounds, FullscreenSignal};

/// Default tolerance when comparing a window frame to the screen frame.
pub(crate) const DEFAULT_FRAME_TOLERANCE: f64 = 10.0;

/// Answers "is this window fullscreen?" for a window handle.
pub(crate) struct FullscreenEvaluator<P: Platform> {
  platform: Rc<P>,
  tolerance: f64,
}

impl<P: Platform> FullscreenEvaluator<P> {
  pub(crate) const fn new(platform: Rc<P>, tolerance: f64) -> Self {
    Self {
      platform,
      tolerance,
    }
  }

  /// Evaluate the given window.
  ///
  /// Returns [`FullscreenSignal::Unknown`] when no window is bound, or
  /// when the attribute is unreadable and either frame query fails
  /// (e.g. the window was destroyed mid-query).
  pub(crate) fn evaluate(&self, window: Option<&P::Handle>) -> FullscreenSignal {
    let Some(window) = window else {
      return FullscreenSignal::Unknown;
    };

    if let Some(fullscreen) = window.fullscreen_attribute() {
      return FullscreenSignal::from_bool(fullscreen);
    }

    let (Some(frame), Some(screen)) = (window.frame(), self.platform.main_screen_frame()) else {
      return FullscreenSignal::Unknown;
    };

    FullscreenSignal::from_bool(frame_fills_screen(&frame, &screen, self.tolerance))
  }
}

impl<P: Platform> std::fmt::Debug for FullscreenEvaluator<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FullscreenEvaluator")
      .field("tolerance", &self.tolerance)
      .finish_non_exhaustive()
  }
}

/// Geometry comparison core, extracted for testability.
///
/// Origin and size must both sit within the tolerance.
pub(crate) fn frame_fills_screen(frame: &Bounds, screen: &Bounds, tolerance: f64) -> bool {
  frame.matches(screen, tolerance)
}
