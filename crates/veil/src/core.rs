/*!
Top-level assembly: wires the monitor, probe, and coordinator together
behind one handle.

# Example

```ignore
use std::rc::Rc;
use veil::{MacPlatform, SettingsStore, Veil};

let platform = Rc::new(MacPlatform::new(mtm));
let settings = Rc::new(SettingsStore::default());
let veil = Veil::builder().build(platform, settings, Rc::downgrade(&overlay));

match veil.start() {
  veil::DetectionMode::Push => {}     // low-latency observer active
  veil::DetectionMode::PollOnly => {} // permission missing; 4 Hz poll
}
```
*/

use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::coordinator::{SpaceProbe, VisibilityCoordinator, VisibilityDelegate, VisibilitySettings};
use crate::dock::DockProbe;
use crate::evaluate::{FullscreenEvaluator, DEFAULT_FRAME_TOLERANCE};
use crate::monitor::{FocusMonitor, FullscreenDelegate, FullscreenSource};
use crate::platform::traits::Platform;
use crate::throttle::DEFAULT_THROTTLE_INTERVAL;
use crate::types::Visibility;

/// How fullscreen transitions are being detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
  /// The accessibility observer is attached; polling only backstops it.
  Push,
  /// Degraded: no accessibility trust, detection is polling alone.
  PollOnly,
}

/// Builder for a [`Veil`] instance.
///
/// # Example
///
/// ```ignore
/// let veil = Veil::builder()
///     .throttle_interval(Duration::from_millis(120))
///     .frame_tolerance(10.0)
///     .build(platform, settings, overlay);
/// ```
#[derive(Debug, Clone, Copy)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct VeilBuilder {
  throttle_interval: Duration,
  frame_tolerance: f64,
}

impl Default for VeilBuilder {
  fn default() -> Self {
    Self {
      throttle_interval: DEFAULT_THROTTLE_INTERVAL,
      frame_tolerance: DEFAULT_FRAME_TOLERANCE,
    }
  }
}

impl VeilBuilder {
  /// Throttle window for raw accessibility notifications.
  /// Default: 120 ms.
  pub const fn throttle_interval(mut self, interval: Duration) -> Self {
    self.throttle_interval = interval;
    self
  }

  /// Pixel tolerance for the geometry fallback. Default: 10 px.
  pub const fn frame_tolerance(mut self, pixels: f64) -> Self {
    self.frame_tolerance = pixels;
    self
  }

  /// Assemble the subsystem. Nothing observes or polls until
  /// [`Veil::start`].
  pub fn build<P: Platform>(
    self,
    platform: Rc<P>,
    settings: Rc<dyn VisibilitySettings>,
    overlay: Weak<dyn VisibilityDelegate>,
  ) -> Veil<P> {
    let evaluator = FullscreenEvaluator::new(Rc::clone(&platform), self.frame_tolerance);
    let monitor = FocusMonitor::new(Rc::clone(&platform), evaluator, self.throttle_interval);
    let probe: Rc<dyn SpaceProbe> = Rc::new(DockProbe::new(Rc::clone(&platform)));
    let source: Rc<dyn FullscreenSource> = Rc::new(monitor.clone());

    let coordinator = Rc::new(VisibilityCoordinator::new(
      platform,
      source,
      probe,
      settings,
      overlay,
    ));
    let coordinator_dyn: Rc<dyn FullscreenDelegate> = coordinator.clone();
    let delegate: Weak<dyn FullscreenDelegate> = Rc::downgrade(&coordinator_dyn);
    monitor.set_delegate(delegate);

    Veil {
      monitor,
      coordinator,
    }
  }
}

/// Fullscreen-aware visibility coordination for one overlay window.
pub struct Veil<P: Platform> {
  monitor: FocusMonitor<P>,
  coordinator: Rc<VisibilityCoordinator<P>>,
}

impl<P: Platform> std::fmt::Debug for Veil<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Veil")
      .field("visibility", &self.visibility())
      .finish_non_exhaustive()
  }
}

impl<P: Platform> Veil<P> {
  /// Create a builder with default tuning.
  pub fn builder() -> VeilBuilder {
    VeilBuilder::default()
  }

  /// Start observing and coordinating.
  ///
  /// Missing accessibility trust is not an error: detection degrades
  /// to the fallback poll and the returned mode says so.
  pub fn start(&self) -> DetectionMode {
    let mode = match self.monitor.start_monitoring() {
      Ok(()) => DetectionMode::Push,
      Err(e) => {
        log::warn!("Accessibility observer unavailable ({e}); using poll-only detection");
        DetectionMode::PollOnly
      }
    };
    self
      .coordinator
      .start(matches!(mode, DetectionMode::Push));
    mode
  }

  /// Tear down all subscriptions, timers, and pending deferred work.
  pub fn stop(&self) {
    self.monitor.stop_monitoring();
    self.coordinator.stop();
  }

  /// Force re-attachment and immediate re-evaluation. Call when the
  /// host window independently learns the app/Space context may have
  /// changed.
  pub fn reattach(&self) {
    self.monitor.reattach();
    self.coordinator.reevaluate();
  }

  /// The coordinator's current decision.
  pub fn visibility(&self) -> Visibility {
    self.coordinator.visibility()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::a11y::AxNotification;
  use crate::platform::fake::{FakeElement, FakePlatform};
  use crate::types::{Bounds, PollTier};
  use std::cell::RefCell;

  const SCREEN: Bounds = Bounds {
    x: 0.0,
    y: 0.0,
    w: 1920.0,
    h: 1080.0,
  };

  struct NullSettings;

  impl VisibilitySettings for NullSettings {
    fn show_during_fullscreen(&self) -> bool {
      false
    }
  }

  struct RecordingOverlay {
    calls: RefCell<Vec<bool>>,
  }

  impl RecordingOverlay {
    fn new() -> Rc<Self> {
      Rc::new(Self {
        calls: RefCell::new(Vec::new()),
      })
    }
  }

  impl VisibilityDelegate for RecordingOverlay {
    fn on_should_hide(&self, hide: bool) {
      self.calls.borrow_mut().push(hide);
    }
  }

  fn build(platform: &Rc<FakePlatform>) -> (Veil<FakePlatform>, Rc<RecordingOverlay>) {
    let overlay = RecordingOverlay::new();
    let overlay_weak: Weak<RecordingOverlay> = Rc::downgrade(&overlay);
    let veil = Veil::<FakePlatform>::builder().build(
      Rc::clone(platform),
      Rc::new(NullSettings),
      overlay_weak,
    );
    (veil, overlay)
  }

  #[test]
  fn end_to_end_hide_via_push_pipeline() {
    let platform = Rc::new(FakePlatform::new());
    platform.set_trusted(true);
    platform.set_screen_frame(Some(SCREEN));
    platform.set_shell_windows(Some(vec![]));

    let app = FakeElement::new(100, "keynote");
    let window = FakeElement::new(100, "keynote-win");
    window.set_fullscreen_attribute(Some(false));
    app.set_focused_window(Some(window.clone()));
    platform.set_frontmost(Some(app));

    let (veil, overlay) = build(&platform);
    assert_eq!(veil.start(), DetectionMode::Push);
    assert_eq!(veil.visibility(), Visibility::Shown);

    // The presentation starts: the window reports fullscreen and the
    // observer pushes a resize notification.
    window.set_fullscreen_attribute(Some(true));
    platform.advance(Duration::from_millis(200));
    platform.fire_ax(100, AxNotification::WindowResized);

    assert_eq!(veil.visibility(), Visibility::Hidden);
    assert_eq!(overlay.calls.borrow().clone(), vec![true]);

    // It ends: push reports windowed, the probe agrees, and the
    // evaluation run by the push path reveals.
    window.set_fullscreen_attribute(Some(false));
    platform.advance(Duration::from_millis(200));
    platform.fire_ax(100, AxNotification::WindowResized);

    assert_eq!(veil.visibility(), Visibility::Shown);
    assert_eq!(overlay.calls.borrow().clone(), vec![true, false]);
  }

  #[test]
  fn untrusted_start_degrades_to_poll_only() {
    let platform = Rc::new(FakePlatform::new());
    platform.set_trusted(false);
    platform.set_shell_windows(Some(vec![]));

    let (veil, _overlay) = build(&platform);
    assert_eq!(veil.start(), DetectionMode::PollOnly);
    assert_eq!(
      platform.repeating_intervals(),
      vec![PollTier::Fallback.interval()],
      "fallback poll must be running"
    );
  }

  #[test]
  fn stop_leaves_no_live_resources() {
    let platform = Rc::new(FakePlatform::new());
    platform.set_trusted(true);
    platform.set_shell_windows(Some(vec![]));
    let app = FakeElement::new(100, "app");
    platform.set_frontmost(Some(app));

    let (veil, _overlay) = build(&platform);
    veil.start();
    veil.stop();

    assert!(platform.live_subscriptions().is_empty());
    assert!(platform.repeating_intervals().is_empty());
  }
}
