/*!
Visibility coordinator: the single point of truth for whether the
overlay should be shown.

Reconciles three imperfect sources - the push-based monitor, the
on-demand evaluator behind [`FullscreenSource`], and the shell-window
probe - plus a tiered poll safety net, into one flicker-free decision.

The reconciliation is deliberately asymmetric: any one source saying
"fullscreen" hides the overlay, but revealing requires the evaluator
and the probe to agree the fullscreen condition has ended. Hiding a
moment too long is invisible; revealing a moment too early flickers
the overlay over someone's presentation.

Every failure path degrades toward `Shown` - a stuck-hidden overlay is
the one outcome this subsystem must never produce.
*/

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::monitor::{FullscreenDelegate, FullscreenSource};
use crate::platform::traits::Platform;
use crate::types::{PollTier, Visibility};

/// The overlay window's side of the contract.
///
/// Called only on confirmed transitions, never on repeated identical
/// states - redundant window-ordering calls can themselves trigger
/// spurious focus notifications and feed back into the monitor.
pub trait VisibilityDelegate {
  /// The overlay should hide (`true`) or show (`false`) itself.
  fn on_should_hide(&self, hide: bool);
}

/// Live settings reads; never cached by the coordinator.
pub trait VisibilitySettings {
  /// User override: keep the overlay visible even during fullscreen.
  fn show_during_fullscreen(&self) -> bool;
}

/// Corroborating fullscreen-Space signal (the shell-window probe, or a
/// test double).
pub trait SpaceProbe {
  /// Whether a fullscreen Space currently appears active.
  fn fullscreen_space_active(&self) -> bool;
}

struct CoordinatorInner<P: Platform> {
  platform: Rc<P>,
  weak_self: Weak<RefCell<CoordinatorInner<P>>>,
  source: Rc<dyn FullscreenSource>,
  probe: Rc<dyn SpaceProbe>,
  settings: Rc<dyn VisibilitySettings>,
  delegate: Weak<dyn VisibilityDelegate>,
  visibility: Visibility,
  push_available: bool,
  poll: Option<(PollTier, P::Timer)>,
  activation_subscription: Option<P::Subscription>,
  screen_subscription: Option<P::Subscription>,
}

/// Owns the show/hide state machine. Clone is cheap and shares the
/// coordinator.
pub struct VisibilityCoordinator<P: Platform> {
  inner: Rc<RefCell<CoordinatorInner<P>>>,
}

impl<P: Platform> Clone for VisibilityCoordinator<P> {
  fn clone(&self) -> Self {
    Self {
      inner: Rc::clone(&self.inner),
    }
  }
}

impl<P: Platform> std::fmt::Debug for VisibilityCoordinator<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VisibilityCoordinator")
      .field("visibility", &self.visibility())
      .finish_non_exhaustive()
  }
}

impl<P: Platform> VisibilityCoordinator<P> {
  /// Build a coordinator from its collaborators. Starts at `Shown`.
  pub fn new(
    platform: Rc<P>,
    source: Rc<dyn FullscreenSource>,
    probe: Rc<dyn SpaceProbe>,
    settings: Rc<dyn VisibilitySettings>,
    delegate: Weak<dyn VisibilityDelegate>,
  ) -> Self {
    let inner = Rc::new(RefCell::new(CoordinatorInner {
      platform,
      weak_self: Weak::new(),
      source,
      probe,
      settings,
      delegate,
      visibility: Visibility::Shown,
      push_available: false,
      poll: None,
      activation_subscription: None,
      screen_subscription: None,
    }));
    inner.borrow_mut().weak_self = Rc::downgrade(&inner);
    Self { inner }
  }

  /// Begin coordinating. `push_available` selects the poll tier:
  /// with a live observer the poll only backstops missed exits; without
  /// one it is the sole detection path and runs continuously.
  pub fn start(&self, push_available: bool) {
    {
      let mut inner = self.inner.borrow_mut();
      inner.push_available = push_available;
      // Activation and screen-parameter changes both plausibly mean a
      // Space switch; re-evaluate immediately instead of waiting for
      // the next poll tick.
      if inner.activation_subscription.is_none() {
        let weak = inner.weak_self.clone();
        inner.activation_subscription = inner.platform.observe_activation(Rc::new(move || {
          if let Some(inner) = weak.upgrade() {
            evaluate_now(&inner);
          }
        }));
      }
      if inner.screen_subscription.is_none() {
        let weak = inner.weak_self.clone();
        inner.screen_subscription = inner.platform.observe_screen_changes(Rc::new(move || {
          if let Some(inner) = weak.upgrade() {
            evaluate_now(&inner);
          }
        }));
      }
    }
    evaluate_now(&self.inner);
  }

  /// Cancel the poll timer and notification subscriptions. Synchronous.
  pub fn stop(&self) {
    let mut inner = self.inner.borrow_mut();
    inner.poll = None;
    inner.activation_subscription = None;
    inner.screen_subscription = None;
  }

  /// Re-run the full evaluation immediately instead of waiting for the
  /// next push event or poll tick.
  pub fn reevaluate(&self) {
    evaluate_now(&self.inner);
  }

  /// Current decision.
  pub fn visibility(&self) -> Visibility {
    self.inner.borrow().visibility
  }

  /// Active poll tier, if any.
  pub fn poll_tier(&self) -> Option<PollTier> {
    self.inner.borrow().poll.as_ref().map(|(tier, _)| *tier)
  }
}

impl<P: Platform> FullscreenDelegate for VisibilityCoordinator<P> {
  fn on_fullscreen_changed(&self, fullscreen: bool) {
    if fullscreen {
      // The observer alone is enough to hide.
      hide_now(&self.inner);
    } else {
      // Revealing needs corroboration; run the full evaluation.
      evaluate_now(&self.inner);
    }
  }
}

impl<P: Platform> CoordinatorInner<P> {
  /// The full corroborated decision. The override is evaluated first
  /// on every opportunity.
  fn decide(&self) -> bool {
    if self.settings.show_during_fullscreen() {
      return false;
    }
    let signal = self.source.current_signal();
    let dock = self.probe.fullscreen_space_active();
    // Either source hides; revealing therefore requires both to have
    // cleared. `Unknown` counts as cleared - the probe still has to
    // agree, and a revoked permission must not pin the overlay hidden.
    signal.is_fullscreen() || dock
  }

  /// Apply a decision; returns `Some(hide)` when the overlay delegate
  /// must be informed of a confirmed transition.
  fn apply(&mut self, hide: bool) -> Option<bool> {
    let changed = match self.visibility {
      Visibility::Shown if hide => {
        self.visibility = Visibility::Hidden;
        true
      }
      Visibility::Hidden if !hide => {
        self.visibility = Visibility::Shown;
        true
      }
      Visibility::Shown | Visibility::Hidden => false,
    };
    self.retune_poll();
    if changed {
      log::debug!("Overlay visibility -> {:?}", self.visibility);
      Some(hide)
    } else {
      None
    }
  }

  /// The poll tier this state wants. The user override disables
  /// polling outright.
  fn wanted_tier(&self) -> Option<PollTier> {
    if self.settings.show_during_fullscreen() {
      return None;
    }
    match self.visibility {
      Visibility::Hidden => Some(if self.push_available {
        PollTier::ActiveAx
      } else {
        PollTier::Fallback
      }),
      // Without a push observer the fallback poll must keep running
      // while shown, or fullscreen entry would never be detected.
      Visibility::Shown => (!self.push_available).then_some(PollTier::Fallback),
    }
  }

  fn retune_poll(&mut self) {
    let wanted = self.wanted_tier();
    let current = self.poll.as_ref().map(|(tier, _)| *tier);
    if wanted == current {
      return;
    }

    self.poll = None;
    if let Some(tier) = wanted {
      let weak = self.weak_self.clone();
      let timer = self.platform.schedule_repeating(
        tier.interval(),
        Box::new(move || {
          if let Some(inner) = weak.upgrade() {
            evaluate_now(&inner);
          }
        }),
      );
      log::debug!("Poll tier -> {tier:?}");
      self.poll = Some((tier, timer));
    } else {
      log::debug!("Poll canceled");
    }
  }
}

/// Notify the overlay of a confirmed transition, outside any `RefCell`
/// borrow so the delegate may synchronously call back in.
fn notify(delegate: &Weak<dyn VisibilityDelegate>, change: Option<bool>) {
  if let Some(hide) = change {
    if let Some(delegate) = delegate.upgrade() {
      delegate.on_should_hide(hide);
    }
  }
}

/// Hide on a single push signal, honoring the override.
fn hide_now<P: Platform>(inner: &Rc<RefCell<CoordinatorInner<P>>>) {
  let (delegate, change) = {
    let mut inner = inner.borrow_mut();
    let hide = !inner.settings.show_during_fullscreen();
    (inner.delegate.clone(), inner.apply(hide))
  };
  notify(&delegate, change);
}

/// Run the full corroborated evaluation and apply the outcome.
fn evaluate_now<P: Platform>(inner: &Rc<RefCell<CoordinatorInner<P>>>) {
  let (delegate, change) = {
    let mut inner = inner.borrow_mut();
    let hide = inner.decide();
    (inner.delegate.clone(), inner.apply(hide))
  };
  notify(&delegate, change);
}
