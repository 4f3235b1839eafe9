/*!
Accessibility monitor for the frontmost application's focused window.

Push-based fullscreen detection: the monitor follows app activation,
attaches a notification observer to the frontmost process, and rebinds
to its focused window as focus moves. Raw notifications are collapsed
by the throttle before evaluation; the delegate hears about edges only.

Attachment is ownership: an [`ObservedTarget`] owns its observer and
subscription handles, and replacing the target drops them - the old
process is fully detached before its successor attaches. At most one
live subscription set exists per target.
*/

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::a11y::AxNotification;
use crate::evaluate::FullscreenEvaluator;
use crate::platform::traits::{ElementHandle, Platform, ProcessObserver};
use crate::throttle::{Throttle, ThrottleDecision};
use crate::types::{FullscreenSignal, ProcessId, VeilError, VeilResult};

/// Hears confirmed fullscreen edges from the monitor.
///
/// Invoked only when the evaluated state differs from the previously
/// cached one - never on repeated identical signals, never on
/// inconclusive evaluations.
pub trait FullscreenDelegate {
  /// The focused window's fullscreen state changed.
  fn on_fullscreen_changed(&self, fullscreen: bool);
}

/// Feeds the coordinator the monitor's current view on demand.
pub trait FullscreenSource {
  /// Evaluate the currently bound window right now.
  fn current_signal(&self) -> FullscreenSignal;
}

/// The focused window binding within an observed target.
struct BoundWindow<P: Platform> {
  handle: P::Handle,
  _subscriptions: Vec<P::Subscription>,
}

/// One attached process: subscriptions drop before the observer.
struct ObservedTarget<P: Platform> {
  pid: ProcessId,
  app: P::Handle,
  window: Option<BoundWindow<P>>,
  _app_subscriptions: Vec<P::Subscription>,
  observer: P::Observer,
}

struct MonitorInner<P: Platform> {
  platform: Rc<P>,
  evaluator: FullscreenEvaluator<P>,
  delegate: Weak<dyn FullscreenDelegate>,
  weak_self: Weak<RefCell<MonitorInner<P>>>,
  activation_subscription: Option<P::Subscription>,
  target: Option<ObservedTarget<P>>,
  throttle: Throttle,
  pending_check: Option<P::Timer>,
  last_known: bool,
}

/// Monitors the frontmost application's focused window for fullscreen
/// state changes. Clone is cheap and shares the monitor.
pub struct FocusMonitor<P: Platform> {
  inner: Rc<RefCell<MonitorInner<P>>>,
}

impl<P: Platform> Clone for FocusMonitor<P> {
  fn clone(&self) -> Self {
    Self {
      inner: Rc::clone(&self.inner),
    }
  }
}

impl<P: Platform> std::fmt::Debug for FocusMonitor<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FocusMonitor").finish_non_exhaustive()
  }
}

impl<P: Platform> FocusMonitor<P> {
  /// Create a detached monitor.
  pub(crate) fn new(platform: Rc<P>, evaluator: FullscreenEvaluator<P>, throttle: Duration) -> Self {
    let inner = Rc::new(RefCell::new(MonitorInner {
      platform,
      evaluator,
      delegate: Weak::<NullDelegate>::new(),
      weak_self: Weak::new(),
      activation_subscription: None,
      target: None,
      throttle: Throttle::new(throttle),
      pending_check: None,
      last_known: false,
    }));
    inner.borrow_mut().weak_self = Rc::downgrade(&inner);
    Self { inner }
  }

  /// Register the delegate that hears fullscreen edges.
  pub(crate) fn set_delegate(&self, delegate: Weak<dyn FullscreenDelegate>) {
    self.inner.borrow_mut().delegate = delegate;
  }

  /// Start following the frontmost application.
  ///
  /// Fails with [`VeilError::PermissionDenied`] when the process is not
  /// trusted; the caller then relies on polling only.
  pub fn start_monitoring(&self) -> VeilResult<()> {
    let mut inner = self.inner.borrow_mut();
    if !inner.platform.is_trusted() {
      return Err(VeilError::PermissionDenied);
    }

    if inner.activation_subscription.is_none() {
      let weak = inner.weak_self.clone();
      inner.activation_subscription = inner.platform.observe_activation(Rc::new(move || {
        if let Some(inner) = weak.upgrade() {
          handle_activation(&inner);
        }
      }));
    }

    inner.attach_frontmost();
    Ok(())
  }

  /// Detach everything: subscriptions, the observer, and any pending
  /// deferred check. Synchronous.
  pub fn stop_monitoring(&self) {
    let mut inner = self.inner.borrow_mut();
    inner.pending_check = None;
    inner.activation_subscription = None;
    inner.target = None;
  }

  /// Re-resolve the frontmost application and re-evaluate, without
  /// waiting for the next push event. Callable by the host window after
  /// its own activation handling.
  pub fn reattach(&self) {
    handle_activation(&self.inner);
  }

  /// Whether an observed target is currently attached.
  pub fn is_attached(&self) -> bool {
    self.inner.borrow().target.is_some()
  }

  /// Query the current fullscreen state without notifying the delegate.
  /// Inconclusive evaluations read as "not fullscreen".
  pub fn check_current_state(&self) -> bool {
    self.current_signal().as_bool().unwrap_or(false)
  }

  /// Evaluate the currently bound window.
  pub fn current_signal(&self) -> FullscreenSignal {
    self.inner.borrow().evaluate()
  }
}

impl<P: Platform> FullscreenSource for FocusMonitor<P> {
  fn current_signal(&self) -> FullscreenSignal {
    FocusMonitor::current_signal(self)
  }
}

/// Placeholder delegate type for the unset state.
struct NullDelegate;

impl FullscreenDelegate for NullDelegate {
  fn on_fullscreen_changed(&self, _fullscreen: bool) {}
}

impl<P: Platform> MonitorInner<P> {
  /// Attach to the frontmost application, detaching any previous
  /// target first. A no-op when the frontmost process is already the
  /// observed one.
  fn attach_frontmost(&mut self) {
    if !self.platform.is_trusted() {
      return;
    }
    let Some(app) = self.platform.frontmost_app() else {
      return;
    };
    let pid = app.pid();

    if self.target.as_ref().is_some_and(|target| target.pid == pid) {
      return;
    }

    // Dropping the old target detaches its subscriptions and observer
    // before the successor attaches.
    self.target = None;

    let weak = self.weak_self.clone();
    let observer = match self.platform.create_observer(
      pid,
      Rc::new(move |notification| {
        if let Some(inner) = weak.upgrade() {
          handle_ax_event(&inner, notification);
        }
      }),
    ) {
      Ok(observer) => observer,
      Err(e) => {
        log::warn!("Observer creation failed for {pid}: {e}");
        return;
      }
    };

    let mut app_subscriptions = Vec::new();
    for &notification in AxNotification::APP_LEVEL {
      match observer.subscribe(&app, notification) {
        Ok(subscription) => app_subscriptions.push(subscription),
        Err(e) => log::debug!("App subscription {notification:?} failed for {pid}: {e}"),
      }
    }

    log::debug!("Attached to frontmost app {pid}");
    self.target = Some(ObservedTarget {
      pid,
      app,
      window: None,
      _app_subscriptions: app_subscriptions,
      observer,
    });
    self.rebind_window();
  }

  /// Bind to the target app's currently focused window, replacing any
  /// previous binding. Rebinding to the already-bound window is a
  /// no-op.
  fn rebind_window(&mut self) {
    let Some(target) = self.target.as_mut() else {
      return;
    };

    let focused = target.app.focused_window();

    if let (Some(bound), Some(focused)) = (target.window.as_ref(), focused.as_ref()) {
      if bound.handle.same_element(focused) {
        return;
      }
    }

    // Old window subscriptions detach here.
    target.window = None;

    let Some(window) = focused else {
      return;
    };

    let mut subscriptions = Vec::new();
    for &notification in AxNotification::WINDOW_LEVEL {
      match target.observer.subscribe(&window, notification) {
        Ok(subscription) => subscriptions.push(subscription),
        Err(e) => log::debug!("Window subscription {notification:?} failed: {e}"),
      }
    }

    target.window = Some(BoundWindow {
      handle: window,
      _subscriptions: subscriptions,
    });
  }

  /// Forget the bound window; the next evaluation reads `Unknown`
  /// until rebinding.
  fn clear_window(&mut self) {
    if let Some(target) = self.target.as_mut() {
      target.window = None;
    }
  }

  fn evaluate(&self) -> FullscreenSignal {
    let window = self
      .target
      .as_ref()
      .and_then(|target| target.window.as_ref())
      .map(|bound| &bound.handle);
    self.evaluator.evaluate(window)
  }

  /// Run the evaluator and report an edge, if any. Inconclusive
  /// evaluations leave the cached state untouched.
  fn run_check(&mut self) -> Option<bool> {
    let Some(fullscreen) = self.evaluate().as_bool() else {
      return None;
    };
    if fullscreen == self.last_known {
      return None;
    }
    self.last_known = fullscreen;
    log::debug!("Fullscreen state changed: {fullscreen}");
    Some(fullscreen)
  }

  /// Feed one raw trigger through the throttle. Any previously pending
  /// trailing check is cancelled by replacement.
  fn throttled_check(&mut self) -> Option<bool> {
    self.pending_check = None;
    match self.throttle.trigger(self.platform.now()) {
      ThrottleDecision::FireNow => self.run_check(),
      ThrottleDecision::Defer(delay) => {
        let weak = self.weak_self.clone();
        self.pending_check = Some(self.platform.schedule_once(
          delay,
          Box::new(move || {
            if let Some(inner) = weak.upgrade() {
              deferred_check(&inner);
            }
          }),
        ));
        None
      }
    }
  }
}

/// Notify the delegate of an edge, outside any `RefCell` borrow so the
/// delegate may synchronously call back into the monitor.
fn notify(delegate: &Weak<dyn FullscreenDelegate>, edge: Option<bool>) {
  if let Some(fullscreen) = edge {
    if let Some(delegate) = delegate.upgrade() {
      delegate.on_fullscreen_changed(fullscreen);
    }
  }
}

fn deferred_check<P: Platform>(inner: &Rc<RefCell<MonitorInner<P>>>) {
  let (delegate, edge) = {
    let mut inner = inner.borrow_mut();
    inner.pending_check = None;
    (inner.delegate.clone(), inner.run_check())
  };
  notify(&delegate, edge);
}

fn handle_activation<P: Platform>(inner: &Rc<RefCell<MonitorInner<P>>>) {
  let (delegate, edge) = {
    let mut inner = inner.borrow_mut();
    inner.attach_frontmost();
    (inner.delegate.clone(), inner.throttled_check())
  };
  notify(&delegate, edge);
}

fn handle_ax_event<P: Platform>(
  inner: &Rc<RefCell<MonitorInner<P>>>,
  notification: AxNotification,
) {
  let (delegate, edge) = {
    let mut inner = inner.borrow_mut();
    match notification {
      AxNotification::FocusedWindowChanged | AxNotification::MainWindowChanged => {
        inner.rebind_window();
      }
      AxNotification::Destroyed => inner.clear_window(),
      AxNotification::WindowResized | AxNotification::WindowMoved => {}
    }
    (inner.delegate.clone(), inner.throttled_check())
  };
  notify(&delegate, edge);
}
