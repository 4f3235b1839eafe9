/*!
Platform abstraction traits.

These traits define the contract between the loop-affine core and the
OS. The core is single-threaded: callbacks, subscriptions, and timers
all run on the host UI run loop, so nothing here is `Send` or `Sync`.

Resource lifetimes are ownership: a subscription detaches when dropped
and a timer cancels when dropped. Replacing a stored handle is how the
core cancels its predecessor.
*/

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::a11y::AxNotification;
use crate::types::{Bounds, ProcessId, ShellWindow, VeilResult};

/// Opaque handle to an accessibility element. Clone is cheap
/// (reference counted on the real platform).
pub trait ElementHandle: Clone + 'static {
  /// The owning process (cached at construction).
  fn pid(&self) -> ProcessId;

  /// The element's focused window, for application elements.
  fn focused_window(&self) -> Option<Self>;

  /// The window's fullscreen attribute. `None` when the attribute is
  /// unsupported or unreadable - callers fall back to geometry.
  fn fullscreen_attribute(&self) -> Option<bool>;

  /// The window's frame in screen coordinates. `None` when either the
  /// position or size query fails (e.g. the window was destroyed).
  fn frame(&self) -> Option<Bounds>;

  /// Whether two handles refer to the same underlying element.
  fn same_element(&self, other: &Self) -> bool;
}

/// Notification observer for one process. One observer per process;
/// subscriptions are (element, notification) pairs that detach on drop.
pub trait ProcessObserver {
  /// The element handle type for this platform.
  type Handle: ElementHandle;
  /// Subscription handle; detaches on drop.
  type Subscription;

  /// Subscribe the observer's callback to a notification on an element.
  fn subscribe(
    &self,
    element: &Self::Handle,
    notification: AxNotification,
  ) -> VeilResult<Self::Subscription>;
}

/// Platform-global operations.
pub trait Platform: 'static {
  /// Element handle type for this platform.
  type Handle: ElementHandle;
  /// Observer type for this platform.
  type Observer: ProcessObserver<Handle = Self::Handle, Subscription = Self::Subscription>;
  /// Subscription handle; detaches on drop.
  type Subscription;
  /// Timer handle; cancels on drop.
  type Timer;

  /// Whether the accessibility subsystem trusts this process.
  fn is_trusted(&self) -> bool;

  /// The frontmost application's element, when one exists.
  fn frontmost_app(&self) -> Option<Self::Handle>;

  /// The main screen's frame in screen coordinates.
  fn main_screen_frame(&self) -> Option<Bounds>;

  /// The system shell's current window list. `None` when enumeration
  /// itself fails - callers treat that as an inconclusive signal.
  fn shell_windows(&self) -> Option<Vec<ShellWindow>>;

  /// Create a notification observer for a process. All notifications
  /// subscribed through it are delivered to `on_event` on the run loop.
  fn create_observer(
    &self,
    pid: ProcessId,
    on_event: Rc<dyn Fn(AxNotification)>,
  ) -> VeilResult<Self::Observer>;

  /// Observe application-activation changes. `None` when the
  /// notification source is unavailable.
  fn observe_activation(&self, on_activate: Rc<dyn Fn()>) -> Option<Self::Subscription>;

  /// Observe screen-parameter changes (displays added/removed/resized).
  fn observe_screen_changes(&self, on_change: Rc<dyn Fn()>) -> Option<Self::Subscription>;

  /// Run `task` once on the run loop after `delay`.
  fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Timer;

  /// Run `tick` on the run loop every `interval`.
  fn schedule_repeating(&self, interval: Duration, tick: Box<dyn FnMut()>) -> Self::Timer;

  /// Current instant, injectable for tests.
  fn now(&self) -> Instant;
}
