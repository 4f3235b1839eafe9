/*!
macOS implementation of the platform traits.

Accessibility queries and observers go through the `AX*` APIs, shell
windows through `CGWindowListCopyWindowInfo`, deferred work through
`CFRunLoopTimer`, and activation/screen notifications through the
workspace and default notification centers. Everything targets the
main run loop.
*/

#![allow(unsafe_code)]

mod cf_utils;
mod handles;
mod mapping;
mod observer;
mod runloop;
mod util;
mod window_list;
mod workspace;

pub use handles::AxElement;
pub use observer::{AxProcessObserver, AxSubscription};
pub use runloop::RunLoopTimer;
pub use workspace::NotificationToken;

use std::rc::Rc;
use std::time::{Duration, Instant};

use objc2::MainThreadMarker;
use objc2_app_kit::{NSScreen, NSWorkspace};

use crate::a11y::AxNotification;
use crate::platform::traits::Platform;
use crate::types::{Bounds, ProcessId, ShellWindow, VeilResult};

/// Subscription handle for macOS; detaches on drop.
#[derive(Debug)]
pub enum MacSubscription {
  /// An accessibility (element, notification) registration.
  Ax(AxSubscription),
  /// A notification-center observation.
  Notification(NotificationToken),
}

/// The real platform. All methods run on the main thread; the marker
/// enforces it at construction.
#[derive(Debug, Clone, Copy)]
pub struct MacPlatform {
  mtm: MainThreadMarker,
}

impl MacPlatform {
  /// Create the platform facade. Requires the main thread.
  pub const fn new(mtm: MainThreadMarker) -> Self {
    Self { mtm }
  }
}

impl Platform for MacPlatform {
  type Handle = AxElement;
  type Observer = AxProcessObserver;
  type Subscription = MacSubscription;
  type Timer = RunLoopTimer;

  fn is_trusted(&self) -> bool {
    util::is_process_trusted()
  }

  fn frontmost_app(&self) -> Option<AxElement> {
    let workspace = unsafe { NSWorkspace::sharedWorkspace() };
    let app = unsafe { workspace.frontmostApplication() }?;
    let pid = app.processIdentifier();
    Some(AxElement::new(util::app_element(pid)))
  }

  fn main_screen_frame(&self) -> Option<Bounds> {
    let screen = NSScreen::mainScreen(self.mtm)?;
    let frame = screen.frame();
    Some(Bounds {
      x: frame.origin.x,
      y: frame.origin.y,
      w: frame.size.width,
      h: frame.size.height,
    })
  }

  fn shell_windows(&self) -> Option<Vec<ShellWindow>> {
    window_list::shell_windows()
  }

  fn create_observer(
    &self,
    pid: ProcessId,
    on_event: Rc<dyn Fn(AxNotification)>,
  ) -> VeilResult<AxProcessObserver> {
    AxProcessObserver::create(pid, on_event)
  }

  fn observe_activation(&self, on_activate: Rc<dyn Fn()>) -> Option<MacSubscription> {
    workspace::observe_activation(on_activate).map(MacSubscription::Notification)
  }

  fn observe_screen_changes(&self, on_change: Rc<dyn Fn()>) -> Option<MacSubscription> {
    workspace::observe_screen_changes(on_change).map(MacSubscription::Notification)
  }

  fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> RunLoopTimer {
    RunLoopTimer::once(delay, task)
  }

  fn schedule_repeating(&self, interval: Duration, tick: Box<dyn FnMut()>) -> RunLoopTimer {
    RunLoopTimer::repeating(interval, tick)
  }

  fn now(&self) -> Instant {
    Instant::now()
  }
}
