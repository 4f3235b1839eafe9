/*!
Block-based notification-center observers.

App activation comes through the shared workspace's notification
center; screen-parameter changes through the default center. Both are
delivered on the posting (main) thread when no queue is supplied.
*/

#![allow(unsafe_code)]

use std::ptr::NonNull;
use std::rc::Rc;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{NSObjectProtocol, ProtocolObject};
use objc2_app_kit::NSWorkspace;
use objc2_foundation::{NSNotification, NSNotificationCenter, NSString};

/// Observation token; removes itself from its center on drop.
pub struct NotificationToken {
  center: Retained<NSNotificationCenter>,
  token: Retained<ProtocolObject<dyn NSObjectProtocol>>,
  /// Keeps our copy of the handler block alive alongside the center's.
  _block: RcBlock<dyn Fn(NonNull<NSNotification>)>,
}

impl Drop for NotificationToken {
  fn drop(&mut self) {
    unsafe {
      self.center.removeObserver(&self.token);
    }
  }
}

impl std::fmt::Debug for NotificationToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NotificationToken").finish_non_exhaustive()
  }
}

fn observe(
  center: Retained<NSNotificationCenter>,
  name: &str,
  callback: Rc<dyn Fn()>,
) -> NotificationToken {
  let block = RcBlock::new(move |_notification: NonNull<NSNotification>| {
    callback();
  });
  let name = NSString::from_str(name);
  let token =
    unsafe { center.addObserverForName_object_queue_usingBlock(Some(&name), None, None, &block) };
  NotificationToken {
    center,
    token,
    _block: block,
  }
}

/// Observe frontmost-application changes.
pub(super) fn observe_activation(on_activate: Rc<dyn Fn()>) -> Option<NotificationToken> {
  let workspace = unsafe { NSWorkspace::sharedWorkspace() };
  let center = unsafe { workspace.notificationCenter() };
  Some(observe(
    center,
    "NSWorkspaceDidActivateApplicationNotification",
    on_activate,
  ))
}

/// Observe display configuration changes.
pub(super) fn observe_screen_changes(on_change: Rc<dyn Fn()>) -> Option<NotificationToken> {
  let center = unsafe { NSNotificationCenter::defaultCenter() };
  Some(observe(
    center,
    "NSApplicationDidChangeScreenParametersNotification",
    on_change,
  ))
}
