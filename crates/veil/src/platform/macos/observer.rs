/*!
`AXObserver` management and the unified callback for macOS.

# Context Design

The C callback receives a raw `refcon` pointer that must map back to a
typed Rust callback. The pointer carries only a stable u64 id; the
actual callback lives in a registry keyed by that id, so a stale
`refcon` held by macOS can never dangle into freed closure state.

`AXObserver` callbacks are delivered through the main run loop's
source, so the registry is `thread_local` - loop-affine like the rest
of the crate.
*/

#![allow(unsafe_code)]
#![allow(clippy::expect_used)] // NonNull::new on stack pointers - never null

use objc2_application_services::{AXError, AXObserver, AXUIElement};
use objc2_core_foundation::{kCFRunLoopDefaultMode, CFRetained, CFRunLoop, CFString};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::panic::AssertUnwindSafe;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::handles::AxElement;
use super::mapping::{notification_from_macos, notification_to_macos};
use super::MacSubscription;
use crate::a11y::AxNotification;
use crate::platform::traits::ProcessObserver;
use crate::types::{ProcessId, VeilError, VeilResult};

/// Next available context ID.
static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
  /// Registry mapping context IDs to observer callbacks.
  static OBSERVER_CONTEXTS: RefCell<HashMap<u64, Rc<dyn Fn(AxNotification)>>> =
    RefCell::new(HashMap::new());
}

/// Opaque handle passed to macOS callbacks.
/// Contains only an ID that maps to the context in `OBSERVER_CONTEXTS`.
#[repr(C)]
struct ObserverContextHandle {
  context_id: u64,
}

/// One `AXObserver` per observed process. Subscriptions created
/// through it share the observer's callback; dropping the observer
/// removes its run loop source and unregisters the context.
pub struct AxProcessObserver {
  observer: CFRetained<AXObserver>,
  context_id: u64,
  refcon: *mut ObserverContextHandle,
}

impl AxProcessObserver {
  pub(super) fn create(
    pid: ProcessId,
    on_event: Rc<dyn Fn(AxNotification)>,
  ) -> VeilResult<Self> {
    let observer = unsafe {
      let mut observer_ptr: *mut AXObserver = std::ptr::null_mut();
      let result = AXObserver::create(
        pid.0,
        Some(observer_callback),
        NonNull::new(&raw mut observer_ptr).expect("stack pointer is never null"),
      );

      if result != AXError::Success {
        return Err(VeilError::ObserverError(format!(
          "AXObserverCreate failed for PID {pid} with code {result:?}"
        )));
      }

      CFRetained::from_raw(NonNull::new(observer_ptr).ok_or_else(|| {
        VeilError::ObserverError("AXObserverCreate returned null".to_string())
      })?)
    };

    // Add to main run loop - required for callbacks to fire
    unsafe {
      let run_loop_source = observer.run_loop_source();
      if let Some(main_run_loop) = CFRunLoop::main() {
        main_run_loop.add_source(Some(&run_loop_source), kCFRunLoopDefaultMode);
      }
    }

    let context_id = NEXT_CONTEXT_ID.fetch_add(1, AtomicOrdering::Relaxed);
    OBSERVER_CONTEXTS.with(|contexts| contexts.borrow_mut().insert(context_id, on_event));
    let refcon = Box::into_raw(Box::new(ObserverContextHandle { context_id }));

    Ok(Self {
      observer,
      context_id,
      refcon,
    })
  }
}

impl Drop for AxProcessObserver {
  fn drop(&mut self) {
    unsafe {
      let run_loop_source = self.observer.run_loop_source();
      if let Some(main_run_loop) = CFRunLoop::main() {
        main_run_loop.remove_source(Some(&run_loop_source), kCFRunLoopDefaultMode);
      }
      drop(Box::from_raw(self.refcon));
    }
    OBSERVER_CONTEXTS.with(|contexts| contexts.borrow_mut().remove(&self.context_id));
  }
}

impl ProcessObserver for AxProcessObserver {
  type Handle = AxElement;
  type Subscription = MacSubscription;

  fn subscribe(
    &self,
    element: &AxElement,
    notification: AxNotification,
  ) -> VeilResult<MacSubscription> {
    let name = CFString::from_static_str(notification_to_macos(notification));
    let result = unsafe {
      self
        .observer
        .add_notification(element.inner(), &name, self.refcon.cast::<c_void>())
    };
    if result != AXError::Success {
      return Err(VeilError::ObserverError(format!(
        "Failed to register {notification:?}: {result:?}"
      )));
    }
    Ok(MacSubscription::Ax(AxSubscription {
      observer: self.observer.clone(),
      element: element.clone(),
      notification,
    }))
  }
}

impl std::fmt::Debug for AxProcessObserver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AxProcessObserver")
      .field("context_id", &self.context_id)
      .finish_non_exhaustive()
  }
}

/// One (element, notification) registration; removed on drop.
pub struct AxSubscription {
  observer: CFRetained<AXObserver>,
  element: AxElement,
  notification: AxNotification,
}

impl Drop for AxSubscription {
  fn drop(&mut self) {
    let name = CFString::from_static_str(notification_to_macos(self.notification));
    // The element may already be gone; removal failure is expected.
    unsafe {
      let _ = self
        .observer
        .remove_notification(self.element.inner(), &name);
    }
  }
}

impl std::fmt::Debug for AxSubscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AxSubscription")
      .field("notification", &self.notification)
      .finish_non_exhaustive()
  }
}

/// Observer callback - maps the notification string and dispatches to
/// the registered Rust callback.
unsafe extern "C-unwind" fn observer_callback(
  _observer: NonNull<AXObserver>,
  _element: NonNull<AXUIElement>,
  notification: NonNull<CFString>,
  refcon: *mut c_void,
) {
  let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
    if refcon.is_null() {
      return;
    }

    let notification_str = notification.as_ref().to_string();
    let Some(notification) = notification_from_macos(&notification_str) else {
      log::debug!("Ignoring accessibility notification: {notification_str}");
      return;
    };

    let context_id = (*refcon.cast::<ObserverContextHandle>()).context_id;
    // Clone out of the registry so the borrow ends before dispatch.
    let on_event =
      OBSERVER_CONTEXTS.with(|contexts| contexts.borrow().get(&context_id).map(Rc::clone));

    if let Some(on_event) = on_event {
      on_event(notification);
    }
  }));

  if result.is_err() {
    log::warn!("Accessibility notification handler panicked (possibly invalid element)");
  }
}
