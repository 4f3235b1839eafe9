/*!
Opaque accessibility element handles with safe accessor methods.

All element-level unsafe FFI is encapsulated here. The rest of the
crate interacts with elements through [`ElementHandle`].
*/

#![allow(unsafe_code)]

use objc2_application_services::{AXError, AXUIElement, AXValue as AXValueRef, AXValueType};
use objc2_core_foundation::{CFBoolean, CFRetained, CFString, CFType, CGPoint, CGSize};
use std::ffi::c_void;
use std::ptr::NonNull;

use crate::platform::traits::ElementHandle;
use crate::types::{Bounds, ProcessId};

// FFI binding for CFEqual (not exposed by objc2-core-foundation)
extern "C" {
  fn CFEqual(cf1: *const c_void, cf2: *const c_void) -> u8;
}

/// Opaque handle to a UI element. Clone is cheap (reference counted).
#[derive(Clone)]
pub struct AxElement {
  inner: CFRetained<AXUIElement>,
  /// Cached PID (extracted once at construction).
  cached_pid: i32,
}

impl AxElement {
  pub(super) fn new(element: CFRetained<AXUIElement>) -> Self {
    let cached_pid = unsafe {
      let mut pid: i32 = 0;
      let result = element.pid(NonNull::new_unchecked(&raw mut pid));
      if result == AXError::Success {
        pid
      } else {
        0 // Fallback for invalid elements (rare)
      }
    };
    Self {
      inner: element,
      cached_pid,
    }
  }

  pub(super) fn inner(&self) -> &AXUIElement {
    &self.inner
  }

  /// Fetch a raw `CFType` attribute.
  fn get_raw_attr(&self, attr: &CFString) -> Option<CFRetained<CFType>> {
    unsafe {
      let mut value: *const CFType = std::ptr::null();
      let result = self
        .inner
        .copy_attribute_value(attr, NonNull::new(&raw mut value)?);
      if result != AXError::Success || value.is_null() {
        return None;
      }
      Some(CFRetained::from_raw(NonNull::new_unchecked(
        value.cast_mut(),
      )))
    }
  }

  /// Get a boolean attribute by name.
  fn get_bool(&self, attr: &CFString) -> Option<bool> {
    let value = self.get_raw_attr(attr)?;
    value
      .downcast_ref::<CFBoolean>()
      .map(objc2_core_foundation::CFBoolean::as_bool)
  }

  /// Decode a `CGPoint`-typed `AXValue` attribute.
  fn get_point(&self, attr: &CFString) -> Option<CGPoint> {
    let value = self.get_raw_attr(attr)?;
    let ax_value = value.downcast_ref::<AXValueRef>()?;
    unsafe {
      if ax_value.r#type() != AXValueType::CGPoint {
        return None;
      }
      let mut point = CGPoint { x: 0.0, y: 0.0 };
      if ax_value.value(
        AXValueType::CGPoint,
        NonNull::new((&raw mut point).cast::<c_void>())?,
      ) {
        Some(point)
      } else {
        None
      }
    }
  }

  /// Decode a `CGSize`-typed `AXValue` attribute.
  fn get_size(&self, attr: &CFString) -> Option<CGSize> {
    let value = self.get_raw_attr(attr)?;
    let ax_value = value.downcast_ref::<AXValueRef>()?;
    unsafe {
      if ax_value.r#type() != AXValueType::CGSize {
        return None;
      }
      let mut size = CGSize {
        width: 0.0,
        height: 0.0,
      };
      if ax_value.value(
        AXValueType::CGSize,
        NonNull::new((&raw mut size).cast::<c_void>())?,
      ) {
        Some(size)
      } else {
        None
      }
    }
  }
}

impl ElementHandle for AxElement {
  fn pid(&self) -> ProcessId {
    ProcessId(self.cached_pid)
  }

  fn focused_window(&self) -> Option<Self> {
    let value = self.get_raw_attr(&CFString::from_static_str("AXFocusedWindow"))?;
    let element = value.downcast::<AXUIElement>().ok()?;
    Some(Self::new(element))
  }

  fn fullscreen_attribute(&self) -> Option<bool> {
    self.get_bool(&CFString::from_static_str("AXFullScreen"))
  }

  fn frame(&self) -> Option<Bounds> {
    let position = self.get_point(&CFString::from_static_str("AXPosition"))?;
    let size = self.get_size(&CFString::from_static_str("AXSize"))?;
    Some(Bounds {
      x: position.x,
      y: position.y,
      w: size.width,
      h: size.height,
    })
  }

  /// Compare with another handle using `CFEqual` (local, no IPC).
  fn same_element(&self, other: &Self) -> bool {
    // IMPORTANT: Use as_ptr() to get the actual CF pointer, not a
    // pointer to the wrapper struct.
    let self_ptr = CFRetained::as_ptr(&self.inner).as_ptr().cast::<c_void>();
    let other_ptr = CFRetained::as_ptr(&other.inner).as_ptr().cast::<c_void>();
    unsafe { CFEqual(self_ptr, other_ptr) != 0 }
  }
}

impl std::fmt::Debug for AxElement {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AxElement")
      .field("pid", &self.cached_pid)
      .finish_non_exhaustive()
  }
}
