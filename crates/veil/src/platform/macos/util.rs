/*! Shared utilities for macOS accessibility. */

#![allow(unsafe_code)]

use objc2_application_services::{AXIsProcessTrusted, AXUIElement};
use objc2_core_foundation::CFRetained;

/// Create an `AXUIElement` for an application by PID.
/// Encapsulates the unsafe FFI call.
pub(super) fn app_element(pid: i32) -> CFRetained<AXUIElement> {
  unsafe { AXUIElement::new_application(pid) }
}

/// Check if accessibility permissions are granted.
pub(super) fn is_process_trusted() -> bool {
  unsafe { AXIsProcessTrusted() }
}
