/*!
Core Foundation utilities for macOS.

Type-safe wrappers around CF dictionary access for the window list.
*/

#![allow(unsafe_code)]

use objc2_core_foundation::{CFBoolean, CFDictionary, CFNumber, CFNumberType, CFRetained, CFString};
use std::ffi::c_void;

/// Safely get a value from a `CFDictionary` by key.
fn get_cf_dictionary_value<T>(dict: &CFDictionary, key: &str) -> Option<*const T> {
  let key = CFString::from_str(key);
  let key_ref = key.as_ref() as *const CFString;
  if unsafe { CFDictionary::contains_ptr_key(dict, key_ref.cast()) } {
    let value = unsafe { CFDictionary::value(dict, key_ref.cast()) };
    Some(value.cast::<T>())
  } else {
    None
  }
}

/// Extract an i32 number from a `CFDictionary`.
pub(super) fn get_cf_number(dict: &CFDictionary, key: &str) -> i32 {
  unsafe {
    let mut value: i32 = 0;
    if let Some(number) = get_cf_dictionary_value::<CFNumber>(dict, key) {
      CFNumber::value(
        &*number,
        CFNumberType::IntType,
        (&raw mut value).cast::<c_void>(),
      );
    }
    value
  }
}

/// Extract a boolean from a `CFDictionary`.
pub(super) fn get_cf_boolean(dict: &CFDictionary, key: &str) -> bool {
  unsafe {
    match get_cf_dictionary_value::<CFBoolean>(dict, key) {
      Some(value) => CFBoolean::value(&*value),
      None => false,
    }
  }
}

/// Extract a string from a `CFDictionary`.
pub(super) fn get_cf_string(dict: &CFDictionary, key: &str) -> String {
  unsafe {
    match get_cf_dictionary_value::<CFString>(dict, key) {
      Some(value) => (*value).to_string(),
      None => String::new(),
    }
  }
}

/// Retain a `CFDictionary` from a raw pointer.
pub(super) fn retain_cf_dictionary(ptr: *const CFDictionary) -> Option<CFRetained<CFDictionary>> {
  if ptr.is_null() {
    None
  } else {
    Some(unsafe { CFRetained::retain(std::ptr::NonNull::from(&*ptr)) })
  }
}
