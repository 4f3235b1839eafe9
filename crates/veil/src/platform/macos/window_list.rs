/*! Shell window enumeration for macOS.

Uses `CGWindowListCopyWindowInfo` to enumerate the Dock's windows.
*/

#![allow(unsafe_code)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use objc2_core_foundation::{CFArray, CFDictionary};
use objc2_core_graphics::{kCGNullWindowID, CGWindowListCopyWindowInfo, CGWindowListOption};

use super::cf_utils::{get_cf_boolean, get_cf_number, get_cf_string, retain_cf_dictionary};
use crate::types::{ShellWindow, WindowId};

/// Owner name of the system shell's windows.
const SHELL_OWNER: &str = "Dock";

/// Enumerate the shell's windows, or `None` when enumeration fails.
pub(super) fn shell_windows() -> Option<Vec<ShellWindow>> {
  // IMPORTANT: Wrap in autorelease pool to prevent memory leaks.
  objc2::rc::autoreleasepool(|_pool| shell_windows_inner())
}

fn shell_windows_inner() -> Option<Vec<ShellWindow>> {
  // OptionAll keeps desktop-element windows in the list. The backdrop
  // windows the fullscreen heuristic counts are exactly the windows
  // ExcludeDesktopElements would hide.
  let option = CGWindowListOption::OptionAll;

  let window_list_info = CGWindowListCopyWindowInfo(option, kCGNullWindowID)?;

  let windows_count = CFArray::count(&window_list_info);
  let mut windows = Vec::new();

  for idx in 0..windows_count {
    let window_cf_dictionary_ref =
      unsafe { CFArray::value_at_index(&window_list_info, idx).cast::<CFDictionary>() };

    let Some(dict) = retain_cf_dictionary(window_cf_dictionary_ref) else {
      continue;
    };

    let owner = get_cf_string(&dict, "kCGWindowOwnerName");
    if owner != SHELL_OWNER {
      continue;
    }

    let name = get_cf_string(&dict, "kCGWindowName");

    windows.push(ShellWindow {
      id: WindowId(get_cf_number(&dict, "kCGWindowNumber") as u32),
      owner,
      name: if name.is_empty() { None } else { Some(name) },
      layer: get_cf_number(&dict, "kCGWindowLayer"),
      on_screen: get_cf_boolean(&dict, "kCGWindowIsOnscreen"),
    });
  }

  Some(windows)
}
