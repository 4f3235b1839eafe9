/*!
Fullscreen-Space heuristic from the system shell's window list.

Independent of the accessibility evaluator: when a Space goes
fullscreen the shell parks backdrop windows at negative stacking
layers, one per display. Two or more of them on screen is the modern
tell; older systems instead name the backdrop window outright.

Fails open: when enumeration yields nothing the answer is `false`,
because an overlay that stays visible beats one stuck hidden.
*/

use std::rc::Rc;

use crate::coordinator::SpaceProbe;
use crate::platform::traits::Platform;
use crate::types::ShellWindow;

/// Shell windows at negative layers needed to call a Space fullscreen.
pub(crate) const NEGATIVE_LAYER_QUORUM: usize = 2;

/// Name prefix of the shell's fullscreen backdrop window (older OS
/// releases).
pub(crate) const BACKDROP_NAME_PREFIX: &str = "Fullscreen Backdrop";

/// Probes the shell window list for an active fullscreen Space.
pub struct DockProbe<P: Platform> {
  platform: Rc<P>,
}

impl<P: Platform> DockProbe<P> {
  /// Create a probe over the given platform.
  pub const fn new(platform: Rc<P>) -> Self {
    Self { platform }
  }
}

impl<P: Platform> SpaceProbe for DockProbe<P> {
  fn fullscreen_space_active(&self) -> bool {
    match self.platform.shell_windows() {
      Some(windows) => assess_shell_windows(&windows),
      None => {
        log::warn!("Shell window enumeration failed; assuming no fullscreen Space");
        false
      }
    }
  }
}

impl<P: Platform> std::fmt::Debug for DockProbe<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DockProbe").finish_non_exhaustive()
  }
}

/// Counting core, extracted for testability.
pub(crate) fn assess_shell_windows(windows: &[ShellWindow]) -> bool {
  let negative_layers = windows
    .iter()
    .filter(|window| window.on_screen && window.layer < 0)
    .count();
  if negative_layers >= NEGATIVE_LAYER_QUORUM {
    return true;
  }

  windows.iter().any(|window| {
    window.on_screen
      && window
        .name
        .as_deref()
        .is_some_and(|name| name.starts_with(BACKDROP_NAME_PREFIX))
  })
}
