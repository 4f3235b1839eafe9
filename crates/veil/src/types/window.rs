/*! Shell window records from the window server. */

use super::WindowId;

/// An entry from the system shell's window list.
///
/// Only the fields the fullscreen-Space heuristic reads are carried:
/// stacking layer (signed - backdrop windows sit below layer zero),
/// the on-screen flag, and the window name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellWindow {
  /// Window-server identifier.
  pub id: WindowId,
  /// Owning application name as reported by the window server.
  pub owner: String,
  /// Window name, when the window server reports one.
  pub name: Option<String>,
  /// Stacking layer. Negative for desktop/backdrop windows.
  pub layer: i32,
  /// Whether the window server flags this window as on screen.
  pub on_screen: bool,
}
