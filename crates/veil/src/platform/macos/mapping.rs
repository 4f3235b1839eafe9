/*!
Bidirectional mappings between veil notifications and macOS `kAX*`
notification strings.
*/

use crate::a11y::AxNotification;

/// macOS notification string constants (`kAX*Notification`).
mod ax_notification {
  pub(super) const FOCUSED_WINDOW_CHANGED: &str = "AXFocusedWindowChanged";
  pub(super) const MAIN_WINDOW_CHANGED: &str = "AXMainWindowChanged";
  pub(super) const WINDOW_RESIZED: &str = "AXWindowResized";
  pub(super) const WINDOW_MOVED: &str = "AXWindowMoved";
  pub(super) const DESTROYED: &str = "AXUIElementDestroyed";
}

/// Convert a notification to its macOS string.
pub(super) const fn notification_to_macos(notification: AxNotification) -> &'static str {
  match notification {
    AxNotification::FocusedWindowChanged => ax_notification::FOCUSED_WINDOW_CHANGED,
    AxNotification::MainWindowChanged => ax_notification::MAIN_WINDOW_CHANGED,
    AxNotification::WindowResized => ax_notification::WINDOW_RESIZED,
    AxNotification::WindowMoved => ax_notification::WINDOW_MOVED,
    AxNotification::Destroyed => ax_notification::DESTROYED,
  }
}

/// Convert a macOS notification string back, when it is one we track.
pub(super) fn notification_from_macos(name: &str) -> Option<AxNotification> {
  match name {
    ax_notification::FOCUSED_WINDOW_CHANGED => Some(AxNotification::FocusedWindowChanged),
    ax_notification::MAIN_WINDOW_CHANGED => Some(AxNotification::MainWindowChanged),
    ax_notification::WINDOW_RESIZED => Some(AxNotification::WindowResized),
    ax_notification::WINDOW_MOVED => Some(AxNotification::WindowMoved),
    ax_notification::DESTROYED => Some(AxNotification::Destroyed),
    _ => None,
  }
}
