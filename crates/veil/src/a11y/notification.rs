/*!
Accessibility notifications the monitor subscribes to.

Notifications are events the system fires when the frontmost app's
window situation changes. Platform mappings (macOS `kAX*Notification`
strings) are handled by the platform layer.
*/

/// Notifications relevant to fullscreen tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxNotification {
  /// The app's focused window changed.
  FocusedWindowChanged,
  /// The app's main window changed.
  MainWindowChanged,
  /// The observed window was resized.
  WindowResized,
  /// The observed window was moved.
  WindowMoved,
  /// The observed element was destroyed and is no longer valid.
  Destroyed,
}

impl AxNotification {
  /// Notifications subscribed on the application element.
  pub const APP_LEVEL: &'static [Self] = &[Self::FocusedWindowChanged, Self::MainWindowChanged];

  /// Notifications subscribed on the bound window element.
  pub const WINDOW_LEVEL: &'static [Self] =
    &[Self::WindowResized, Self::WindowMoved, Self::Destroyed];

  /// Whether this notification is subscribed at the app level.
  pub const fn is_app_level(self) -> bool {
    matches!(self, Self::FocusedWindowChanged | Self::MainWindowChanged)
  }

  /// Whether receiving this notification requires rebinding the
  /// focused window.
  pub const fn rebinds_window(self) -> bool {
    self.is_app_level()
  }
}
