/*!
Veil - fullscreen-aware visibility coordination for overlay windows.

A floating, always-on-top overlay should disappear when the frontmost
app takes over the screen and come back promptly when it leaves. No
single OS event says so reliably, so Veil fuses several imperfect
signals into one flicker-free decision:

- a push-based accessibility observer following the frontmost app's
  focused window, debounced through a leading+trailing throttle
- a fullscreen evaluator (attribute query, geometry fallback)
- a shell-window heuristic corroborating fullscreen Spaces
- a tiered poll safety net for missed or unavailable push signals

```ignore
use std::rc::Rc;
use veil::{MacPlatform, SettingsStore, Veil};

let platform = Rc::new(MacPlatform::new(mtm));
let settings = Rc::new(SettingsStore::default());

// `overlay` implements VisibilityDelegate (show/hide the window).
let veil = Veil::builder().build(platform, settings, Rc::downgrade(&overlay));
let mode = veil.start();
```

Everything runs on the host UI run loop: no threads, no locks. The
overlay hears about confirmed transitions only, and every failure path
degrades toward the overlay staying visible.
*/

mod coordinator;
mod core;
mod dock;
mod evaluate;
mod monitor;
mod platform;
mod settings;
mod throttle;

pub mod a11y;

mod types;
pub use types::*;

pub use crate::coordinator::{
  SpaceProbe, VisibilityCoordinator, VisibilityDelegate, VisibilitySettings,
};
pub use crate::core::{DetectionMode, Veil, VeilBuilder};
pub use crate::dock::DockProbe;
pub use crate::monitor::{FocusMonitor, FullscreenDelegate, FullscreenSource};
pub use crate::platform::traits::{ElementHandle, Platform, ProcessObserver};
pub use crate::settings::{OverlaySettings, SettingsStore};

#[cfg(target_os = "macos")]
pub use crate::platform::macos::{
  AxElement, AxProcessObserver, AxSubscription, MacPlatform, MacSubscription, NotificationToken,
  RunLoopTimer,
};
