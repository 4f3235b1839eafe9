/*!
Overlay settings store.

A flat, JSON-backed settings struct plus a live store handle. The
coordinator reads through [`VisibilitySettings`] on every decision
opportunity, so changes take effect at the next evaluation without any
restart or cache invalidation.
*/

use std::cell::Cell;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coordinator::VisibilitySettings;
use crate::types::VeilResult;

/// User-facing overlay settings.
///
/// Unknown fields in the file are ignored and missing fields take
/// their defaults, so older files keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OverlaySettings {
  /// Keep the overlay visible even while a fullscreen Space is active.
  pub show_during_fullscreen: bool,
}

/// Live settings holder.
///
/// Interior mutability keeps reads current: a settings window can
/// `set` while the coordinator holds its own reference.
#[derive(Debug, Default)]
pub struct SettingsStore {
  current: Cell<OverlaySettings>,
}

impl SettingsStore {
  /// Create a store with the given settings.
  pub const fn new(settings: OverlaySettings) -> Self {
    Self {
      current: Cell::new(settings),
    }
  }

  /// Load settings from a JSON file.
  pub fn load(path: &Path) -> VeilResult<Self> {
    let data = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&data)?;
    Ok(Self::new(settings))
  }

  /// Write the current settings to a JSON file.
  pub fn save(&self, path: &Path) -> VeilResult<()> {
    let data = serde_json::to_string_pretty(&self.current.get())?;
    fs::write(path, data)?;
    Ok(())
  }

  /// Current settings snapshot.
  pub fn get(&self) -> OverlaySettings {
    self.current.get()
  }

  /// Replace the settings wholesale.
  pub fn set(&self, settings: OverlaySettings) {
    self.current.set(settings);
  }

  /// Flip the fullscreen override.
  pub fn set_show_during_fullscreen(&self, show: bool) {
    let mut settings = self.current.get();
    settings.show_during_fullscreen = show;
    self.current.set(settings);
  }
}

impl VisibilitySettings for SettingsStore {
  fn show_during_fullscreen(&self) -> bool {
    self.current.get().show_during_fullscreen
  }
}
