/*! Error types for Veil operations. */

/// Errors that can occur during Veil operations.
#[derive(Debug, thiserror::Error)]
pub enum VeilError {
  /// The process is not trusted by the OS accessibility subsystem.
  ///
  /// Not fatal: callers fall back to poll-only detection.
  #[error("Accessibility permissions not granted")]
  PermissionDenied,

  /// Creating or attaching an accessibility observer failed.
  #[error("Observer error: {0}")]
  ObserverError(String),

  /// Reading or writing the settings file failed.
  #[error("Settings I/O error: {0}")]
  SettingsIo(#[from] std::io::Error),

  /// The settings file did not parse.
  #[error("Settings parse error: {0}")]
  SettingsParse(#[from] serde_json::Error),
}

/// Result type for Veil operations.
pub type VeilResult<T> = Result<T, VeilError>;
