/*!
Platform abstraction layer.

Core code only uses the traits in [`traits`] - never platform-specific
types directly. The macOS implementation lives in [`macos`]; tests use
the scripted double in `fake`.
*/

pub mod traits;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(test)]
pub(crate) mod fake;
