/*! Core types for Veil. */

mod error;
mod geometry;
mod ids;
mod signal;
mod window;

pub use error::{VeilError, VeilResult};
pub use geometry::Bounds;
pub use ids::{ProcessId, WindowId};
pub use signal::{FullscreenSignal, PollTier, Visibility};
pub use window::ShellWindow;
