/*! Branded ID types for type-safe entity references. */

use derive_more::{Display, From, Into};

/// Process ID - branded type to distinguish from other integer values.
///
/// Signed to match the OS `pid_t` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct ProcessId(pub i32);

/// Window identifier assigned by the window server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct WindowId(pub u32);
