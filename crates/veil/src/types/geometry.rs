/*! Geometry types for screen coordinates. */

/// Rectangle bounds in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
  /// Horizontal origin.
  pub x: f64,
  /// Vertical origin.
  pub y: f64,
  /// Width.
  pub w: f64,
  /// Height.
  pub h: f64,
}

impl Bounds {
  /// Check if two bounds match within a margin of error.
  ///
  /// Origin and size are compared independently, so sub-pixel and
  /// scaling discrepancies on any edge are absorbed by the margin.
  pub fn matches(&self, other: &Bounds, margin: f64) -> bool {
    (self.x - other.x).abs() <= margin
      && (self.y - other.y).abs() <= margin
      && (self.w - other.w).abs() <= margin
      && (self.h - other.h).abs() <= margin
  }
}
