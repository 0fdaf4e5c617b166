//! Camera path generation.

/// Spherical-step orbit around a fixed look-at point.
pub mod path;
