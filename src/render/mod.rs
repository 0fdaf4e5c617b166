//! Per-frame render orchestration against external tools.

/// Raw-to-display image conversion.
pub mod convert;
/// Render engine process driver.
pub mod process;
/// Frame tasks and the on-disk naming of their artifacts.
pub mod task;
