//! Flyaround drives an external raytracer through an orbital camera fly-around.
//!
//! It never renders pixels itself. For each frame it:
//!
//! 1. **Plans** the camera pose by stepping the polar angle of a spherical offset around a fixed
//!    look-at point ([`OrbitSpec`], [`advance`]).
//! 2. **Renders** by running the engine with the pose on its command line, capturing stdout into
//!    a raw file ([`ProcessRenderer`]).
//! 3. **Converts** the raw file into a display image and removes the raw file ([`Converter`]).
//!
//! Frames run strictly one at a time, in index order. The [`PipelineDriver`] owns the orbit
//! state and applies the [`FailurePolicy`] when a frame fails.
#![forbid(unsafe_code)]

mod config;
mod foundation;
mod orbit;
mod pipeline;
mod render;

pub use config::{Preset, RenderConfig, RunConfig, parse_aspect_ratio};
pub use foundation::core::{FrameIndex, SphericalVector, Vector3};
pub use foundation::error::{FailureKind, FlyaroundError, FlyaroundResult, IoOperation};
pub use orbit::path::{OrbitPath, OrbitSpec, OrbitState, advance, initial_state, plan_path};
pub use pipeline::driver::{
    DEFAULT_VIDEO_FPS, FailurePolicy, FrameFailure, FrameRenderer, PipelineDriver, RunReport,
    RunState, run_orbit,
};
pub use render::convert::{Converter, ProgramSpec};
pub use render::process::{ProcessRenderer, engine_args};
pub use render::task::{
    FrameTask, MIN_PAD_WIDTH, RenderArtifact, assembly_command, frame_stem, pad_width,
};
