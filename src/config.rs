//! Run configuration: orbit, render engine settings and failure policy.
//!
//! Everything here is validated before the pipeline sees it. Values not present in a JSON file
//! fall back to the `final-scene` preset.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    foundation::{
        core::Vector3,
        error::{FlyaroundError, FlyaroundResult, IoOperation},
    },
    orbit::path::OrbitSpec,
    pipeline::driver::{FailurePolicy, RunReport, run_orbit},
    render::convert::{Converter, ProgramSpec},
};

/// Render engine invocation settings plus output layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render engine binary and any leading arguments.
    pub engine: ProgramSpec,
    /// Opaque scene selector passed as `--world`.
    pub world: String,
    pub seed: u64,
    /// `W:H`, passed through verbatim.
    pub aspect_ratio: String,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: Option<u32>,
    /// Degrees, exclusive range `(0, 180)`.
    pub field_of_view: Option<f64>,
    pub up: Option<Vector3>,
    /// Appended to the engine command line before the camera points.
    pub extra_args: Vec<String>,
    pub converter: Converter,
    pub output_dir: PathBuf,
    pub raw_ext: String,
    pub display_ext: String,
    /// Per-frame render timeout. `None` waits forever.
    pub timeout_secs: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Preset::FinalScene.config().render
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn validate(&self) -> FlyaroundResult<()> {
        self.engine.validate("render engine")?;
        if self.world.trim().is_empty() {
            return Err(FlyaroundError::validation("world selector must be non-empty"));
        }
        parse_aspect_ratio(&self.aspect_ratio)?;
        if self.image_width == 0 {
            return Err(FlyaroundError::validation("image_width must be non-zero"));
        }
        if self.samples_per_pixel == 0 {
            return Err(FlyaroundError::validation(
                "samples_per_pixel must be non-zero",
            ));
        }
        if let Some(fov) = self.field_of_view
            && !(fov > 0.0 && fov < 180.0)
        {
            return Err(FlyaroundError::validation(
                "field_of_view must be within (0, 180) degrees",
            ));
        }
        if let Some(up) = self.up
            && (!up.is_finite() || up.length() == 0.0)
        {
            return Err(FlyaroundError::validation(
                "up vector must be finite and non-zero",
            ));
        }

        for (name, ext) in [("raw_ext", &self.raw_ext), ("display_ext", &self.display_ext)] {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(FlyaroundError::validation(format!(
                    "{name} must be a non-empty alphanumeric extension, got '{ext}'"
                )));
            }
        }
        // The raw file is deleted after conversion; sharing an extension would delete the image.
        if self.raw_ext.eq_ignore_ascii_case(&self.display_ext) {
            return Err(FlyaroundError::validation(
                "raw_ext and display_ext must differ",
            ));
        }
        self.converter.validate(&self.display_ext)?;

        if let Some(t) = self.timeout_secs
            && !(t > 0.0 && Duration::try_from_secs_f64(t).is_ok())
        {
            return Err(FlyaroundError::validation(format!(
                "timeout_secs must be a positive, representable number of seconds, got {t}"
            )));
        }
        Ok(())
    }
}

/// Parse `W:H` into its two positive integer terms.
pub fn parse_aspect_ratio(s: &str) -> FlyaroundResult<(u32, u32)> {
    let invalid = || FlyaroundError::validation(format!("aspect ratio must be 'W:H', got '{s}'"));
    let (w, h) = s.split_once(':').ok_or_else(invalid)?;
    let w = w.parse::<u32>().map_err(|_| invalid())?;
    let h = h.parse::<u32>().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

/// Everything needed for one fly-around run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub orbit: OrbitSpec,
    pub render: RenderConfig,
    pub failure_policy: FailurePolicy,
}

impl RunConfig {
    pub fn from_path(path: &Path) -> FlyaroundResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| FlyaroundError::Io {
            index: None,
            operation: IoOperation::ReadConfig,
            source,
        })?;
        serde_json::from_str(&text)
            .map_err(|e| FlyaroundError::serde(format!("'{}': {e}", path.display())))
    }

    pub fn from_json(text: &str) -> FlyaroundResult<Self> {
        serde_json::from_str(text).map_err(|e| FlyaroundError::serde(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> FlyaroundResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlyaroundError::serde(e.to_string()))
    }

    pub fn validate(&self) -> FlyaroundResult<()> {
        self.orbit.validate()?;
        self.render.validate()
    }

    /// Validate, then run against the configured render engine.
    pub fn run(&self) -> FlyaroundResult<RunReport> {
        self.validate()?;
        run_orbit(&self.orbit, &self.render, self.failure_policy)
    }
}

/// The two stock fly-arounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// Cornell-box style final scene, square frames.
    #[default]
    FinalScene,
    /// Random spheres field seen from `(13, 2, 3)`.
    RandomScene,
}

impl Preset {
    pub fn config(self) -> RunConfig {
        let (world, aspect_ratio, image_width, samples_per_pixel, orbit) = match self {
            Self::FinalScene => (
                "final_scene",
                "1:1",
                640,
                200,
                OrbitSpec::from_start_position(
                    Vector3::new(278.0, 278.0, 400.0),
                    Vector3::new(478.0, 278.0, -600.0),
                    0.5,
                    10,
                ),
            ),
            Self::RandomScene => (
                "random",
                "3:2",
                600,
                100,
                OrbitSpec {
                    origin: Vector3::ZERO,
                    start_offset: Vector3::new(13.0, 2.0, 3.0),
                    angular_step_degrees: 0.5,
                    frame_count: 10,
                },
            ),
        };

        RunConfig {
            orbit,
            render: RenderConfig {
                engine: ProgramSpec::new("./target/release/raytracer"),
                world: world.to_string(),
                seed: 42,
                aspect_ratio: aspect_ratio.to_string(),
                image_width,
                samples_per_pixel,
                max_depth: None,
                field_of_view: None,
                up: None,
                extra_args: Vec::new(),
                converter: Converter::default(),
                output_dir: PathBuf::from("_movie"),
                raw_ext: "ppm".to_string(),
                display_ext: "png".to_string(),
                timeout_secs: None,
            },
            failure_policy: FailurePolicy::Abort,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
