use std::path::PathBuf;

use crate::{
    config::RenderConfig,
    foundation::{
        core::FrameIndex,
        error::{FailureKind, FlyaroundError, FlyaroundResult},
    },
    orbit::path::{OrbitSpec, advance, initial_state},
    render::{process::ProcessRenderer, task::FrameTask},
};

/// Frame rate suggested for assembling the rendered sequence.
pub const DEFAULT_VIDEO_FPS: u32 = 30;

/// Per-frame render step driven by [`PipelineDriver`].
///
/// Ordering contract: `render_frame` is called in strictly increasing frame order, one call at a
/// time, and never before `prepare` has succeeded.
pub trait FrameRenderer {
    /// Called once before the first frame.
    fn prepare(&mut self) -> FlyaroundResult<()> {
        Ok(())
    }

    /// Produce the display image for `task` and return its path.
    fn render_frame(&mut self, task: &FrameTask) -> FlyaroundResult<PathBuf>;
}

/// What to do when a frame fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed frame.
    #[default]
    Abort,
    /// Record the failure and move on to the next frame.
    Continue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Aborted,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameFailure {
    pub index: FrameIndex,
    pub kind: FailureKind,
    pub message: String,
}

impl FrameFailure {
    pub fn from_error(index: FrameIndex, err: &FlyaroundError) -> Self {
        Self {
            index,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a run, complete or partial.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RunReport {
    pub state: RunState,
    pub frames_planned: u64,
    pub frames_attempted: u64,
    pub frames_succeeded: u64,
    /// Display images in frame order.
    pub images: Vec<PathBuf>,
    pub failures: Vec<FrameFailure>,
    /// Follow-up `ffmpeg` command for the written images; `None` when no frame succeeded.
    pub assembly_command: Option<String>,
}

impl RunReport {
    pub fn frames_failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Every planned frame produced an image.
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Completed && self.frames_succeeded == self.frames_planned
    }
}

/// Sequences a whole fly-around: one pose, one render, one state update per frame.
#[derive(Debug, Default)]
pub struct PipelineDriver {
    policy: FailurePolicy,
    state: RunState,
}

impl PipelineDriver {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            state: RunState::NotStarted,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Attempt frames `0..spec.frame_count` in order.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure ends the run with
    /// [`FlyaroundError::Aborted`], which carries the partial report. Under
    /// [`FailurePolicy::Continue`] every frame is attempted and failures are listed in the
    /// returned report.
    pub fn run(
        &mut self,
        spec: &OrbitSpec,
        renderer: &mut dyn FrameRenderer,
    ) -> FlyaroundResult<RunReport> {
        if self.state != RunState::NotStarted {
            return Err(FlyaroundError::validation(
                "pipeline driver has already run; create a new one per run",
            ));
        }

        renderer.prepare()?;
        self.state = RunState::Running;

        let mut report = RunReport {
            state: RunState::Running,
            frames_planned: spec.frame_count,
            ..RunReport::default()
        };
        tracing::info!(
            frames = spec.frame_count,
            origin = %spec.origin,
            step_degrees = spec.angular_step_degrees,
            policy = ?self.policy,
            "starting fly-around"
        );

        let mut orbit = initial_state(spec);
        for i in 0..spec.frame_count {
            let (displacement, next) = advance(orbit, spec);
            let task = FrameTask::new(FrameIndex(i), spec.origin, displacement);
            tracing::info!(frame = i, lookfrom = %task.lookfrom, lookat = %task.lookat, "rendering frame");

            report.frames_attempted += 1;
            let outcome = renderer.render_frame(&task);
            orbit = next;

            match outcome {
                Ok(image) => {
                    tracing::info!(frame = i, image = %image.display(), "frame done");
                    report.frames_succeeded += 1;
                    report.images.push(image);
                }
                Err(err) => {
                    tracing::error!(frame = i, kind = ?err.kind(), error = %err, "frame failed");
                    report.failures.push(FrameFailure::from_error(task.index, &err));

                    if self.policy == FailurePolicy::Abort {
                        self.state = RunState::Aborted;
                        report.state = RunState::Aborted;
                        return Err(FlyaroundError::Aborted {
                            report: Box::new(report),
                            source: Box::new(err),
                        });
                    }
                }
            }
        }

        self.state = RunState::Completed;
        report.state = RunState::Completed;
        tracing::info!(
            attempted = report.frames_attempted,
            succeeded = report.frames_succeeded,
            failed = report.frames_failed(),
            "fly-around finished"
        );
        Ok(report)
    }
}

/// Run an orbit against the external render engine described by `render`.
pub fn run_orbit(
    spec: &OrbitSpec,
    render: &RenderConfig,
    policy: FailurePolicy,
) -> FlyaroundResult<RunReport> {
    let mut renderer = ProcessRenderer::new(render.clone(), spec.frame_count)?;
    match PipelineDriver::new(policy).run(spec, &mut renderer) {
        Ok(mut report) => {
            attach_assembly_command(&mut report, &renderer);
            Ok(report)
        }
        Err(FlyaroundError::Aborted { mut report, source }) => {
            attach_assembly_command(&mut report, &renderer);
            Err(FlyaroundError::Aborted { report, source })
        }
        Err(e) => Err(e),
    }
}

fn attach_assembly_command(report: &mut RunReport, renderer: &ProcessRenderer) {
    if report.frames_succeeded == 0 {
        return;
    }
    let command = renderer.assembly_command(DEFAULT_VIDEO_FPS);
    tracing::info!(command = %command, "assemble the frames into a video with");
    report.assembly_command = Some(command);
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/driver.rs"]
mod tests;
