use std::{
    fs::File,
    path::PathBuf,
    process::{Child, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use crate::{
    config::RenderConfig,
    foundation::{
        core::FrameIndex,
        error::{FlyaroundError, FlyaroundResult, IoOperation},
    },
    pipeline::driver::FrameRenderer,
    render::task::{FrameTask, RenderArtifact, assembly_command, pad_width},
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Drives the external render engine and converter for one frame at a time.
///
/// Per frame: the engine's stdout goes into a fresh raw file, the converter turns it into the
/// display image, and the raw file is removed. On engine or converter failure the raw file stays
/// on disk and no other frame's files are touched.
#[derive(Clone, Debug)]
pub struct ProcessRenderer {
    cfg: RenderConfig,
    pad_width: usize,
}

impl ProcessRenderer {
    /// `frame_count` fixes the zero-padding of file names for the whole run.
    pub fn new(cfg: RenderConfig, frame_count: u64) -> FlyaroundResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            pad_width: pad_width(frame_count),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    /// Video assembly follow-up for the frames this renderer writes.
    pub fn assembly_command(&self, fps: u32) -> String {
        assembly_command(
            &self.cfg.output_dir,
            self.pad_width,
            &self.cfg.display_ext,
            fps,
        )
    }

    pub fn artifact(&self, index: FrameIndex) -> RenderArtifact {
        RenderArtifact::for_frame(
            &self.cfg.output_dir,
            index,
            self.pad_width,
            &self.cfg.raw_ext,
            &self.cfg.display_ext,
        )
    }

    /// Render, convert and clean up one frame. Returns the display image path.
    #[tracing::instrument(skip(self, task), fields(frame = task.index.0))]
    pub fn render(&self, task: &FrameTask) -> FlyaroundResult<PathBuf> {
        let artifact = self.artifact(task.index);

        self.run_engine(task, &artifact)?;
        self.cfg
            .converter
            .convert(task.index, &artifact.raw_path, &artifact.image_path)?;
        std::fs::remove_file(&artifact.raw_path)
            .map_err(|e| FlyaroundError::io(task.index, IoOperation::RemoveRawFile, e))?;

        Ok(artifact.image_path)
    }

    fn run_engine(&self, task: &FrameTask, artifact: &RenderArtifact) -> FlyaroundResult<()> {
        let index = task.index;
        let raw = File::create(&artifact.raw_path)
            .map_err(|e| FlyaroundError::io(index, IoOperation::CreateRawFile, e))?;

        // The command owns our copy of the raw file handle; dropping it at the end of this
        // block leaves the child as the only writer.
        let child = {
            let mut cmd = self.cfg.engine.command();
            cmd.args(engine_args(&self.cfg, task))
                .stdin(Stdio::null())
                .stdout(Stdio::from(raw))
                .stderr(Stdio::inherit());
            tracing::debug!(command = ?cmd, raw = %artifact.raw_path.display(), "spawning render engine");
            cmd.spawn()
                .map_err(|e| FlyaroundError::io(index, IoOperation::SpawnEngine, e))?
        };

        let mut child = ChildGuard(Some(child));
        let timeout = self.cfg.timeout();
        let status = child
            .wait(timeout)
            .map_err(|e| FlyaroundError::io(index, IoOperation::WaitEngine, e))?;

        match (status, timeout) {
            (Some(status), _) if status.success() => Ok(()),
            (Some(status), _) => Err(FlyaroundError::RenderEngine {
                index,
                exit_code: status.code(),
            }),
            (None, Some(timeout)) => {
                child.kill();
                Err(FlyaroundError::RenderTimeout { index, timeout })
            }
            (None, None) => Err(FlyaroundError::io(
                index,
                IoOperation::WaitEngine,
                std::io::Error::other("render engine did not report an exit status"),
            )),
        }
    }
}

impl FrameRenderer for ProcessRenderer {
    fn prepare(&mut self) -> FlyaroundResult<()> {
        std::fs::create_dir_all(&self.cfg.output_dir).map_err(|source| FlyaroundError::Io {
            index: None,
            operation: IoOperation::CreateOutputDir,
            source,
        })
    }

    fn render_frame(&mut self, task: &FrameTask) -> FlyaroundResult<PathBuf> {
        self.render(task)
    }
}

/// Engine command-line flags for one frame, after the configured leading arguments.
pub fn engine_args(cfg: &RenderConfig, task: &FrameTask) -> Vec<String> {
    let mut args = vec![
        format!("--world={}", cfg.world),
        format!("--seed={}", cfg.seed),
        format!("--aspect_ratio={}", cfg.aspect_ratio),
        format!("--image_width={}", cfg.image_width),
        format!("--samples_per_pixel={}", cfg.samples_per_pixel),
    ];
    if let Some(depth) = cfg.max_depth {
        args.push(format!("--max_depth={depth}"));
    }
    if let Some(fov) = cfg.field_of_view {
        args.push(format!("--field_of_view={fov}"));
    }
    if let Some(up) = cfg.up {
        args.push(format!("--up={up}"));
    }
    args.extend(cfg.extra_args.iter().cloned());
    args.push(format!("--lookat={}", task.lookat));
    args.push(format!("--lookfrom={}", task.lookfrom));
    args
}

/// Kills and reaps the child if it is still owned when dropped.
struct ChildGuard(Option<Child>);

impl ChildGuard {
    /// `Ok(None)` means the timeout expired with the child still running.
    fn wait(&mut self, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
        let Some(child) = self.0.as_mut() else {
            return Ok(None);
        };

        // A deadline past the clock's range is the same as no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let status = match deadline {
            None => Some(child.wait()?),
            Some(deadline) => {
                loop {
                    if let Some(status) = child.try_wait()? {
                        break Some(status);
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break None;
                    }
                    std::thread::sleep(POLL_INTERVAL.min(deadline - now));
                }
            }
        };

        if status.is_some() {
            self.0 = None;
        }
        Ok(status)
    }

    fn kill(&mut self) {
        if let Some(mut child) = self.0.take() {
            if let Err(e) = child.kill() {
                tracing::warn!(error = %e, "failed to kill render engine");
            }
            if let Err(e) = child.wait() {
                tracing::warn!(error = %e, "failed to reap render engine");
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/process.rs"]
mod tests;
