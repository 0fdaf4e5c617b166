use std::path::{Path, PathBuf};

use crate::foundation::core::{FrameIndex, Vector3};

/// Smallest zero-padding width for frame file stems.
pub const MIN_PAD_WIDTH: usize = 4;

/// Fully resolved camera pose for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameTask {
    pub index: FrameIndex,
    pub lookat: Vector3,
    pub lookfrom: Vector3,
}

impl FrameTask {
    /// Pose looking at `origin` from `origin + displacement`.
    pub fn new(index: FrameIndex, origin: Vector3, displacement: Vector3) -> Self {
        Self {
            index,
            lookat: origin,
            lookfrom: origin + displacement,
        }
    }
}

/// Digits needed so that lexicographic order of frame stems equals numeric order.
pub fn pad_width(frame_count: u64) -> usize {
    let last = frame_count.saturating_sub(1);
    let digits = last.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(MIN_PAD_WIDTH)
}

/// `frame0007` for index 7 at width 4.
pub fn frame_stem(index: FrameIndex, width: usize) -> String {
    format!("frame{:0width$}", index.0, width = width)
}

/// `ffmpeg` command that assembles the display images into a video. Never executed here.
pub fn assembly_command(dir: &Path, width: usize, display_ext: &str, fps: u32) -> String {
    let pattern = dir.join(format!("frame%0{width}d.{display_ext}"));
    // `.` and `..` have no file name to hang an extension on.
    let out = match dir.file_name() {
        Some(_) => dir.with_extension("mpg"),
        None => dir.join("out.mpg"),
    };
    format!(
        "ffmpeg -r {fps} -f image2 -i {} -vcodec libx264 -crf 25 {}",
        pattern.display(),
        out.display()
    )
}

/// The transient raw file and persistent display file of one frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderArtifact {
    pub raw_path: PathBuf,
    pub image_path: PathBuf,
}

impl RenderArtifact {
    pub fn for_frame(
        dir: &Path,
        index: FrameIndex,
        width: usize,
        raw_ext: &str,
        display_ext: &str,
    ) -> Self {
        let stem = frame_stem(index, width);
        Self {
            raw_path: dir.join(format!("{stem}.{raw_ext}")),
            image_path: dir.join(format!("{stem}.{display_ext}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/task.rs"]
mod tests;
