use std::{fmt, time::Duration};

use crate::{foundation::core::FrameIndex, pipeline::driver::RunReport};

/// Convenience result type used across the crate.
pub type FlyaroundResult<T> = Result<T, FlyaroundError>;

/// The filesystem or process step an [`FlyaroundError::Io`] happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoOperation {
    CreateOutputDir,
    CreateRawFile,
    SpawnEngine,
    WaitEngine,
    SpawnConverter,
    RemoveRawFile,
    ReadConfig,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateOutputDir => "create output directory",
            Self::CreateRawFile => "create raw artifact",
            Self::SpawnEngine => "spawn render engine",
            Self::WaitEngine => "wait for render engine",
            Self::SpawnConverter => "spawn image converter",
            Self::RemoveRawFile => "remove raw artifact",
            Self::ReadConfig => "read run configuration",
        })
    }
}

/// Cloneable classification of a [`FlyaroundError`], recorded in run reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    RenderEngine,
    RenderTimeout,
    Conversion,
    Io,
    Serde,
    Aborted,
    Other,
}

/// Top-level error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum FlyaroundError {
    /// Invalid run configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The render engine exited unsuccessfully. The raw artifact is kept.
    #[error("render engine failed on frame {index} ({})", exit_label(.exit_code))]
    RenderEngine {
        index: FrameIndex,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
    },

    /// The render engine exceeded the per-frame timeout and was killed.
    #[error("render engine timed out on frame {index} after {:.1}s", .timeout.as_secs_f64())]
    RenderTimeout { index: FrameIndex, timeout: Duration },

    /// The image converter failed. The raw artifact is kept.
    #[error("image conversion failed on frame {index}: {reason}")]
    Conversion { index: FrameIndex, reason: String },

    /// Filesystem or process-management failure.
    #[error("failed to {operation}{}: {source}", frame_label(.index))]
    Io {
        index: Option<FrameIndex>,
        operation: IoOperation,
        source: std::io::Error,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A frame failed under the abort policy. `report` holds the partial run.
    #[error("run aborted: {source}")]
    Aborted {
        report: Box<RunReport>,
        source: Box<FlyaroundError>,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlyaroundError {
    /// Build a [`FlyaroundError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlyaroundError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`FlyaroundError::Io`] value attributed to a frame.
    pub fn io(index: FrameIndex, operation: IoOperation, source: std::io::Error) -> Self {
        Self::Io {
            index: Some(index),
            operation,
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::RenderEngine { .. } => FailureKind::RenderEngine,
            Self::RenderTimeout { .. } => FailureKind::RenderTimeout,
            Self::Conversion { .. } => FailureKind::Conversion,
            Self::Io { .. } => FailureKind::Io,
            Self::Serde(_) => FailureKind::Serde,
            Self::Aborted { .. } => FailureKind::Aborted,
            Self::Other(_) => FailureKind::Other,
        }
    }

    /// Frame the error is attributed to, if any.
    pub fn frame(&self) -> Option<FrameIndex> {
        match self {
            Self::RenderEngine { index, .. }
            | Self::RenderTimeout { index, .. }
            | Self::Conversion { index, .. } => Some(*index),
            Self::Io { index, .. } => *index,
            Self::Aborted { source, .. } => source.frame(),
            Self::Validation(_) | Self::Serde(_) | Self::Other(_) => None,
        }
    }

    /// Partial report carried by an aborted run.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}

pub(crate) fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

fn frame_label(index: &Option<FrameIndex>) -> String {
    match index {
        Some(i) => format!(" for frame {i}"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
