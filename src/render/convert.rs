use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::foundation::{
    core::FrameIndex,
    error::{FlyaroundError, FlyaroundResult, IoOperation, exit_label},
};

/// An external program plus the arguments that precede the per-invocation ones.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgramSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProgramSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    pub fn validate(&self, what: &str) -> FlyaroundResult<()> {
        if self.program.trim().is_empty() {
            return Err(FlyaroundError::validation(format!(
                "{what} program must be non-empty"
            )));
        }
        Ok(())
    }
}

/// How a frame's raw dump becomes a display image.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Converter {
    /// Run `program [args..] <raw> <image>`; exit code 0 means success.
    External(ProgramSpec),
    /// Decode the raw PNM dump and re-encode it in-process.
    Builtin,
}

impl Default for Converter {
    fn default() -> Self {
        Self::External(ProgramSpec::new("convert"))
    }
}

impl Converter {
    pub fn validate(&self, display_ext: &str) -> FlyaroundResult<()> {
        match self {
            Self::External(program) => program.validate("converter"),
            Self::Builtin => {
                let writable = image::ImageFormat::from_extension(display_ext)
                    .is_some_and(|f| f.writing_enabled());
                if !writable {
                    return Err(FlyaroundError::validation(format!(
                        "builtin converter cannot write '.{display_ext}' images"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Convert `raw` into `image`. Never touches `raw`.
    pub fn convert(&self, index: FrameIndex, raw: &Path, image: &Path) -> FlyaroundResult<()> {
        match self {
            Self::External(program) => convert_external(program, index, raw, image),
            Self::Builtin => convert_builtin(index, raw, image),
        }
    }
}

fn convert_external(
    program: &ProgramSpec,
    index: FrameIndex,
    raw: &Path,
    image: &Path,
) -> FlyaroundResult<()> {
    let mut cmd = program.command();
    cmd.arg(raw)
        .arg(image)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    tracing::debug!(frame = index.0, command = ?cmd, "running converter");

    let output = cmd
        .output()
        .map_err(|e| FlyaroundError::io(index, IoOperation::SpawnConverter, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::warn!(frame = index.0, stderr = %stderr.trim(), "converter reported errors");
        }
        return Err(FlyaroundError::Conversion {
            index,
            reason: exit_label(&output.status.code()),
        });
    }
    Ok(())
}

fn convert_builtin(index: FrameIndex, raw: &Path, image: &Path) -> FlyaroundResult<()> {
    let failed = |e: image::ImageError| FlyaroundError::Conversion {
        index,
        reason: e.to_string(),
    };

    let format = image::ImageFormat::from_path(image).map_err(failed)?;
    let decoded = image::ImageReader::open(raw)
        .map_err(|e| failed(e.into()))?
        .with_guessed_format()
        .map_err(|e| failed(e.into()))?
        .decode()
        .map_err(failed)?;
    decoded.save_with_format(image, format).map_err(failed)
}

#[cfg(test)]
#[path = "../../tests/unit/render/convert.rs"]
mod tests;
