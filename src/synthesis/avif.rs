//! AVIF encoding through an external encoder process.
//!
//! # Design Decisions
//! - The encoder is a capability behind [`AvifEncoder`] so tests can stub it
//! - Both scratch files are `NamedTempFile`s: they are removed when dropped,
//!   on success and on every error path
//! - The subprocess call blocks with no timeout; callers run it on a
//!   blocking thread

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::{Builder, NamedTempFile};

use super::EncodeError;
use crate::config::ImageConfig;

/// Turns PNG bytes into AVIF bytes.
pub trait AvifEncoder: Send + Sync {
    fn encode(&self, png: &[u8]) -> Result<Vec<u8>, EncodeError>;
}

/// Runs an encoder program over scratch files.
///
/// Arguments are passed verbatim except for the `{input}` and `{output}`
/// placeholders, replaced with the scratch PNG and AVIF paths.
#[derive(Debug, Clone)]
pub struct CommandAvifEncoder {
    program: PathBuf,
    args: Vec<String>,
    scratch_dir: PathBuf,
}

impl CommandAvifEncoder {
    /// `avifenc`-style invocation: `<program> {input} -o {output}`.
    pub fn new(program: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self::with_args(
            program,
            vec!["{input}".to_string(), "-o".to_string(), "{output}".to_string()],
            scratch_dir,
        )
    }

    pub fn with_args(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::with_args(
            &config.avif_encoder,
            config.avif_encoder_args.clone(),
            &config.scratch_dir,
        )
    }

    fn scratch_file(&self, suffix: &str) -> Result<NamedTempFile, EncodeError> {
        Ok(Builder::new()
            .prefix("image_")
            .suffix(suffix)
            .tempfile_in(&self.scratch_dir)?)
    }

    fn expand(&self, input: &Path, output: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect()
    }
}

impl AvifEncoder for CommandAvifEncoder {
    fn encode(&self, png: &[u8]) -> Result<Vec<u8>, EncodeError> {
        fs::create_dir_all(&self.scratch_dir)?;

        let mut input = self.scratch_file(".png")?;
        input.write_all(png)?;
        input.flush()?;
        let output = self.scratch_file(".avif")?;

        let program = self.program.display().to_string();
        tracing::debug!(
            program = %program,
            input = %input.path().display(),
            "Running AVIF encoder"
        );

        let result = Command::new(&self.program)
            .args(self.expand(input.path(), output.path()))
            .output()
            .map_err(|source| EncodeError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(EncodeError::Subprocess {
                program,
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(fs::read(output.path())?)
    }
}
