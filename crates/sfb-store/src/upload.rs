//! Post-write upload step
//!
//! After the firmware header is written, an external build/flash command
//! may be run. Its outcome is reported separately from the write: a failed
//! upload never undoes or masks a durable write.

use crate::error::StoreError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Placeholder in upload arguments replaced by the written file's path
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Captured result of a successful upload command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutput {
    pub program: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that ships a written file onward
#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Upload after `written` has been persisted
    async fn upload(&self, written: &Path) -> Result<UploadOutput, StoreError>;
}

/// Runs an external program, e.g. `pio run -t upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUploader {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandUploader {
    /// Command without arguments
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// With arguments; `{path}` is substituted with the written file
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// With working directory
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn expanded_args(&self, written: &Path) -> Vec<String> {
        let path = written.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(PATH_PLACEHOLDER, &path))
            .collect()
    }
}

#[async_trait::async_trait]
impl Uploader for CommandUploader {
    async fn upload(&self, written: &Path) -> Result<UploadOutput, StoreError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.expanded_args(written));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::info!(program = %self.program, file = %written.display(), "running upload command");

        let output = cmd.output().await.map_err(|source| StoreError::UploadSpawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        if !output.status.success() {
            tracing::error!(program = %self.program, ?exit_code, "upload command failed");
            return Err(StoreError::UploadFailed {
                program: self.program.clone(),
                exit_code,
                stderr,
            });
        }

        Ok(UploadOutput {
            program: self.program.clone(),
            exit_code,
            stdout,
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_substitutes_path() {
        let uploader = CommandUploader::new("echo").with_args(["flashing", "{path}"]);
        let out = uploader.upload(Path::new("/fw/seq.hpp")).await.unwrap();

        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout.trim(), "flashing /fw/seq.hpp");
    }

    #[tokio::test]
    async fn non_zero_exit_is_upload_failure() {
        let uploader = CommandUploader::new("sh").with_args(["-c", "echo broken >&2; exit 3"]);
        let err = uploader.upload(Path::new("/fw/seq.hpp")).await.unwrap_err();

        match err {
            StoreError::UploadFailed { exit_code, stderr, .. } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let uploader = CommandUploader::new("sfb-definitely-not-installed");
        let err = uploader.upload(Path::new("/fw/seq.hpp")).await.unwrap_err();
        assert!(matches!(err, StoreError::UploadSpawn { .. }));
        assert!(err.is_upload_failure());
    }
}
