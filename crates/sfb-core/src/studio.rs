//! Studio facade
//!
//! Wires the program model, the sandboxed store and the simulator into the
//! operations the editor invokes:
//!
//! - `compile`: workspace → [`CompiledProgram`]
//! - `read` / `write`: sandboxed text I/O
//! - `persist`: compile, patch the firmware header and write it back, then
//!   optionally upload
//! - `simulate`: preview a workspace on the grid

use crate::config::StudioConfig;
use crate::error::{ErrorResponse, StudioError};
use serde::Serialize;
use sfb_program::{compile_workspace, CompiledProgram, Directive, Workspace};
use sfb_sim::{RunHandle, Simulator};
use sfb_store::{patch, FileStore, ReadOutcome, Sandbox, UploadOutput, Uploader, WriteOutcome};
use std::sync::Arc;

/// Result of the post-write upload step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum UploadStatus {
    NotConfigured,
    Succeeded(UploadOutput),
    Failed(ErrorResponse),
}

/// Everything `persist` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub literal: String,
    pub directives: Vec<Directive>,
    pub write: WriteOutcome,
    pub upload: UploadStatus,
}

impl PersistReport {
    /// The write is durable but the upload failed
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self.upload, UploadStatus::Failed(_))
    }
}

/// One editor session's backend
pub struct Studio {
    config: StudioConfig,
    store: FileStore,
    uploader: Option<Arc<dyn Uploader>>,
    simulator: Simulator,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("uploader", &self.uploader.is_some())
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Build from configuration
    ///
    /// # Errors
    /// - `StudioError::Config` if validation fails
    /// - `StudioError::Store` if the base directory cannot be resolved
    pub fn new(config: StudioConfig) -> Result<Self, StudioError> {
        config.validate()?;
        let store = FileStore::new(Sandbox::new(&config.base_dir)?);
        let uploader = config
            .upload
            .as_ref()
            .map(|u| Arc::new(u.to_uploader()) as Arc<dyn Uploader>);
        let simulator = Simulator::new(config.simulator.to_simulator_config())?;

        tracing::info!(
            base_dir = %store.base_dir().display(),
            upload = uploader.is_some(),
            "studio ready"
        );
        Ok(Self {
            config,
            store,
            uploader,
            simulator,
        })
    }

    /// Replace the upload step
    #[must_use]
    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Underlying simulator
    #[inline]
    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Compile a workspace; `None` compiles to the empty program
    ///
    /// # Errors
    /// `StudioError::Program` for cyclic or dangling workspaces
    pub fn compile(&self, workspace: Option<&Workspace>) -> Result<CompiledProgram, StudioError> {
        let program = compile_workspace(workspace)?;
        tracing::debug!(
            blocks = program.kinds.len(),
            directives = program.directives.len(),
            "compiled"
        );
        Ok(program)
    }

    /// Sandboxed read
    ///
    /// # Errors
    /// `InvalidInput`, `InvalidPath`, `NotFound` or `IoError` kinds
    pub async fn read(&self, relative: &str) -> Result<ReadOutcome, StudioError> {
        Ok(self.store.read(relative).await?)
    }

    /// Sandboxed write
    ///
    /// # Errors
    /// `InvalidInput`, `InvalidPath` or `IoError` kinds
    pub async fn write(&self, relative: &str, content: &str) -> Result<WriteOutcome, StudioError> {
        Ok(self.store.write(relative, content).await?)
    }

    /// [`Studio::persist_to`] on the configured target file
    ///
    /// # Errors
    /// See [`Studio::persist_to`]
    pub async fn persist(&self, workspace: Option<&Workspace>) -> Result<PersistReport, StudioError> {
        let target = self.config.target_file.clone();
        self.persist_to(workspace, &target).await
    }

    /// Compile, patch `target` and write it back, then upload
    ///
    /// A missing or unreadable target is patched from the default template.
    /// Nothing is written if patching fails. Upload failure is reported in
    /// the returned [`PersistReport`], never as an error.
    ///
    /// # Errors
    /// - `StudioError::Program` if the workspace does not compile
    /// - `InvalidInput` / `InvalidPath` kinds for a bad `target`
    /// - `PatchMismatch` if the existing header has no declaration
    /// - `IoError` if the write fails
    pub async fn persist_to(
        &self,
        workspace: Option<&Workspace>,
        target: &str,
    ) -> Result<PersistReport, StudioError> {
        let program = self.compile(workspace)?;

        let existing = match self.store.read(target).await {
            Ok(read) => Some(read.content),
            Err(e) => {
                let err = StudioError::from(e);
                if !err.allows_default_template() {
                    return Err(err);
                }
                tracing::info!(file = target, reason = %err, "patching default template");
                None
            }
        };

        let patched = patch(existing.as_deref(), &program.literal)?;
        let write = self.store.write(target, &patched).await?;

        let upload = match &self.uploader {
            None => UploadStatus::NotConfigured,
            Some(uploader) => match uploader.upload(&write.path).await {
                Ok(output) => UploadStatus::Succeeded(output),
                Err(e) => {
                    let err = StudioError::from(e);
                    tracing::warn!(error = %err, "upload failed after write");
                    UploadStatus::Failed(err.to_response())
                }
            },
        };

        Ok(PersistReport {
            literal: program.literal,
            directives: program.directives,
            write,
            upload,
        })
    }

    /// Start a preview run of `workspace`
    ///
    /// # Errors
    /// - `StudioError::Program` if the workspace does not compile
    /// - `StudioError::Simulation` if it is empty or a run is active
    pub fn simulate(&self, workspace: Option<&Workspace>) -> Result<RunHandle, StudioError> {
        let program = self.compile(workspace)?;
        Ok(self.simulator.start(program.kinds)?)
    }
}
