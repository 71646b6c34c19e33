//! Testing utilities for the SFB workspace
//!
//! Shared fixtures: workspaces, firmware headers, temp stores and a
//! scriptable uploader.

#![allow(missing_docs)]

use parking_lot::Mutex;
use sfb_program::{Block, BlockIndex, Workspace};
use sfb_store::{FileStore, Sandbox, StoreError, UploadOutput, Uploader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where the firmware expects the sequence header
pub const TARGET_FILE: &str = "M5Stampfly/src/direction_sequence.hpp";

/// A realistic header with surrounding code to preserve
pub const FIRMWARE_HEADER: &str = "#include <cstdint>

typedef enum {
    FORWARD,
    RIGHT,
    LEFT,
    BACK,
    NORMAL,
    FLIP,
} Direction_t;

Direction_t direction_sequence[] = {RIGHT, FORWARD,BACK,LEFT,FLIP};

uint8_t MAX_STATES_NUM = sizeof(direction_sequence) / sizeof(direction_sequence[0]);
";

/// A header the patcher cannot find a declaration in
pub const HEADER_WITHOUT_DECLARATION: &str = "#include <cstdint>\nint direction_sequence[] = {1};\n";

pub fn flight_workspace() -> Workspace {
    Workspace::chain(["take_off", "forward_1s", "forward_1s", "rotate", "land"])
}

/// Two chains: a flight and a lone rotate
pub fn two_chain_workspace() -> Workspace {
    let mut ws = Workspace::chain(["take_off", "right_1s", "land"]);
    ws.push_chain(["rotate"]);
    ws
}

/// `a → b → a`
pub fn cyclic_workspace() -> Workspace {
    let mut ws = Workspace::new();
    let a = ws.push(Block::new("take_off").with_next(BlockIndex(1)));
    ws.push(Block::new("forward_1s").with_next(a));
    ws.top_blocks.push(a);
    ws
}

/// Temp directory plus a store rooted at `<tmp>/firmware`
pub struct TempStore {
    pub dir: TempDir,
    pub store: FileStore,
}

impl TempStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(Sandbox::new(dir.path().join("firmware")).unwrap());
        Self { dir, store }
    }

    pub fn base(&self) -> PathBuf {
        self.dir.path().join("firmware")
    }

    /// Seed a file under the base, bypassing the store
    pub fn seed(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.base().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Uploader that records calls and answers with a fixed result
#[derive(Debug, Default)]
pub struct FakeUploader {
    fail_with: Option<i32>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeUploader {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(exit_code: i32) -> Self {
        Self {
            fail_with: Some(exit_code),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, written: &Path) -> Result<UploadOutput, StoreError> {
        self.calls.lock().push(written.to_path_buf());
        match self.fail_with {
            Some(code) => Err(StoreError::UploadFailed {
                program: "fake".to_string(),
                exit_code: Some(code),
                stderr: "device not found".to_string(),
            }),
            None => Ok(UploadOutput {
                program: "fake".to_string(),
                exit_code: Some(0),
                stdout: "uploaded".to_string(),
                stderr: String::new(),
            }),
        }
    }
}
