// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ExitGuard`]: the deferred exit hook registered during path
//! configuration that removes the per-run tmp directory and the instance
//! PID file on the way out, the same way a long-running daemon cleans up
//! its socket and PID files on shutdown.

use std::path::PathBuf;
use tracing::warn;

/// Removes the tmp directory and PID file on drop. Held by `Main` for the
/// lifetime of the process; dropped once, on the way out of `Run`.
pub struct ExitGuard {
    tmp_dir: PathBuf,
    pid_file: PathBuf,
}

impl ExitGuard {
    pub fn new(tmp_dir: PathBuf, pid_file: PathBuf) -> Self {
        Self { tmp_dir, pid_file }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if self.tmp_dir.exists() {
            if let Err(err) = std::fs::remove_dir_all(&self.tmp_dir) {
                warn!(path = %self.tmp_dir.display(), error = %err, "failed to remove tmp directory");
            }
        }
        if self.pid_file.exists() {
            if let Err(err) = std::fs::remove_file(&self.pid_file) {
                warn!(path = %self.pid_file.display(), error = %err, "failed to remove pid file");
            }
        }
    }
}

#[cfg(test)]
#[path = "exit_guard_tests.rs"]
mod tests;
