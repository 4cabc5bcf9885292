//! Git bridge
//!
//! The sole point where the engine touches the outside world. Uses subprocess
//! calls to `git` for maximum compatibility; everything the core consumes
//! (changed-file lists, blob contents, commit metadata) flows through here.

mod branch;
mod commit;
mod diff;

pub use branch::{current_branch, head_sha, is_git_repo, repo_root};
pub use commit::{commit_log, file_at_ref, parent_commit, CommitInfo};
pub use diff::{detect_scope, get_changed_files, DiffScope, FileChange, FileStatus};

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Result, SemError};

/// Spawn git with the given arguments and wait for it to finish
fn spawn_git(args: &[&str], cwd: Option<&Path>) -> Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.output().map_err(|e| SemError::Git {
        message: format!("failed to spawn git: {e}"),
    })
}

/// Run a git command and return trimmed stdout. A non-zero exit becomes an
/// error carrying the command line, exit status, and whatever git printed to
/// stderr.
pub fn git_command(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let output = spawn_git(args, cwd)?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let command_line = format!("git {}", args.join(" "));
    let detail = String::from_utf8_lossy(&output.stderr);
    let message = match output.status.code() {
        Some(code) => format!("`{command_line}` exited with status {code}: {}", detail.trim()),
        None => format!("`{command_line}` was terminated by a signal"),
    };
    Err(SemError::Git { message })
}

/// Run a git command, swallowing failure (for optional queries)
pub fn git_command_optional(args: &[&str], cwd: Option<&Path>) -> Option<String> {
    git_command(args, cwd).ok()
}

/// Read a blob verbatim (`git show ref:path`): lossy UTF-8, never trimmed, so
/// file contents survive exactly. Returns None when the path does not exist
/// at that ref.
pub fn git_show_blob(refspec: &str, file_path: &str, cwd: Option<&Path>) -> Option<String> {
    let spec = format!("{refspec}:{file_path}");
    let output = spawn_git(&["show", &spec], cwd).ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
