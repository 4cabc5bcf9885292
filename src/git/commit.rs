//! Commit traversal and blob retrieval

use std::path::Path;

use super::{git_command, git_show_blob};
use crate::error::Result;

/// Information about one commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Full sha
    pub sha: String,
    /// Short sha (7 chars)
    pub short_sha: String,
    /// First line of the message
    pub subject: String,
    /// Author name
    pub author: String,
    /// Author date (ISO format)
    pub date: String,
}

/// Commits newest-first, optionally restricted to one path, up to `limit`
pub fn commit_log(
    file_path: Option<&str>,
    limit: usize,
    cwd: Option<&Path>,
) -> Result<Vec<CommitInfo>> {
    // Format: SHA|short|subject|author|date
    let format = "--format=%H|%h|%s|%an|%aI";
    let count = format!("-{limit}");
    let mut args = vec!["log", format, count.as_str()];
    if let Some(path) = file_path {
        args.push("--follow");
        args.push("--");
        args.push(path);
    }
    let output = git_command(&args, cwd)?;

    let mut commits = Vec::new();
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.splitn(5, '|').collect();
        if parts.len() < 5 {
            continue;
        }
        commits.push(CommitInfo {
            sha: parts[0].to_string(),
            short_sha: parts[1].to_string(),
            subject: parts[2].to_string(),
            author: parts[3].to_string(),
            date: parts[4].to_string(),
        });
    }

    Ok(commits)
}

/// File content at a specific ref; None when it does not exist there
pub fn file_at_ref(file_path: &str, ref_name: &str, cwd: Option<&Path>) -> Option<String> {
    git_show_blob(ref_name, file_path, cwd)
}

/// Parent commit sha of the given commit
pub fn parent_commit(commit: &str, cwd: Option<&Path>) -> Result<String> {
    git_command(&["rev-parse", &format!("{commit}^")], cwd)
}
