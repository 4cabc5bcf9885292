//! Repository and branch queries

use std::path::Path;

use super::{git_command, git_command_optional};
use crate::error::Result;

/// Check whether the directory is inside a git work tree
pub fn is_git_repo(cwd: Option<&Path>) -> bool {
    git_command_optional(&["rev-parse", "--is-inside-work-tree"], cwd)
        .map(|s| s == "true")
        .unwrap_or(false)
}

/// Repository root directory
pub fn repo_root(cwd: Option<&Path>) -> Result<String> {
    git_command(&["rev-parse", "--show-toplevel"], cwd)
}

/// Current branch name
pub fn current_branch(cwd: Option<&Path>) -> Result<String> {
    git_command(&["rev-parse", "--abbrev-ref", "HEAD"], cwd)
}

/// Full sha of HEAD
pub fn head_sha(cwd: Option<&Path>) -> Result<String> {
    git_command(&["rev-parse", "HEAD"], cwd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_git_repo_does_not_panic() {
        // Runs wherever the tests run; only the boolean contract matters
        let _ = is_git_repo(None);
    }
}
