//! Changed-file discovery and content population
//!
//! Produces `FileChange` records with before/after contents materialised up
//! front, so the parse/match pass downstream never blocks on git again.

use std::fs;
use std::path::Path;

use super::{git_command, git_command_optional, git_show_blob};
use crate::error::{Result, SemError};

/// Axis along which a diff is taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffScope {
    /// HEAD vs worktree (plus untracked files)
    Working,
    /// HEAD vs index
    Staged,
    /// Parent vs commit
    Commit { sha: String },
    /// From vs to
    Range { from: String, to: String },
}

/// Status of one changed path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Parse from the git name-status letter
    fn from_status_char(c: char) -> Option<Self> {
        match c {
            'A' | 'C' => Some(Self::Added),
            'M' | 'T' => Some(Self::Modified),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

/// Before/after pair for one path
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Path relative to the repository root
    pub file_path: String,
    pub status: FileStatus,
    /// Original path when renamed
    pub old_file_path: Option<String>,
    pub before_content: Option<String>,
    pub after_content: Option<String>,
}

/// Engine state directory; its contents never show up in diffs
const STATE_DIR_PREFIX: &str = ".sem/";

/// Decide what to diff: staged changes win, then working-tree changes, then
/// the HEAD commit
pub fn detect_scope(cwd: Option<&Path>) -> Result<DiffScope> {
    if !super::is_git_repo(cwd) {
        return Err(SemError::NotARepo);
    }

    let staged = git_command_optional(&["diff", "--cached", "--name-status", "-M"], cwd)
        .unwrap_or_default();
    if !staged.trim().is_empty() {
        return Ok(DiffScope::Staged);
    }

    let working =
        git_command_optional(&["diff", "HEAD", "--name-status", "-M"], cwd).unwrap_or_default();
    let untracked =
        git_command_optional(&["ls-files", "--others", "--exclude-standard"], cwd)
            .unwrap_or_default();
    if !working.trim().is_empty() || !untracked.trim().is_empty() {
        return Ok(DiffScope::Working);
    }

    match super::head_sha(cwd) {
        Ok(sha) => Ok(DiffScope::Commit { sha }),
        Err(_) => Ok(DiffScope::Working),
    }
}

/// List changed files for a scope with contents populated
pub fn get_changed_files(scope: &DiffScope, cwd: Option<&Path>) -> Result<Vec<FileChange>> {
    let mut files = match scope {
        DiffScope::Working => {
            let mut files = git_command_optional(&["diff", "HEAD", "--name-status", "-M"], cwd)
                .map(|out| parse_name_status(&out))
                .transpose()?
                .unwrap_or_default();
            files.extend(untracked_files(cwd)?);
            files
        }
        DiffScope::Staged => {
            let out = git_command(&["diff", "--cached", "--name-status", "-M"], cwd)?;
            parse_name_status(&out)?
        }
        DiffScope::Commit { sha } => {
            let out = git_command(
                &[
                    "diff-tree",
                    "--no-commit-id",
                    "--name-status",
                    "-r",
                    "-M",
                    "--root",
                    sha,
                ],
                cwd,
            )?;
            parse_name_status(&out)?
        }
        DiffScope::Range { from, to } => {
            let out = git_command(&["diff", "--name-status", "-M", from, to], cwd)?;
            parse_name_status(&out)?
        }
    };

    files.retain(|f| !f.file_path.starts_with(STATE_DIR_PREFIX));
    populate_contents(&mut files, scope, cwd)?;
    Ok(files)
}

/// Untracked paths surface as added files
fn untracked_files(cwd: Option<&Path>) -> Result<Vec<FileChange>> {
    let output = git_command_optional(&["ls-files", "--others", "--exclude-standard"], cwd)
        .unwrap_or_default();
    Ok(output
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with(STATE_DIR_PREFIX))
        .map(|path| FileChange {
            file_path: path.to_string(),
            status: FileStatus::Added,
            old_file_path: None,
            before_content: None,
            after_content: None,
        })
        .collect())
}

/// Parse `git diff --name-status` output
fn parse_name_status(output: &str) -> Result<Vec<FileChange>> {
    let mut files = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.is_empty() {
            continue;
        }

        let status_field = parts[0];
        let status = match status_field.chars().next().and_then(FileStatus::from_status_char) {
            Some(s) => s,
            None => continue,
        };

        let (file_path, old_file_path) = match status {
            FileStatus::Renamed if parts.len() >= 3 => {
                (parts[2].to_string(), Some(parts[1].to_string()))
            }
            _ if parts.len() >= 2 => (parts[1].to_string(), None),
            _ => {
                return Err(SemError::Git {
                    message: format!("Invalid diff output line: {line}"),
                })
            }
        };

        files.push(FileChange {
            file_path,
            status,
            old_file_path,
            before_content: None,
            after_content: None,
        });
    }

    Ok(files)
}

/// Fill before/after contents per scope so downstream parsing never touches
/// git again
fn populate_contents(
    files: &mut [FileChange],
    scope: &DiffScope,
    cwd: Option<&Path>,
) -> Result<()> {
    match scope {
        DiffScope::Working => {
            for file in files.iter_mut() {
                if file.status != FileStatus::Deleted {
                    file.after_content = read_worktree_file(&file.file_path, cwd);
                }
                if file.status != FileStatus::Added {
                    let before_path = file.old_file_path.as_deref().unwrap_or(&file.file_path);
                    file.before_content = git_show_blob("HEAD", before_path, cwd);
                }
            }
        }
        DiffScope::Staged => {
            for file in files.iter_mut() {
                if file.status != FileStatus::Deleted {
                    // Empty refspec reads from the index
                    file.after_content = git_show_blob("", &file.file_path, cwd)
                        .or_else(|| read_worktree_file(&file.file_path, cwd));
                }
                if file.status != FileStatus::Added {
                    let before_path = file.old_file_path.as_deref().unwrap_or(&file.file_path);
                    file.before_content = git_show_blob("HEAD", before_path, cwd);
                }
            }
        }
        DiffScope::Commit { sha } => {
            let parent = format!("{sha}^");
            for file in files.iter_mut() {
                if file.status != FileStatus::Deleted {
                    file.after_content = git_show_blob(sha, &file.file_path, cwd);
                }
                if file.status != FileStatus::Added {
                    let before_path = file.old_file_path.as_deref().unwrap_or(&file.file_path);
                    file.before_content = git_show_blob(&parent, before_path, cwd);
                }
            }
        }
        DiffScope::Range { from, to } => {
            for file in files.iter_mut() {
                if file.status != FileStatus::Deleted {
                    file.after_content = git_show_blob(to, &file.file_path, cwd);
                }
                if file.status != FileStatus::Added {
                    let before_path = file.old_file_path.as_deref().unwrap_or(&file.file_path);
                    file.before_content = git_show_blob(from, before_path, cwd);
                }
            }
        }
    }
    Ok(())
}

/// Lossy read from the worktree; binary files become diffable text
fn read_worktree_file(file_path: &str, cwd: Option<&Path>) -> Option<String> {
    let full = match cwd {
        Some(dir) => dir.join(file_path),
        None => Path::new(file_path).to_path_buf(),
    };
    fs::read(full)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
