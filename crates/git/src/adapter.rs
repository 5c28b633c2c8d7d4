// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GitAdapter`: porcelain over one repository (spec §4.A).

use crate::error::GitError;
use crate::trailers::pipeline_commit_message;
use crate::worktree::{parse_worktree_list, Worktree, WorktreeSpec};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// Default timeout for git worktree operations, matching the teacher's
/// `GIT_WORKTREE_TIMEOUT` (`oj-adapters::subprocess`).
const WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);
/// Default timeout for plain porcelain commands (status, log, commit).
const PORCELAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper over the system `git` binary, scoped to one repository root.
/// Owns no mutable in-memory state (spec §3 Ownership).
#[derive(Debug, Clone)]
pub struct GitAdapter {
    repo_root: PathBuf,
}

impl GitAdapter {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn command(&self, cwd: Option<&Path>) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(cwd.unwrap_or(&self.repo_root));
        cmd
    }

    async fn run(
        &self,
        op: &str,
        cwd: Option<&Path>,
        args: &[&str],
        timeout: Duration,
    ) -> Result<String, GitError> {
        let mut cmd = self.command(cwd);
        cmd.args(args);
        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(GitError::Io {
                    op: op.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(GitError::Timeout {
                    op: op.to_string(),
                    secs: timeout.as_secs(),
                })
            }
        };
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                op: op.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Like `run`, but returns the raw stderr+exit status instead of erroring,
    /// for callers that need to inspect failure message patterns (e.g. the
    /// `changedFiles` orphan-commit fallback).
    async fn run_allow_failure(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        timeout: Duration,
    ) -> (bool, String, String) {
        let mut cmd = self.command(cwd);
        cmd.args(args);
        match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => (
                output.status.success(),
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Ok(Err(e)) => (false, String::new(), e.to_string()),
            Err(_) => (false, String::new(), "timed out".to_string()),
        }
    }

    /// `currentCommit() -> sha|""`.
    pub async fn current_commit(&self) -> Result<String, GitError> {
        match self
            .run("rev-parse HEAD", None, &["rev-parse", "HEAD"], PORCELAIN_TIMEOUT)
            .await
        {
            Ok(sha) => Ok(sha),
            Err(GitError::CommandFailed { .. }) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// `changedFiles(sha) -> [path]`. Falls back to `ls-tree -r sha` when the
    /// diff against the parent fails because `sha` is the root commit,
    /// detected by message patterns `ambiguous argument` / `unknown
    /// revision` (spec §4.A, §8 invariant 5).
    pub async fn changed_files(&self, sha: &str) -> Result<Vec<String>, GitError> {
        let parent_ref = format!("{sha}^");
        let (ok, stdout, stderr) = self
            .run_allow_failure(
                None,
                &["diff", "--name-only", &parent_ref, sha],
                PORCELAIN_TIMEOUT,
            )
            .await;
        if ok {
            return Ok(split_nonempty_lines(&stdout));
        }
        if stderr.contains("ambiguous argument") || stderr.contains("unknown revision") {
            let listing = self
                .run("ls-tree -r", None, &["ls-tree", "-r", "--name-only", sha], PORCELAIN_TIMEOUT)
                .await?;
            return Ok(split_nonempty_lines(&listing));
        }
        Err(GitError::CommandFailed {
            op: "diff --name-only".to_string(),
            stderr,
        })
    }

    /// `hasUncommittedChanges() -> bool`.
    pub async fn has_uncommitted_changes(&self) -> Result<bool, GitError> {
        let status = self
            .run("status --porcelain", None, &["status", "--porcelain"], PORCELAIN_TIMEOUT)
            .await?;
        Ok(!status.is_empty())
    }

    /// `stageAll()`.
    pub async fn stage_all(&self) -> Result<(), GitError> {
        self.run("add -A", None, &["add", "-A"], PORCELAIN_TIMEOUT).await?;
        Ok(())
    }

    /// `commitWithTrailers(msg, trailers) -> sha`. Trailers are appended as
    /// `\n\n` + `Key: value` lines. Uses `--no-verify` so pipeline commits
    /// never trip the repository's own hooks (an equivalent `--no-verify`
    /// semantic, spec §4.A).
    pub async fn commit_with_trailers(
        &self,
        message: &str,
        trailers: &HashMap<String, String>,
    ) -> Result<String, GitError> {
        let mut full = message.to_string();
        if !trailers.is_empty() {
            full.push_str("\n\n");
            let mut lines: Vec<String> = trailers.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            lines.sort();
            full.push_str(&lines.join("\n"));
        }
        self.run(
            "commit",
            None,
            &["commit", "--no-verify", "-m", &full],
            PORCELAIN_TIMEOUT,
        )
        .await?;
        self.current_commit().await
    }

    /// `pipelineCommit(stage, runId, customMsg?, prefix?) -> sha|""`.
    /// Returns `""` when there is nothing to stage (spec §8 invariant 4).
    pub async fn pipeline_commit(
        &self,
        stage: &str,
        run_id: &str,
        custom_message: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<String, GitError> {
        self.stage_all().await?;
        if !self.has_uncommitted_changes().await? {
            return Ok(String::new());
        }
        let prefix = prefix.unwrap_or("[pipeline:{{stage}}]");
        let message = pipeline_commit_message(stage, run_id, custom_message, prefix);
        self.run(
            "commit",
            None,
            &["commit", "--no-verify", "-m", &message],
            PORCELAIN_TIMEOUT,
        )
        .await?;
        self.current_commit().await
    }

    /// `revertToCommit(sha)`: hard reset.
    pub async fn revert_to_commit(&self, sha: &str) -> Result<(), GitError> {
        self.run("reset --hard", None, &["reset", "--hard", sha], PORCELAIN_TIMEOUT)
            .await?;
        Ok(())
    }

    /// `getCommitMessage(sha)`.
    pub async fn get_commit_message(&self, sha: &str) -> Result<String, GitError> {
        self.run(
            "log -1 --format=%B",
            None,
            &["log", "-1", "--format=%B", sha],
            PORCELAIN_TIMEOUT,
        )
        .await
    }

    pub async fn current_branch(&self) -> Result<String, GitError> {
        self.run(
            "rev-parse --abbrev-ref HEAD",
            None,
            &["rev-parse", "--abbrev-ref", "HEAD"],
            PORCELAIN_TIMEOUT,
        )
        .await
    }

    /// Check out an existing local branch in the main working tree.
    pub async fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run("checkout", None, &["checkout", branch], PORCELAIN_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Push a branch to `origin`, creating the upstream if it doesn't
    /// exist yet (spec §4.I Finalize: "if a pipeline branch was created,
    /// push it").
    pub async fn push_branch(&self, branch: &str) -> Result<(), GitError> {
        self.run(
            "push",
            None,
            &["push", "--no-verify", "-u", "origin", branch],
            WORKTREE_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    /// `listWorktrees()`.
    pub async fn list_worktrees(&self) -> Result<Vec<Worktree>, GitError> {
        let output = self
            .run(
                "worktree list --porcelain",
                None,
                &["worktree", "list", "--porcelain"],
                WORKTREE_TIMEOUT,
            )
            .await?;
        Ok(parse_worktree_list(&output))
    }

    /// `createWorktree(path, branch, base?)` (spec §4.A):
    /// 1. Fail if `branch` is already checked out elsewhere.
    /// 2. Try `worktree add -b branch path origin/base`.
    /// 3. Fall back to `worktree add -b branch path base`.
    /// 4. If `base`'s attempt created the branch but the add itself failed
    ///    for a non-branch-exists reason, detect the branch now exists and
    ///    retry as `worktree add path branch`.
    pub async fn create_worktree(&self, spec: WorktreeSpec) -> Result<String, GitError> {
        let existing = self.list_worktrees().await?;
        if let Some(found) = existing.iter().find(|w| w.branch.as_deref() == Some(spec.branch.as_str())) {
            return Err(GitError::BranchInUse {
                branch: spec.branch.clone(),
                path: found.path.display().to_string(),
            });
        }

        let path_str = spec.path.display().to_string();
        let base = spec.base.as_deref().unwrap_or("HEAD");
        let origin_base = format!("origin/{base}");

        let (ok, _out, stderr) = self
            .run_allow_failure(
                None,
                &["worktree", "add", "-b", &spec.branch, &path_str, &origin_base],
                WORKTREE_TIMEOUT,
            )
            .await;
        if ok {
            return Ok(spec.branch);
        }

        let (ok2, _out2, stderr2) = self
            .run_allow_failure(
                None,
                &["worktree", "add", "-b", &spec.branch, &path_str, base],
                WORKTREE_TIMEOUT,
            )
            .await;
        if ok2 {
            return Ok(spec.branch);
        }

        // The `-b` add may have created the branch object even though the
        // worktree add failed for an unrelated reason (e.g. path exists).
        // If so, retry without `-b`, pointing the new worktree at the branch
        // that now exists.
        let branch_exists = self
            .run_allow_failure(None, &["rev-parse", "--verify", &spec.branch], PORCELAIN_TIMEOUT)
            .await
            .0;
        if branch_exists {
            let (ok3, _out3, stderr3) = self
                .run_allow_failure(None, &["worktree", "add", &path_str, &spec.branch], WORKTREE_TIMEOUT)
                .await;
            if ok3 {
                return Ok(spec.branch);
            }
            return Err(GitError::CommandFailed {
                op: "worktree add (retry)".to_string(),
                stderr: stderr3,
            });
        }

        warn!(branch = %spec.branch, %stderr, %stderr2, "worktree add failed against both origin and local base");
        Err(GitError::CommandFailed {
            op: "worktree add".to_string(),
            stderr: stderr2,
        })
    }

    /// `removeWorktree(path, force?)`.
    pub async fn remove_worktree(&self, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.display().to_string();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        self.run("worktree remove", None, &args, WORKTREE_TIMEOUT).await?;
        Ok(())
    }

    /// `pruneWorktrees()`.
    pub async fn prune_worktrees(&self) -> Result<(), GitError> {
        self.run("worktree prune", None, &["worktree", "prune"], WORKTREE_TIMEOUT)
            .await?;
        Ok(())
    }
}

fn split_nonempty_lines(s: &str) -> Vec<String> {
    s.lines().map(|l| l.trim()).filter(|l| !l.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
