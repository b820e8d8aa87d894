//! Publish step: detect changes, stage and commit them, then push.
//!
//! A failing stage, commit, or push aborts the step with an error; the caller
//! turns that into a non-zero exit. A clean working tree, or one whose status
//! cannot be queried, is a successful no-op.
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source-control operations the publish step needs.
pub trait SourceControl {
    /// Machine-readable pending changes; blank when the tree is clean.
    fn pending_changes(&self) -> Result<String>;
    fn stage_all(&self) -> Result<()>;
    /// Create a commit and return the tool's summary output.
    fn commit(&self, message: &str) -> Result<String>;
    fn push(&self) -> Result<()>;
}

/// How the publish step ended when nothing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    NothingToCommit,
    Pushed { commit_summary: String },
}

/// Run CheckForChanges, StageAndCommit, and Push in order.
///
/// A failed change query (e.g. outside a repository) reads as a clean tree.
pub fn publish(vcs: &dyn SourceControl, message: &str) -> Result<PublishOutcome> {
    let pending = match vcs.pending_changes() {
        Ok(pending) => pending,
        Err(err) => {
            tracing::warn!(
                error = %format!("{err:#}"),
                "change query failed; treating tree as clean"
            );
            String::new()
        }
    };
    if pending.trim().is_empty() {
        println!("No changes to commit.");
        tracing::info!("working tree clean; nothing to publish");
        return Ok(PublishOutcome::NothingToCommit);
    }
    tracing::debug!(changed = pending.lines().count(), "pending changes detected");

    if message.trim().is_empty() {
        return Err(anyhow!("commit message is empty"));
    }

    vcs.stage_all()?;
    let commit_summary = vcs.commit(message)?;
    if !commit_summary.trim().is_empty() {
        println!("{}", commit_summary.trim_end());
    }
    vcs.push()?;
    println!("Git push successful.");
    Ok(PublishOutcome::Pushed { commit_summary })
}

/// `git` CLI adapter for a working tree.
pub struct GitCli {
    git: PathBuf,
    work_dir: PathBuf,
}

impl GitCli {
    /// Locate `git` on PATH for the given working tree.
    pub fn locate(work_dir: &Path) -> Result<Self> {
        let git = which::which("git").context("locate git executable on PATH")?;
        tracing::debug!(git = %git.display(), work_dir = %work_dir.display(), "using git");
        Ok(Self {
            git,
            work_dir: work_dir.to_path_buf(),
        })
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.args(args).current_dir(&self.work_dir);
        cmd
    }

    /// Run with captured output; non-zero exit is an error carrying stderr.
    fn capture(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command(args)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(anyhow!(
                "git {} failed with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                detail
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run with inherited stdio so progress reaches the operator.
    fn stream(&self, args: &[&str]) -> Result<()> {
        let status = self
            .command(args)
            .status()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !status.success() {
            return Err(anyhow!("git {} failed with {}", args.join(" "), status));
        }
        Ok(())
    }
}

impl SourceControl for GitCli {
    fn pending_changes(&self) -> Result<String> {
        self.capture(&["status", "--porcelain"])
    }

    fn stage_all(&self) -> Result<()> {
        self.stream(&["add", "."])
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.capture(&["commit", "-m", message])
    }

    fn push(&self) -> Result<()> {
        self.stream(&["push"])
    }
}
