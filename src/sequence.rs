//! The ship sequence: message input, publish, then notify.
//!
//! Only a publish failure changes the exit status. A clean tree still goes on
//! to notify, and notify problems are printed and otherwise ignored.
use crate::config::Settings;
use crate::notify::{notify, DispatchTransport, NotifyOutcome};
use crate::publish::{publish, PublishOutcome, SourceControl};
use anyhow::Result;
use std::process::ExitCode;

/// Exit status after a failed stage, commit, or push.
pub const PUBLISH_FAILURE_EXIT: u8 = 1;

/// What one run did, for the caller and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    PublishFailed(String),
    Completed {
        publish: PublishOutcome,
        notify: Option<NotifyOutcome>,
    },
}

impl RunReport {
    pub fn exit_status(&self) -> u8 {
        match self {
            RunReport::PublishFailed(_) => PUBLISH_FAILURE_EXIT,
            RunReport::Completed { .. } => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// One-line description for the final log event.
    pub fn summary(&self) -> String {
        let (publish, notify) = match self {
            RunReport::PublishFailed(detail) => return format!("publish failed: {detail}"),
            RunReport::Completed { publish, notify } => (publish, notify),
        };
        let publish = match publish {
            PublishOutcome::NothingToCommit => "nothing to commit".to_string(),
            PublishOutcome::Pushed { commit_summary } => format!(
                "pushed {}",
                commit_summary.lines().next().unwrap_or_default().trim()
            ),
        };
        let notify = match notify {
            None => "notify skipped".to_string(),
            Some(NotifyOutcome::Triggered) => "workflow triggered".to_string(),
            Some(NotifyOutcome::MissingCredentials(missing)) => {
                format!("missing credentials: {}", missing.join(", "))
            }
            Some(NotifyOutcome::Rejected { status, body }) => {
                format!("workflow rejected ({status}): {}", body.trim())
            }
            Some(NotifyOutcome::TransportFailed(detail)) => format!("dispatch failed: {detail}"),
        };
        format!("{publish}; {notify}")
    }
}

/// Publish with the given message, then notify unless publish failed.
pub fn run_sequence(
    settings: &Settings,
    message: &str,
    vcs: &dyn SourceControl,
    transport: &dyn DispatchTransport,
) -> RunReport {
    let publish_outcome = match publish(vcs, message) {
        Ok(outcome) => outcome,
        Err(err) => {
            let detail = format!("{err:#}");
            eprintln!("Error executing Git commands: {detail}");
            tracing::debug!(error = %detail, "publish failed; skipping notify");
            return RunReport::PublishFailed(detail);
        }
    };

    let notify_outcome = if settings.skip_notify {
        tracing::info!("notify skipped by flag");
        None
    } else {
        Some(notify(&settings.env, &settings.target, transport))
    };

    RunReport::Completed {
        publish: publish_outcome,
        notify: notify_outcome,
    }
}

/// Obtain the message, then run the sequence against a source-control
/// adapter produced by `open_vcs`.
///
/// A missing `git` is reported like any other publish failure.
pub fn ship(
    settings: &Settings,
    obtain_message: impl FnOnce(&Settings) -> Result<String>,
    open_vcs: impl FnOnce(&Settings) -> Result<Box<dyn SourceControl>>,
    transport: &dyn DispatchTransport,
) -> Result<RunReport> {
    let message = obtain_message(settings)?;
    let vcs = match open_vcs(settings) {
        Ok(vcs) => vcs,
        Err(err) => {
            let detail = format!("{err:#}");
            eprintln!("Error executing Git commands: {detail}");
            return Ok(RunReport::PublishFailed(detail));
        }
    };
    Ok(run_sequence(settings, &message, vcs.as_ref(), transport))
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
