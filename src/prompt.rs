//! Commit message input.
//!
//! In automated environments the message comes from `COMMIT_MESSAGE`; otherwise
//! the operator is prompted with history-backed completion and ghost text.
mod helper;
mod history;

pub use helper::CommitHelper;
pub use history::{append_entry, InputHistory};

use crate::config::{EnvSnapshot, Settings, MESSAGE_OVERRIDE_ENV};
use anyhow::{anyhow, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::MemHistory;
use rustyline::{CompletionType, Config, Editor};
use std::path::{Path, PathBuf};

pub const PROMPT_TEXT: &str = "Enter commit message: ";
/// Message used in automated mode when no override is set.
pub const AUTOMATED_MESSAGE: &str = "Automated commit";

/// Message for automated mode. An override that is set but empty is used
/// verbatim.
pub fn automated_message(env: &EnvSnapshot) -> String {
    env.get(MESSAGE_OVERRIDE_ENV)
        .unwrap_or(AUTOMATED_MESSAGE)
        .to_string()
}

/// Interactive prompt owning the line editor and the history log it feeds.
pub struct PromptSession {
    editor: Editor<CommitHelper, MemHistory>,
    history_path: PathBuf,
}

impl PromptSession {
    /// Load the history log and prepare an editor around it.
    pub fn open(history_path: &Path) -> Result<Self> {
        let history = InputHistory::load(history_path)?;
        let config = Config::builder()
            .completion_type(CompletionType::Circular)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_history(config, MemHistory::new())
            .context("initialize line editor")?;
        for entry in history.entries() {
            editor
                .add_history_entry(entry.as_str())
                .context("seed editor history")?;
        }
        tracing::debug!(
            path = %history_path.display(),
            entries = history.entries().len(),
            "history loaded"
        );
        editor.set_helper(Some(CommitHelper::new(history)));
        Ok(Self {
            editor,
            history_path: history_path.to_path_buf(),
        })
    }

    /// Prompt once and record the submitted line.
    ///
    /// Ctrl-C and Ctrl-D abort with an error; blank input is returned but not
    /// recorded.
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        let line = match self.editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                return Err(anyhow!("commit message prompt interrupted"))
            }
            Err(ReadlineError::Eof) => return Err(anyhow!("commit message prompt closed")),
            Err(err) => return Err(err).context("read commit message"),
        };
        self.record_submission(&line)?;
        Ok(line)
    }

    /// Persist a submitted line and make it available to suggestions and
    /// recall. Blank lines are ignored. Returns whether the line was recorded.
    pub fn record_submission(&mut self, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(false);
        }
        append_entry(&self.history_path, line)?;
        self.editor
            .add_history_entry(line)
            .context("record editor history")?;
        if let Some(helper) = self.editor.helper_mut() {
            helper.record(line);
        }
        Ok(true)
    }

    #[cfg(test)]
    fn completions(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        self.editor
            .helper()
            .map(|helper| helper.candidates(line, pos))
            .unwrap_or((pos, Vec::new()))
    }
}

/// Obtain the commit message for this run.
pub fn obtain_commit_message(settings: &Settings) -> Result<String> {
    if settings.automated() {
        let message = automated_message(&settings.env);
        tracing::info!(commit_message = %message, "automated environment; skipping prompt");
        return Ok(message);
    }
    let mut session = PromptSession::open(&settings.history_path)?;
    session.read_line(PROMPT_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RootArgs;
    use clap::Parser;
    use std::ffi::OsString;

    #[test]
    fn automated_without_override_uses_placeholder() {
        let env = EnvSnapshot::from_pairs([("CI", "1")]);
        assert_eq!(automated_message(&env), "Automated commit");
    }

    #[test]
    fn automated_uses_override_when_set() {
        let env = EnvSnapshot::from_pairs([("CI", "1"), ("COMMIT_MESSAGE", "release 1.2")]);
        assert_eq!(automated_message(&env), "release 1.2");
    }

    #[test]
    fn submission_is_appended_and_ranked_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history_path = dir.path().join("history.txt");
        std::fs::write(&history_path, "fix bug\nfix typo\n").expect("seed history");
        let mut session = PromptSession::open(&history_path).expect("open");

        assert!(session.record_submission("fix tests").expect("record"));

        let text = std::fs::read_to_string(&history_path).expect("read");
        assert_eq!(text, "fix bug\nfix typo\nfix tests\n");
        assert_eq!(
            session.completions("fix", 3),
            (
                0,
                vec![
                    "fix tests".to_string(),
                    "fix typo".to_string(),
                    "fix bug".to_string()
                ]
            )
        );
    }

    #[test]
    fn blank_submission_is_not_recorded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history_path = dir.path().join("history.txt");
        let mut session = PromptSession::open(&history_path).expect("open");

        assert!(!session.record_submission("   ").expect("record"));
        assert!(!session.record_submission("").expect("record"));

        assert!(!history_path.exists());
        assert!(session.completions("", 0).1.is_empty());
    }

    #[test]
    fn automated_mode_never_touches_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let history_path = dir.path().join("history.txt");
        let argv: Vec<OsString> = vec![
            "shipit".into(),
            "--history-file".into(),
            history_path.clone().into_os_string(),
        ];
        let args = RootArgs::try_parse_from(argv).expect("parse");
        let settings = Settings::resolve(&args, EnvSnapshot::from_pairs([("CI", "true")]));

        let message = obtain_commit_message(&settings).expect("message");
        assert_eq!(message, AUTOMATED_MESSAGE);
        assert!(!history_path.exists());
    }
}
