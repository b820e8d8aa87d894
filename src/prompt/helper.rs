//! Line-editor helper wiring history suggestions into rustyline.
use super::history::InputHistory;
use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// Dim ghost text for auto-suggestions.
const HINT_STYLE_START: &str = "\x1b[2m";
const HINT_STYLE_END: &str = "\x1b[0m";

/// Completion and ghost-text source backed by the commit message history.
pub struct CommitHelper {
    history: InputHistory,
}

impl CommitHelper {
    pub fn new(history: InputHistory) -> Self {
        Self { history }
    }

    pub fn record(&mut self, entry: &str) {
        self.history.push(entry);
    }

    /// Candidates replace the whole text before the cursor.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let typed = &line[..pos];
        let candidates = self
            .history
            .suggestions(typed)
            .into_iter()
            .map(str::to_string)
            .collect();
        (0, candidates)
    }

    /// Ghost text is only offered with the cursor at end of line.
    pub fn suggestion(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.history.hint(line).map(str::to_string)
    }
}

impl Completer for CommitHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for CommitHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        self.suggestion(line, pos)
    }
}

impl Highlighter for CommitHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("{HINT_STYLE_START}{hint}{HINT_STYLE_END}"))
    }
}

impl Validator for CommitHelper {}

impl Helper for CommitHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommitHelper {
        CommitHelper::new(InputHistory::from_entries([
            "fix bug",
            "fix typo",
            "feat: add x",
            "fix bug",
        ]))
    }

    #[test]
    fn candidates_use_text_before_cursor() {
        let helper = helper();
        let (start, candidates) = helper.candidates("fix trailing", 3);
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["fix bug", "fix typo"]);
    }

    #[test]
    fn cycling_candidates_replace_whole_line_in_recency_order() {
        let helper = CommitHelper::new(InputHistory::from_entries(["fix bug", "fix typo"]));
        let (start, candidates) = helper.candidates("fix", 3);
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["fix typo", "fix bug"]);

        let (start, candidates) = helper.candidates("fix t", 5);
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["fix typo"]);
    }

    #[test]
    fn suggestion_requires_cursor_at_end() {
        let helper = helper();
        assert_eq!(helper.suggestion("feat", 4).as_deref(), Some(": add x"));
        assert_eq!(helper.suggestion("feat", 2), None);
    }

    #[test]
    fn recorded_entries_rank_first() {
        let mut helper = helper();
        helper.record("fix tests");
        assert_eq!(helper.suggestion("fix", 3).as_deref(), Some(" tests"));
        assert_eq!(helper.candidates("fix", 3).1[0], "fix tests");
    }
}
