//! CLI argument parsing for the ship workflow.
//!
//! Every flag defaults to the fixed deployment target, so a bare `shipit`
//! commits, pushes, and dispatches `deploy.yml` on `main`.
use clap::Parser;
use std::path::PathBuf;

/// Default history log, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "commit_message_history.txt";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "rajat-ll";
pub const DEFAULT_REPO: &str = "streamlit-snowflake-deploy";
pub const DEFAULT_WORKFLOW: &str = "deploy.yml";
pub const DEFAULT_REF: &str = "main";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "shipit",
    version,
    about = "Commit and push local changes, then trigger the deploy workflow",
    after_help = "Environment:\n  CI                 Skip the prompt and use COMMIT_MESSAGE (default \"Automated commit\")\n  COMMIT_MESSAGE     Commit message used in automated mode\n  SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER, SNOWFLAKE_PASSWORD, SNOWFLAKE_ROLE, GITHUB_TOKEN\n                     Required to trigger the workflow\n  SHIPIT_LOG         Log filter (e.g. shipit=debug)"
)]
pub struct RootArgs {
    /// Line-oriented log of past commit messages
    #[arg(long, value_name = "PATH", default_value = DEFAULT_HISTORY_FILE)]
    pub history_file: PathBuf,

    /// Working tree to commit and push
    #[arg(long, short = 'C', value_name = "DIR", default_value = ".")]
    pub repo_dir: PathBuf,

    /// Base URL of the workflow dispatch API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Owner of the repository hosting the workflow
    #[arg(long, default_value = DEFAULT_OWNER)]
    pub owner: String,

    /// Repository hosting the workflow
    #[arg(long, default_value = DEFAULT_REPO)]
    pub repo: String,

    /// Workflow file name to dispatch
    #[arg(long, value_name = "FILE", default_value = DEFAULT_WORKFLOW)]
    pub workflow: String,

    /// Git ref the workflow runs on
    #[arg(long = "ref", value_name = "REF", default_value = DEFAULT_REF)]
    pub git_ref: String,

    /// Commit and push only; do not trigger the workflow
    #[arg(long)]
    pub skip_notify: bool,

    /// Emit debug logs to stderr
    #[arg(long)]
    pub verbose: bool,
}
