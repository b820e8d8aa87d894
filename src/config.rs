//! Resolved run settings.
//!
//! Settings are built once from CLI args plus an environment lookup so the
//! rest of the crate never reads process state directly.
use crate::cli::RootArgs;
use crate::notify::DispatchTarget;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Marker set by CI systems; any non-empty value selects automated mode.
pub const AUTOMATED_ENV: &str = "CI";
/// Commit message used in automated mode.
pub const MESSAGE_OVERRIDE_ENV: &str = "COMMIT_MESSAGE";
/// Log filter for the tracing subscriber.
pub const LOG_ENV: &str = "SHIPIT_LOG";

/// Environment snapshot consulted by the input and notify steps.
///
/// Values are captured as-is; callers decide whether an empty value counts.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the variables this tool cares about from the process.
    pub fn from_process(keys: &[&str]) -> Self {
        let vars = keys
            .iter()
            .filter_map(|key| {
                std::env::var(key)
                    .ok()
                    .map(|value| (key.to_string(), value))
            })
            .collect();
        Self { vars }
    }

    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Like `get`, but treats an empty value as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

/// Everything a single run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub history_path: PathBuf,
    pub repo_dir: PathBuf,
    pub target: DispatchTarget,
    pub skip_notify: bool,
    pub env: EnvSnapshot,
}

impl Settings {
    pub fn resolve(args: &RootArgs, env: EnvSnapshot) -> Self {
        Self {
            history_path: args.history_file.clone(),
            repo_dir: args.repo_dir.clone(),
            target: DispatchTarget {
                api_base: args.api_base.trim_end_matches('/').to_string(),
                owner: args.owner.clone(),
                repo: args.repo.clone(),
                workflow: args.workflow.clone(),
                git_ref: args.git_ref.clone(),
            },
            skip_notify: args.skip_notify,
            env,
        }
    }

    /// True when the automated-environment marker is present.
    pub fn automated(&self) -> bool {
        self.env.get_non_empty(AUTOMATED_ENV).is_some()
    }
}

/// Every environment variable the tool reads.
pub fn watched_env_keys() -> Vec<&'static str> {
    let mut keys = vec![AUTOMATED_ENV, MESSAGE_OVERRIDE_ENV];
    keys.extend(crate::notify::CREDENTIAL_VARS);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn resolve_trims_trailing_slash_from_api_base() {
        let args = RootArgs::try_parse_from(["shipit", "--api-base", "http://localhost:8080/"])
            .expect("parse");
        let settings = Settings::resolve(&args, EnvSnapshot::default());
        assert_eq!(settings.target.api_base, "http://localhost:8080");
        assert_eq!(settings.target.git_ref, "main");
    }

    #[test]
    fn empty_ci_value_is_interactive() {
        let args = RootArgs::try_parse_from(["shipit"]).expect("parse");
        let settings = Settings::resolve(&args, EnvSnapshot::from_pairs([("CI", "")]));
        assert!(!settings.automated());

        let settings = Settings::resolve(&args, EnvSnapshot::from_pairs([("CI", "true")]));
        assert!(settings.automated());
    }

    #[test]
    fn watched_keys_include_credentials() {
        let keys = watched_env_keys();
        assert!(keys.contains(&"GITHUB_TOKEN"));
        assert!(keys.contains(&"COMMIT_MESSAGE"));
        assert_eq!(keys.len(), 7);
    }
}
