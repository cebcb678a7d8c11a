use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hackernews::Feed;
use crate::shortcuts::{ShortcutAlphabet, DEFAULT_SHORTCUTS};

const DEFAULT_ENV_PREFIX: &str = "DAILY_HN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default)]
    pub feed: Feed,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_score: u64,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            feed: Feed::default(),
            limit: default_limit(),
            min_score: 0,
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            file: None,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_SHORTCUTS.chars().count()
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_user_agent() -> String {
    format!(
        "daily-hn/{} (+https://github.com/Rolv-Apneseth/daily-hn)",
        crate::VERSION
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_shortcuts")]
    pub shortcuts: String,
    #[serde(default)]
    pub browser_command: Vec<String>,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            shortcuts: default_shortcuts(),
            browser_command: Vec::new(),
        }
    }
}

fn default_title() -> String {
    "Daily Dose of HN".into()
}

fn default_shortcuts() -> String {
    DEFAULT_SHORTCUTS.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn shortcut_alphabet(&self) -> Result<ShortcutAlphabet> {
        ShortcutAlphabet::new(&self.ui.shortcuts).context("config: invalid ui.shortcuts")
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

/// Defaults, then the YAML file, then `DAILY_HN_<SECTION>__<KEY>` variables.
pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    let path = options.config_file.or_else(default_config_path);
    if let Some(path) = path {
        if path.exists() {
            cfg = read_config_file(&path)?;
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix);

    cfg.shortcut_alphabet()?;
    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn apply_env(cfg: &mut Config, prefix: &str) {
    let upper_prefix = format!("{}_", prefix.to_uppercase());
    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            apply_env_value(cfg, &normalized, value);
        }
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "source.feed" => {
            if let Some(feed) = Feed::from_key(&value) {
                cfg.source.feed = feed;
            }
        }
        "source.limit" => {
            if let Ok(parsed) = value.parse::<usize>() {
                cfg.source.limit = parsed;
            }
        }
        "source.min_score" => {
            if let Ok(parsed) = value.parse::<u64>() {
                cfg.source.min_score = parsed;
            }
        }
        "source.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.source.timeout = duration;
            }
        }
        "source.user_agent" => cfg.source.user_agent = value,
        "source.file" => {
            cfg.source.file = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        "ui.title" => cfg.ui.title = value,
        "ui.shortcuts" => cfg.ui.shortcuts = value,
        "ui.browser_command" => {
            cfg.ui.browser_command = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "log.file" => {
            cfg.log.file = (!value.trim().is_empty()).then(|| PathBuf::from(value));
        }
        _ => {}
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("daily-hn").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    fn isolated(path: PathBuf, prefix: &str) -> LoadOptions {
        LoadOptions {
            config_file: Some(path),
            env_prefix: Some(prefix.into()),
        }
    }

    #[test]
    fn load_defaults_without_files() {
        let dir = tempdir().unwrap();
        let cfg = load(isolated(dir.path().join("missing.yaml"), "DAILY_HN_TEST_NONE")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.ui.title, "Daily Dose of HN");
        assert_eq!(cfg.source.limit, 30);
        assert_eq!(cfg.source.feed, Feed::Best);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "source:\n  feed: top\n  min_score: 100\n  timeout: 5s\nui:\n  browser_command: [firefox, \"%URL%\"]\n",
        )
        .unwrap();
        let cfg = load(isolated(path, "DAILY_HN_TEST_FILE")).unwrap();
        assert_eq!(cfg.source.feed, Feed::Top);
        assert_eq!(cfg.source.min_score, 100);
        assert_eq!(cfg.source.timeout, Duration::from_secs(5));
        assert_eq!(cfg.source.limit, 30);
        assert_eq!(cfg.ui.browser_command, ["firefox", "%URL%"]);
    }

    #[test]
    fn env_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "source:\n  limit: 10\n").unwrap();

        env::set_var("DAILY_HN_TEST_ENV_SOURCE__MIN_SCORE", "250");
        env::set_var("DAILY_HN_TEST_ENV_UI__TITLE", "Morning HN");
        let cfg = load(isolated(path, "DAILY_HN_TEST_ENV")).unwrap();
        env::remove_var("DAILY_HN_TEST_ENV_SOURCE__MIN_SCORE");
        env::remove_var("DAILY_HN_TEST_ENV_UI__TITLE");

        assert_eq!(cfg.source.limit, 10);
        assert_eq!(cfg.source.min_score, 250);
        assert_eq!(cfg.ui.title, "Morning HN");
    }

    #[test]
    fn invalid_shortcuts_fail_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui:\n  shortcuts: abcj\n").unwrap();
        let err = load(isolated(path, "DAILY_HN_TEST_SHORTCUTS")).unwrap_err();
        assert!(format!("{err:#}").contains("reserved"));
    }

    #[test]
    fn unparsable_env_values_are_ignored() {
        let mut cfg = Config::default();
        apply_env_value(&mut cfg, "source.limit", "lots".into());
        apply_env_value(&mut cfg, "source.feed", "sideways".into());
        apply_env_value(&mut cfg, "source.file", "".into());
        assert_eq!(cfg, Config::default());
    }
}
