use crate::error::{DodError, Result};
use crate::key::is_valid_project_key;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".dod";
pub const CONFIG_FILE: &str = ".dod/config.yaml";

pub const ENV_SERVER: &str = "JIRA_SERVER";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_PROJECT_KEY: &str = "DOD_PROJECT_KEY";
pub const ENV_PROSE_KEY: &str = "OPENAI_API_KEY";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Prefix for bare ticket numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    #[serde(default = "default_tracker_timeout")]
    pub timeout_seconds: u64,
}

fn default_tracker_timeout() -> u64 {
    30
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            server: None,
            email: None,
            token: None,
            project_key: None,
            timeout_seconds: default_tracker_timeout(),
        }
    }
}

/// Tracker settings once every required field is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerCredentials {
    pub server: String,
    pub email: String,
    pub token: String,
    pub timeout_seconds: u64,
}

// ---------------------------------------------------------------------------
// ProseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProseConfig {
    /// No key means prose polishing is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_prose_timeout")]
    pub timeout_seconds: u64,
    /// Markdown files whose background is added to the prompt. Relative
    /// paths are resolved against the working directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_files: Vec<PathBuf>,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_prose_timeout() -> u64 {
    60
}

impl Default for ProseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_prose_timeout(),
            context_files: Vec::new(),
        }
    }
}

impl ProseConfig {
    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub prose: ProseConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            tracker: TrackerConfig::default(),
            prose: ProseConfig::default(),
        }
    }
}

fn set_from(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        *slot = Some(v);
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    /// Load `path` if given, then apply process environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading config");
                Self::load(p)?
            }
            None => Self::default(),
        };
        cfg.apply_env_with(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Non-empty variables override file values.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        set_from(&mut self.tracker.server, lookup(ENV_SERVER));
        set_from(&mut self.tracker.email, lookup(ENV_EMAIL));
        set_from(&mut self.tracker.token, lookup(ENV_TOKEN));
        set_from(&mut self.tracker.project_key, lookup(ENV_PROJECT_KEY));
        set_from(&mut self.prose.api_key, lookup(ENV_PROSE_KEY));
    }

    /// Required tracker settings, or `MissingConfig` naming every absent one.
    pub fn tracker_credentials(&self) -> Result<TrackerCredentials> {
        let t = &self.tracker;
        let mut missing = Vec::new();
        if t.server.is_none() {
            missing.push(format!("tracker.server ({ENV_SERVER})"));
        }
        if t.email.is_none() {
            missing.push(format!("tracker.email ({ENV_EMAIL})"));
        }
        if t.token.is_none() {
            missing.push(format!("tracker.token ({ENV_TOKEN})"));
        }
        match (&t.server, &t.email, &t.token) {
            (Some(server), Some(email), Some(token)) => Ok(TrackerCredentials {
                server: server.trim_end_matches('/').to_string(),
                email: email.clone(),
                token: token.clone(),
                timeout_seconds: t.timeout_seconds,
            }),
            _ => Err(DodError::MissingConfig(missing.join(", "))),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(server) = &self.tracker.server {
            if !server.starts_with("https://") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "tracker.server '{server}' is not https; credentials are sent in clear text"
                    ),
                });
            }
        }

        if self.tracker.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tracker.timeout_seconds is 0; every request would time out".to_string(),
            });
        }

        if self.prose.enabled() && self.prose.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "prose.timeout_seconds is 0; prose polishing will always fall back"
                    .to_string(),
            });
        }

        if let Some(project) = &self.tracker.project_key {
            if !is_valid_project_key(&project.to_ascii_uppercase()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("tracker.project_key '{project}' is not a valid project key"),
                });
            }
        }

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("unknown config version {}", self.version),
            });
        }

        warnings
    }
}

/// Per-user config location, `~/.config/dod/config.yaml`.
pub fn user_config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join("dod").join("config.yaml"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    const FULL: &str = "\
version: 1
tracker:
  server: https://example.atlassian.net/
  email: me@example.com
  token: secret
  project_key: ES
prose:
  api_key: sk-test
  model: gpt-4o
  context_files:
    - README.md
    - docs/non-public.md
";

    #[test]
    fn defaults_apply_to_empty_file() {
        let cfg = Config::from_yaml("").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.tracker.timeout_seconds, 30);
        assert_eq!(cfg.prose.model, "gpt-4");
        assert_eq!(cfg.prose.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.prose.timeout_seconds, 60);
        assert!(!cfg.prose.enabled());
        assert!(cfg.prose.context_files.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_yaml(FULL).unwrap();
        assert_eq!(cfg.tracker.project_key.as_deref(), Some("ES"));
        assert_eq!(cfg.prose.model, "gpt-4o");
        assert!(cfg.prose.enabled());
        assert_eq!(
            cfg.prose.context_files,
            [PathBuf::from("README.md"), PathBuf::from("docs/non-public.md")]
        );
        let creds = cfg.tracker_credentials().unwrap();
        assert_eq!(creds.server, "https://example.atlassian.net");
        assert_eq!(creds.timeout_seconds, 30);
    }

    #[test]
    fn load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, FULL).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.tracker.email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, DodError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let err = Config::from_yaml("tracker: [unclosed").unwrap_err();
        assert!(matches!(err, DodError::Yaml(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::from_yaml(FULL).unwrap();
        cfg.apply_env_with(env(&[
            (ENV_SERVER, "https://other.example.com"),
            (ENV_TOKEN, "   "),
            (ENV_PROJECT_KEY, "FW"),
        ]));
        assert_eq!(cfg.tracker.server.as_deref(), Some("https://other.example.com"));
        // blank values are ignored
        assert_eq!(cfg.tracker.token.as_deref(), Some("secret"));
        assert_eq!(cfg.tracker.project_key.as_deref(), Some("FW"));
    }

    #[test]
    fn env_alone_is_enough() {
        let mut cfg = Config::default();
        cfg.apply_env_with(env(&[
            (ENV_SERVER, "https://jira.example.com"),
            (ENV_EMAIL, "a@b.c"),
            (ENV_TOKEN, "t"),
            (ENV_PROSE_KEY, "sk"),
        ]));
        assert!(cfg.tracker_credentials().is_ok());
        assert!(cfg.prose.enabled());
    }

    #[test]
    fn missing_credentials_are_named() {
        let mut cfg = Config::default();
        cfg.apply_env_with(env(&[(ENV_SERVER, "https://jira.example.com")]));
        let err = cfg.tracker_credentials().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, DodError::MissingConfig(_)));
        assert!(msg.contains(ENV_EMAIL));
        assert!(msg.contains(ENV_TOKEN));
        assert!(!msg.contains(ENV_SERVER));
    }

    #[test]
    fn validate_clean_config_no_warnings() {
        let cfg = Config::from_yaml(FULL).unwrap();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_flags_plain_http_and_zero_timeouts() {
        let cfg = Config::from_yaml(
            "tracker:\n  server: http://jira.local\n  timeout_seconds: 0\nprose:\n  api_key: k\n  timeout_seconds: 0\n",
        )
        .unwrap();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].message.contains("not https"));
        assert_eq!(warnings[1].level, WarnLevel::Error);
        assert!(warnings[2].message.contains("prose.timeout_seconds"));
    }

    #[test]
    fn validate_flags_bad_project_key() {
        let cfg = Config::from_yaml("tracker:\n  project_key: 9-bad\n").unwrap();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("project_key"));
    }

    #[test]
    fn serialized_config_omits_absent_secrets() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(!yaml.contains("token"));
        assert!(!yaml.contains("api_key"));
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.tracker.timeout_seconds, 30);
    }
}
