use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional per-directory config file.
pub const CONFIG_FILE: &str = ".ric.toml";

/// Environment variable overriding the editor launch command.
pub const EDITOR_ENV: &str = "VIC_EDITOR_COMMAND";

pub const DEFAULT_EDITOR_COMMAND: &str = "code --wait";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_URL: &str = "https://github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .ric.toml.
/// All fields are optional — the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorConfig {
    /// Editor command line; the workspace path is appended as the last argument.
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// REST API base, e.g. https://api.github.com
    pub api_url: Option<String>,
    /// Web base used to build clone URLs, e.g. https://github.com
    pub web_url: Option<String>,
}

impl Config {
    /// Load configuration from .ric.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the editor command: CLI flag, then VIC_EDITOR_COMMAND,
    /// then the config file, then `code --wait`.
    pub fn editor_command(&self, cli_override: Option<&str>, env_value: Option<String>) -> String {
        cli_override
            .map(str::to_string)
            .or(env_value.filter(|value| !value.trim().is_empty()))
            .or_else(|| self.editor.command.clone())
            .unwrap_or_else(|| DEFAULT_EDITOR_COMMAND.to_string())
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn api_url(&self) -> String {
        trimmed_or(self.github.api_url.as_deref(), DEFAULT_API_URL)
    }

    pub fn web_url(&self) -> String {
        trimmed_or(self.github.web_url.as_deref(), DEFAULT_WEB_URL)
    }
}

fn trimmed_or(value: Option<&str>, default: &str) -> String {
    value.unwrap_or(default).trim_end_matches('/').to_string()
}
