use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// On-disk settings. Every key is optional; CLI flags win over these and
/// these win over built-in defaults.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub data_url: Option<String>,
    pub data_dir: Option<String>,
    pub timeout: Option<usize>,
    #[serde(alias = "retry_attempts")]
    pub retry_max_attempts: Option<u32>,
    pub retry_initial_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
    pub output_dir: Option<String>,
    #[serde(alias = "output_format")]
    pub format: Option<String>,
    pub pages: Option<Vec<String>>,
    pub dashboard: Option<String>,
    pub no_color: Option<bool>,
    pub verbose: Option<u8>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".statgrid").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

/// An empty or comment-only file parses to the default config.
pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents
        .lines()
        .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
    {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

pub fn default_config_yaml() -> String {
    r#"# statgrid config
#
# Location (default):
#   ~/.statgrid/config.yml

# Data source (choose one; data_dir wins when both are set)
# data_url: https://stats.example.com/
data_dir: .

# Fetching
timeout: 10

# Grid library readiness backoff used by `route`
retry_max_attempts: 20
retry_initial_delay_ms: 100
retry_max_delay_ms: 2000

# Build output
output_dir: ./dist
format: html
# pages:
#   - nhl/team/tor/gamelog
#   - nhl/team/tor/roster

# Dashboard markup used by `route` (optional)
# dashboard: ./index.html

# Output styling
no_color: false
# verbose: 1
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
