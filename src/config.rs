use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::compose::DEFAULT_GREETING;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub message: MessageConfig,
    #[serde(default)]
    pub post: PostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for each request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://q.trap.jp/api/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_cron")]
    pub cron: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            timezone: default_timezone(),
        }
    }
}

fn default_cron() -> String {
    "0 0 8,13,18,23 * * *".to_string()
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicyKind {
    Unfiltered,
    #[default]
    Filtered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    #[default]
    Random,
    ById,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub policy: SelectionPolicyKind,
    #[serde(default)]
    pub order: SelectionOrder,
    /// Only used by the filtered policy; matched against `#full/path`.
    #[serde(default = "default_path_pattern")]
    pub path_pattern: String,
    /// How many of the latest 3 messages a filtered candidate needs, 1 to 3.
    #[serde(default = "default_min_recent_messages")]
    pub min_recent_messages: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicyKind::default(),
            order: SelectionOrder::default(),
            path_pattern: default_path_pattern(),
            min_recent_messages: default_min_recent_messages(),
        }
    }
}

fn default_path_pattern() -> String {
    "^#(gps|other|random|ramen)".to_string()
}

fn default_min_recent_messages() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageConfig {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_permalink_base")]
    pub permalink_base: String,
    #[serde(default = "default_embed")]
    pub embed: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            permalink_base: default_permalink_base(),
            embed: default_embed(),
        }
    }
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_permalink_base() -> String {
    "https://q.trap.jp".to_string()
}

fn default_embed() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostConfig {
    /// Destination channel id. Empty prints to stdout instead of posting.
    #[serde(default)]
    pub channel_id: String,
}

/// Load the TOML config at `path`. A missing file yields the defaults.
pub fn load(path: &str) -> Result<Config> {
    let path = expand_tilde(path);
    if !path.exists() {
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Write a commented default config to `path` unless one already exists.
pub async fn init_config(path: &str) -> Result<PathBuf> {
    let path = expand_tilde(path);
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    write_default(&path).await?;
    Ok(path)
}

async fn write_default(path: &Path) -> Result<()> {
    tokio::fs::write(
        path,
        r#"# The access token and destination channel are read from the environment:
#   TRAQ_ACCESS_TOKEN       bot access token
#   TRAQ_INTRO_CHANNEL_ID   destination channel id (empty prints to stdout)

[api]
base_url = "https://q.trap.jp/api/v3"
timeout_secs = 30

[schedule]
# sec min hour day month weekday
cron = "0 0 8,13,18,23 * * *"
timezone = "Asia/Tokyo"

[selection]
# "filtered" requires a path match and recent traffic; "unfiltered" takes any live channel
policy = "filtered"
# "random" or "by_id"
order = "random"
path_pattern = "^#(gps|other|random|ramen)"
# 1 to 3; the latest 3 messages are fetched and linked
min_recent_messages = 3

[message]
greeting = "きなのがチャンネルを紹介するやんね！"
permalink_base = "https://q.trap.jp"
embed = true

[post]
# channel_id = ""
"#,
    )
    .await
    .with_context(|| format!("Failed to write {}", path.display()))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
