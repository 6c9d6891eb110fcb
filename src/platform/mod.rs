pub mod traq;

use serde::Deserialize;

use crate::error::ApiError;

// --- Records returned by the platform ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Handle used in `:@name:` mentions.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentMessage {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_message_count: u64,
    #[serde(default, rename = "users")]
    pub participants: Vec<Participant>,
}

/// Only the number of pins is used, so the record's fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Pin {}

// --- Platform client trait ---

/// Everything a run needs from the messaging platform. One handle is built at
/// startup and passed into each run.
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    async fn list_public_channels(&self) -> Result<Vec<Channel>, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    /// Up to `limit` most recent messages, newest first.
    async fn list_recent_messages(
        &self,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<RecentMessage>, ApiError>;
    async fn list_subscribers(&self, channel_id: &str) -> Result<Vec<String>, ApiError>;
    async fn get_channel_stats(&self, channel_id: &str) -> Result<ChannelStats, ApiError>;
    async fn list_pins(&self, channel_id: &str) -> Result<Vec<Pin>, ApiError>;
    async fn post_message(&self, channel_id: &str, content: &str, embed: bool)
    -> Result<(), ApiError>;
}
