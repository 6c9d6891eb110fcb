use crate::directory::UserDirectory;
use crate::error::JobError;
use crate::platform::{ChannelStats, Platform};

/// Rendered table cells for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub subscribers: String,
    pub messages: String,
    pub talkers: String,
    pub pins: String,
}

/// `"<n>人 "` followed by `:@name:` for each id that resolves to a user.
/// The count includes ids that don't resolve.
pub fn member_list<'a>(
    ids: impl ExactSizeIterator<Item = &'a str>,
    users: &UserDirectory,
) -> String {
    let mut out = format!("{}人 ", ids.len());
    for id in ids {
        if let Some(user) = users.get(id) {
            out.push_str(&format!(":@{}:", user.name));
        }
    }
    out
}

pub fn count_of(n: impl std::fmt::Display) -> String {
    format!("{n}件")
}

/// Message count and talker list from a channel's stats.
pub fn summarize_stats(stats: &ChannelStats, users: &UserDirectory) -> (String, String) {
    let messages = count_of(stats.total_message_count);
    let talkers = member_list(stats.participants.iter().map(|p| p.id.as_str()), users);
    (messages, talkers)
}

/// Fetch subscribers, stats and pins for `channel_id`, one call each.
pub async fn aggregate(
    platform: &dyn Platform,
    channel_id: &str,
    users: &UserDirectory,
) -> Result<StatsSummary, JobError> {
    let subs = platform
        .list_subscribers(channel_id)
        .await
        .map_err(|e| JobError::fetch("channel subscribers", e))?;
    let subscribers = member_list(subs.iter().map(String::as_str), users);

    let stats = platform
        .get_channel_stats(channel_id)
        .await
        .map_err(|e| JobError::fetch("channel stats", e))?;
    let (messages, talkers) = summarize_stats(&stats, users);

    let pins = platform
        .list_pins(channel_id)
        .await
        .map_err(|e| JobError::fetch("channel pins", e))?;

    Ok(StatsSummary {
        subscribers,
        messages,
        talkers,
        pins: count_of(pins.len()),
    })
}
