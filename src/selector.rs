use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use regex::Regex;

use crate::config::{SelectionConfig, SelectionOrder, SelectionPolicyKind};
use crate::directory::ChannelDirectory;
use crate::error::JobError;
use crate::platform::{Channel, Platform};

/// Most recent messages fetched per candidate and linked in the introduction.
pub const RECENT_MESSAGE_LIMIT: usize = 3;

/// The channel picked for today's introduction.
#[derive(Debug, Clone)]
pub struct Selection {
    pub channel: Channel,
    pub full_path: String,
    /// Oldest first. Empty under the unfiltered policy.
    pub recent_message_ids: Vec<String>,
}

pub enum Policy {
    /// Any live, non-forced channel.
    Unfiltered,
    /// Live, non-forced channels under an allowed path that have at least
    /// `min_recent_messages` of their last `RECENT_MESSAGE_LIMIT` messages.
    Filtered {
        pattern: Regex,
        min_recent_messages: usize,
    },
}

pub struct Selector {
    policy: Policy,
    order: SelectionOrder,
}

impl Selector {
    pub fn new(policy: Policy, order: SelectionOrder) -> Self {
        Self { policy, order }
    }

    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        if config.policy == SelectionPolicyKind::Filtered
            && !(1..=RECENT_MESSAGE_LIMIT).contains(&config.min_recent_messages)
        {
            anyhow::bail!(
                "Invalid selection.min_recent_messages {}: must be between 1 and {RECENT_MESSAGE_LIMIT}",
                config.min_recent_messages
            );
        }
        let policy = match config.policy {
            SelectionPolicyKind::Unfiltered => Policy::Unfiltered,
            SelectionPolicyKind::Filtered => Policy::Filtered {
                pattern: Regex::new(&config.path_pattern).with_context(|| {
                    format!("Invalid selection.path_pattern '{}'", config.path_pattern)
                })?,
                min_recent_messages: config.min_recent_messages,
            },
        };
        Ok(Self::new(policy, config.order))
    }

    /// Scan candidates in the configured order and return the first one the
    /// policy accepts.
    pub async fn select(
        &self,
        platform: &dyn Platform,
        directory: &ChannelDirectory,
    ) -> Result<Selection, JobError> {
        let candidates = self.candidates(directory);
        tracing::debug!(
            "{} of {} channels are live and not forced",
            candidates.len(),
            directory.len()
        );

        for ch in candidates {
            let full_path = directory.resolve_path(ch);

            let recent_message_ids = match &self.policy {
                Policy::Unfiltered => Vec::new(),
                Policy::Filtered {
                    pattern,
                    min_recent_messages,
                } => {
                    if !pattern.is_match(&full_path) {
                        continue;
                    }
                    let msgs = platform
                        .list_recent_messages(&ch.id, RECENT_MESSAGE_LIMIT)
                        .await
                        .map_err(|e| {
                            JobError::fetch(format!("recent messages of {full_path}"), e)
                        })?;
                    if msgs.len() < *min_recent_messages {
                        tracing::debug!(
                            "Skipping {full_path}: only {} recent messages",
                            msgs.len()
                        );
                        continue;
                    }
                    msgs.into_iter()
                        .take(RECENT_MESSAGE_LIMIT)
                        .rev()
                        .map(|m| m.id)
                        .collect()
                }
            };

            return Ok(Selection {
                channel: ch.clone(),
                full_path,
                recent_message_ids,
            });
        }

        Err(JobError::SelectionEmpty)
    }

    fn candidates<'a>(&self, directory: &'a ChannelDirectory) -> Vec<&'a Channel> {
        let mut candidates: Vec<&Channel> = directory
            .iter()
            .filter(|ch| !ch.archived && !ch.force)
            .collect();
        match self.order {
            SelectionOrder::Random => candidates.shuffle(&mut rand::thread_rng()),
            SelectionOrder::ById => candidates.sort_by(|a, b| a.id.cmp(&b.id)),
        }
        candidates
    }
}
