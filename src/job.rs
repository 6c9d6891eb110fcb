use std::io::Write;

use crate::compose::{Introduction, compose};
use crate::config::{MessageConfig, PostConfig};
use crate::directory::{ChannelDirectory, UserDirectory};
use crate::error::JobError;
use crate::platform::Platform;
use crate::poster::{Delivery, post};
use crate::selector::Selector;
use crate::stats::aggregate;

/// Everything a run needs besides the platform handle.
pub struct IntroJob {
    pub selector: Selector,
    pub message: MessageConfig,
    pub post: PostConfig,
}

#[derive(Debug)]
pub struct JobReport {
    pub full_path: String,
    pub delivery: Delivery,
}

impl IntroJob {
    /// One complete introduction: fetch, select, aggregate, compose, post.
    /// Nothing is kept between runs.
    pub async fn run(
        &self,
        platform: &dyn Platform,
        sink: &mut (dyn Write + Send),
    ) -> Result<JobReport, JobError> {
        let channels = platform
            .list_public_channels()
            .await
            .map_err(|e| JobError::fetch("public channels", e))?;
        let directory = ChannelDirectory::new(channels);
        tracing::info!("Fetched {} public channels", directory.len());

        let users = platform
            .list_users()
            .await
            .map_err(|e| JobError::fetch("users", e))?;
        let users = UserDirectory::new(users);
        tracing::debug!("Fetched {} users", users.len());

        let selection = self.selector.select(platform, &directory).await?;
        tracing::info!("Selected {} ({})", selection.full_path, selection.channel.id);

        let stats = aggregate(platform, &selection.channel.id, &users).await?;

        let body = compose(&Introduction {
            greeting: &self.message.greeting,
            full_path: &selection.full_path,
            topic: selection.channel.topic.as_deref(),
            stats: &stats,
            recent_message_ids: &selection.recent_message_ids,
            permalink_base: &self.message.permalink_base,
        });

        let delivery = post(
            platform,
            &self.post.channel_id,
            &body,
            self.message.embed,
            sink,
        )
        .await?;

        Ok(JobReport {
            full_path: selection.full_path,
            delivery,
        })
    }

    /// Run once and log the outcome. Errors end this run only.
    pub async fn run_and_log(&self, platform: &dyn Platform) {
        let mut stdout = std::io::stdout();
        match self.run(platform, &mut stdout).await {
            Ok(JobReport {
                full_path,
                delivery: Delivery::Posted { channel_id },
            }) => tracing::info!("Introduced {full_path} in channel {channel_id}"),
            Ok(JobReport {
                full_path,
                delivery: Delivery::Printed,
            }) => tracing::info!("Introduced {full_path} on stdout (no destination channel)"),
            Err(JobError::SelectionEmpty) => {
                tracing::warn!("No eligible channel this time, skipping run")
            }
            Err(e) => tracing::error!("Introduction run failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionOrder;
    use crate::platform::fake::{FakePlatform, channel, user};
    use crate::selector::Policy;
    use regex::Regex;

    fn job(policy: Policy, channel_id: &str) -> IntroJob {
        IntroJob {
            selector: Selector::new(policy, SelectionOrder::ById),
            message: MessageConfig::default(),
            post: PostConfig {
                channel_id: channel_id.to_string(),
            },
        }
    }

    fn platform() -> FakePlatform {
        let mut sub = channel("B", "sub", Some("A"));
        sub.topic = Some("about sub".into());
        let mut root = channel("A", "general", None);
        root.force = true;
        FakePlatform {
            channels: vec![root, sub],
            users: vec![user("u1", "alice"), user("u2", "bob")],
            messages: [(
                "B".to_string(),
                vec!["m3".to_string(), "m2".to_string(), "m1".to_string()],
            )]
            .into_iter()
            .collect(),
            subscribers: [("B".to_string(), vec!["u1".to_string(), "u2".to_string()])]
                .into_iter()
                .collect(),
            stats: [("B".to_string(), (42, vec!["u1".to_string()]))]
                .into_iter()
                .collect(),
            pins: [("B".to_string(), 1)].into_iter().collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unfiltered_run_posts_introduction() {
        let platform = platform();
        let mut out = Vec::new();
        let report = job(Policy::Unfiltered, "intro")
            .run(&platform, &mut out)
            .await
            .unwrap();

        assert_eq!(report.full_path, "#general/sub");
        assert!(out.is_empty());
        let posted = platform.posted.lock().unwrap();
        let (channel_id, body, embed) = &posted[0];
        assert_eq!(channel_id, "intro");
        assert!(*embed);
        assert!(body.contains("## #general/sub\n> about sub\n"));
        assert!(body.contains("|メンバー数|2人 :@alice::@bob:|"));
        assert!(body.contains("|総メッセージ数|42件|"));
        assert!(body.contains("|会話に参加したユーザー数|1人 :@alice:|"));
        assert!(body.contains("|ピン止め数|1件|"));
        assert!(!body.contains("/messages/"));
    }

    #[tokio::test]
    async fn test_filtered_run_prints_without_destination() {
        let platform = platform();
        let policy = Policy::Filtered {
            pattern: Regex::new("^#general").unwrap(),
            min_recent_messages: 3,
        };
        let mut out = Vec::new();
        let report = job(policy, "").run(&platform, &mut out).await.unwrap();

        assert!(matches!(report.delivery, Delivery::Printed));
        assert_eq!(platform.call_count("post"), 0);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.ends_with(
            "https://q.trap.jp/messages/m1\n\
             https://q.trap.jp/messages/m2\n\
             https://q.trap.jp/messages/m3\n"
        ));
    }

    #[tokio::test]
    async fn test_channel_fetch_failure_stops_run() {
        let platform = FakePlatform {
            fail_on: Some("channels"),
            ..platform()
        };
        let mut out = Vec::new();
        let err = job(Policy::Unfiltered, "intro")
            .run(&platform, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Fetch { .. }));
        assert_eq!(platform.call_count("users"), 0);
        assert_eq!(platform.call_count("post"), 0);
    }

    #[tokio::test]
    async fn test_empty_selection_posts_nothing() {
        let platform = FakePlatform {
            channels: vec![],
            ..platform()
        };
        let mut out = Vec::new();
        let err = job(Policy::Unfiltered, "intro")
            .run(&platform, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::SelectionEmpty));
        assert_eq!(platform.call_count("subscribers"), 0);
        assert_eq!(platform.call_count("post"), 0);
    }

    #[tokio::test]
    async fn test_run_and_log_swallows_errors() {
        let platform = FakePlatform {
            fail_on: Some("stats"),
            ..platform()
        };
        job(Policy::Unfiltered, "intro").run_and_log(&platform).await;
        assert_eq!(platform.call_count("post"), 0);
    }
}
