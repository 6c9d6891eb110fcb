use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::signal;

use crate::config::ScheduleConfig;
use crate::job::IntroJob;
use crate::platform::Platform;

/// Fires the introduction job on a cron schedule in a fixed timezone.
pub struct Scheduler {
    schedule: Schedule,
    timezone: Tz,
}

impl Scheduler {
    pub fn new(config: &ScheduleConfig) -> Result<Self> {
        let schedule = Schedule::from_str(&config.cron)
            .with_context(|| format!("Invalid cron expression '{}'", config.cron))?;
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone '{}': {e}", config.timezone))?;
        Ok(Self { schedule, timezone })
    }

    /// Next `count` fire times strictly after `from`.
    pub fn upcoming(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Tz>> {
        let from = from.with_timezone(&self.timezone);
        self.schedule.after(&from).take(count).collect()
    }

    /// Run `job` at every tick until ctrl-c. Each run finishes before the
    /// next tick is computed, so runs never overlap.
    pub async fn start(&self, job: &IntroJob, platform: &dyn Platform) -> Result<()> {
        loop {
            let now = Utc::now();
            let next = self
                .upcoming(now, 1)
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Cron schedule has no future occurrence"))?;
            let wait = (next.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or_default();
            tracing::info!("Next introduction at {next}");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutting down scheduler");
                    return Ok(());
                }
            }

            job.run_and_log(platform).await;
        }
    }
}
