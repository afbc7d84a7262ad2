//! Daily scheduling for `watch`: one run at startup, then one per day.

use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use tracing::{error, info, warn};

use careerwatch_crawler::PageFetcher;
use careerwatch_notify::NotificationSink;
use careerwatch_shared::{CareerWatchError, Result, ScheduleConfig, parse_hhmm};

use crate::pipeline::{Pipeline, ProgressReporter, RunOutcome};

/// Parse a `HH:MM` schedule time.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let (hour, minute) = parse_hhmm(value)?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| CareerWatchError::config(format!("schedule time '{value}' is out of range")))
}

/// The next wall-clock occurrence of `at` strictly after `now`, in `now`'s zone.
///
/// A day where `at` does not exist (a DST gap) is skipped; an ambiguous time
/// resolves to its earlier instant.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..=2u64)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(at)).earliest())
        .find(|candidate| candidate > now)
        .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
}

/// Run the pipeline once, bounded by `limit`. `None` means it timed out.
pub async fn run_with_timeout<F, N>(
    pipeline: &Pipeline<F, N>,
    limit: Duration,
    progress: &dyn ProgressReporter,
) -> Option<RunOutcome>
where
    F: PageFetcher,
    N: NotificationSink,
{
    match tokio::time::timeout(limit, pipeline.run(progress)).await {
        Ok(outcome) => Some(outcome),
        Err(_) => {
            error!(limit_secs = limit.as_secs(), "run timed out");
            None
        }
    }
}

/// Run immediately, then daily at `schedule.time` local time, until Ctrl-C.
///
/// A failed or timed-out run is logged and the loop carries on.
pub async fn watch<F, N>(
    pipeline: &Pipeline<F, N>,
    schedule: &ScheduleConfig,
    progress: &dyn ProgressReporter,
) -> Result<()>
where
    F: PageFetcher,
    N: NotificationSink,
{
    let at = parse_time(&schedule.time)?;
    let limit = Duration::from_secs(schedule.run_timeout_secs);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(time = %schedule.time, "scheduler started, running initial check");

    loop {
        if let Some(RunOutcome::Aborted(reason)) = run_with_timeout(pipeline, limit, progress).await {
            warn!(%reason, "scheduled run aborted, will retry at next slot");
        }

        let next = next_run_after(&Local::now(), at);
        let wait = (next - Local::now()).to_std().unwrap_or_default();
        info!(next = %next.format("%Y-%m-%d %H:%M %Z"), "next run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    error!(error = %e, "failed to listen for Ctrl-C");
                }
                info!("scheduler stopped");
                return Ok(());
            }
        }
    }
}
