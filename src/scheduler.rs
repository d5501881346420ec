/*!
 * Recurring per-platform job scheduling.
 *
 * Each platform gets its own task that runs a drain cycle, sleeps until the
 * cadence's next fire and repeats. The cycle is awaited inside the loop, so
 * two invocations for the same platform can never overlap; the two platform
 * loops share no mutable state and run independently.
 *
 * Shutdown is cooperative: a watch flag flips on process interrupt, idle
 * loops exit at their next suspension point and an in-flight cycle is
 * allowed to finish (idempotent upserts keep partial results valid).
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use log::{error, info};
use tokio::sync::watch;

use crate::app_config::{Cadence, CronFields};
use crate::app_controller::Controller;
use crate::translation::core::Platform;

/// Compute the delay until a cadence's next fire after `now`
pub fn next_delay(cadence: &Cadence, now: DateTime<Utc>) -> Duration {
    if let Some(cron) = &cadence.cron {
        let next = next_cron_fire(cron, now);
        return (next - now).to_std().unwrap_or(Duration::from_secs(1));
    }

    Duration::from_secs(cadence.interval_secs.unwrap_or(3600 * 24).max(1))
}

/// Next instant strictly after `now` matching the cron fields.
///
/// The most significant set field determines the recurrence: `day` fires
/// monthly, `hour` daily, `minute` hourly, `second` every minute. Finer
/// unset fields default to zero.
fn next_cron_fire(cron: &CronFields, now: DateTime<Utc>) -> DateTime<Utc> {
    let second = cron.second.unwrap_or(0);

    if let Some(day) = cron.day {
        let hour = cron.hour.unwrap_or(0);
        let minute = cron.minute.unwrap_or(0);

        // Walk months until the day exists (e.g. 31st) and the fire time is
        // in the future.
        let mut year = now.year();
        let mut month = now.month();
        for _ in 0..48 {
            if let Some(candidate) = Utc
                .with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
            {
                if candidate > now {
                    return candidate;
                }
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        // Unreachable for validated fields: every day 1-29 exists at least
        // once in any 48-month window.
        return now + chrono::Duration::days(1);
    }

    if let Some(hour) = cron.hour {
        let minute = cron.minute.unwrap_or(0);
        let today = now.date_naive();
        for days_ahead in 0..=1 {
            let date = today + chrono::Duration::days(days_ahead);
            if let Some(candidate) = Utc
                .with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, second)
                .single()
            {
                if candidate > now {
                    return candidate;
                }
            }
        }
        return now + chrono::Duration::days(1);
    }

    if let Some(minute) = cron.minute {
        let this_hour = now
            .date_naive()
            .and_hms_opt(now.time().hour(), minute, second)
            .map(|naive| Utc.from_utc_datetime(&naive));
        if let Some(candidate) = this_hour {
            if candidate > now {
                return candidate;
            }
            return candidate + chrono::Duration::hours(1);
        }
        return now + chrono::Duration::hours(1);
    }

    // Only `second` set: every minute at that second.
    let this_minute = now
        .date_naive()
        .and_hms_opt(now.time().hour(), now.time().minute(), second)
        .map(|naive| Utc.from_utc_datetime(&naive));
    if let Some(candidate) = this_minute {
        if candidate > now {
            return candidate;
        }
        return candidate + chrono::Duration::minutes(1);
    }
    now + chrono::Duration::minutes(1)
}

/// Run one platform's recurring drain loop until shutdown.
///
/// The first cycle runs immediately on startup (matching the original
/// deployment's behavior), then the loop follows the cadence.
pub async fn run_platform_loop(
    controller: Arc<Controller>,
    platform: Platform,
    cadence: Cadence,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Scheduling {} drain cycles", platform.display_name());

    loop {
        // A failed cycle is logged and retried at the next fire; it must
        // not take down the scheduler or the other platform's loop.
        if let Err(e) = controller.run_drain_cycle(platform).await {
            error!("{} drain cycle failed: {}", platform.display_name(), e);
        }

        if *shutdown.borrow() {
            break;
        }

        let delay = next_delay(&cadence, Utc::now());
        info!(
            "Next {} drain cycle in {:?}",
            platform.display_name(),
            delay
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("{} drain loop stopped", platform.display_name());
}
