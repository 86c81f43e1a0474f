use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use log::{error, info, warn};

use crate::app::{self, Job};
use crate::config::Config;

const RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Next wall-clock time `at` strictly after `now`: today if still ahead, otherwise tomorrow.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Run `job` every day at the configured time until Ctrl-C.
pub async fn run_daily(cfg: &Config, job: Job) -> Result<()> {
    let at = cfg.schedule_time()?;
    info!("Scheduler started. Will run {job:?} daily at {at}");
    println!("Scheduler started, running {job:?} daily at {at}. Press Ctrl-C to stop.");

    if cfg.run_on_start {
        info!("Running {job:?} immediately on startup");
        run_once(cfg, job).await;
    }

    loop {
        let now = Local::now().naive_local();
        let next = next_run_after(now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        info!("Next run at {next}");

        tokio::select! {
            _ = tokio::time::sleep(wait) => run_once(cfg, job).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Scheduler stopped");
                return Ok(());
            }
        }
    }
}

async fn run_once(cfg: &Config, job: Job) {
    info!("Starting {job:?} run");

    match tokio::time::timeout(RUN_TIMEOUT, app::run_job(cfg, job)).await {
        Ok(Ok(report)) => info!("{job:?} run completed: {report}"),
        Ok(Err(e)) => error!("{job:?} run failed: {e:?}"),
        Err(_) => warn!("{job:?} run timed out after {} seconds", RUN_TIMEOUT.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    #[test]
    fn test_next_run_later_today() {
        let now = day(9).and_time(at(8, 15));
        assert_eq!(next_run_after(now, at(9, 0)), day(9).and_time(at(9, 0)));
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        let now = day(9).and_time(at(10, 0));
        assert_eq!(next_run_after(now, at(9, 0)), day(10).and_time(at(9, 0)));
    }

    #[test]
    fn test_next_run_at_exact_time_goes_to_tomorrow() {
        let now = day(9).and_time(at(9, 0));
        assert_eq!(next_run_after(now, at(9, 0)), day(10).and_time(at(9, 0)));
    }

    #[test]
    fn test_next_run_crosses_month() {
        let now = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap().and_time(at(23, 0));
        assert_eq!(
            next_run_after(now, at(9, 0)),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_time(at(9, 0))
        );
    }
}
