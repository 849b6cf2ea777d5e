//! Background schedulers
//!
//! Three fixed-cadence jobs on tokio tasks, all stopped through the
//! shared CancellationToken:
//! - absentee sweep, daily at `WORKDAY_END_HOUR` local (with a startup
//!   catch-up pass over days missed while the process was down)
//! - meeting digest, daily at `MEETING_DIGEST_HOUR` local
//! - meeting reminder scan, every 10 minutes

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use crate::attendance::ledger;
use crate::core::ServerState;
use crate::db::repository::{attendance, employee, meeting};
use crate::utils::time;
use shared::models::AttendanceStatus;

const REMINDER_SCAN_INTERVAL: Duration = Duration::from_secs(10 * 60);
const REMINDER_LOOKAHEAD_MS: i64 = 30 * 60 * 1000;

/// Marks ABSENT / ON_LEAVE rows for everyone without attendance once
/// the workday is over, then mails HR the list.
pub struct AbsenteeSweepScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl AbsenteeSweepScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        tracing::info!("Absentee sweep scheduler started");

        self.catch_up().await;

        loop {
            let sleep = duration_until_hour(
                self.state.config.workday_end_hour,
                self.state.config.timezone,
            );
            tracing::info!(
                "Next absentee sweep in {} minutes",
                sleep.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep) => {
                    self.sweep().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Absentee sweep scheduler stopped");
                    return;
                }
            }
        }
    }

    /// Re-run the sweep for every day between the newest attendance row
    /// and the most recent elapsed workday end. Already-swept days
    /// insert nothing (unique index), so starting at the newest row is
    /// safe even when that day was in fact swept. No digest mail for
    /// backfilled days; the counts go to the log instead.
    async fn catch_up(&self) {
        let pool = &self.state.db.pool;

        let latest = match attendance::latest_date(pool).await {
            Ok(Some(date)) => date,
            Ok(None) => {
                tracing::debug!("No attendance history, absentee catch-up skipped");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not determine absentee catch-up start");
                return;
            }
        };
        let mut day = match time::parse_date(&latest) {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, date = %latest, "Unparseable date in attendance table");
                return;
            }
        };

        let through = last_elapsed_sweep_date(
            self.state.config.workday_end_hour,
            self.state.config.timezone,
        );
        let now_ms = shared::util::now_millis();

        while day <= through {
            if self.shutdown.is_cancelled() {
                tracing::info!("Absentee catch-up interrupted by shutdown");
                return;
            }
            match ledger::mark_absentees(pool, day, now_ms).await {
                Ok(0) => {}
                Ok(marked) => {
                    tracing::info!(date = %day, marked, "Absentee catch-up swept a missed day");
                }
                Err(e) => {
                    tracing::error!(error = %e, date = %day, "Absentee catch-up failed");
                    return;
                }
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => return,
            };
        }
    }

    async fn sweep(&self) {
        let tz = self.state.config.timezone;
        let now_ms = shared::util::now_millis();
        let today = time::business_date(now_ms, tz);

        match ledger::mark_absentees(&self.state.db.pool, today, now_ms).await {
            Ok(0) => {
                tracing::info!(date = %today, "Absentee sweep: everyone accounted for");
            }
            Ok(marked) => {
                tracing::info!(date = %today, marked, "Absentee sweep complete");
                self.send_digest(today).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Absentee sweep failed");
            }
        }
    }

    async fn send_digest(&self, date: NaiveDate) {
        let Some(mailer) = &self.state.mailer else {
            return;
        };
        let pool = &self.state.db.pool;
        let date_str = date.to_string();

        // ON_LEAVE rows are expected absences and stay out of the digest
        let absents =
            match attendance::find_by_date_and_status(pool, &date_str, AttendanceStatus::Absent)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load absentees for digest");
                    return;
                }
            };
        if absents.is_empty() {
            return;
        }

        let mut names = Vec::with_capacity(absents.len());
        for row in &absents {
            match employee::find_by_emp_id(pool, &row.emp_id).await {
                Ok(Some(emp)) => names.push(format!("{} ({})", emp.name, emp.emp_id)),
                _ => names.push(row.emp_id.clone()),
            }
        }
        mailer.absentee_digest(&date_str, &names).await;
    }
}

/// Mails every attendee their meetings for the day, each morning.
pub struct MeetingDigestScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl MeetingDigestScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        tracing::info!("Meeting digest scheduler started");

        loop {
            let sleep = duration_until_hour(
                self.state.config.meeting_digest_hour,
                self.state.config.timezone,
            );
            tracing::info!(
                "Next meeting digest in {} minutes",
                sleep.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep) => {
                    self.send_digests().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Meeting digest scheduler stopped");
                    return;
                }
            }
        }
    }

    async fn send_digests(&self) {
        let Some(mailer) = &self.state.mailer else {
            return;
        };
        let pool = &self.state.db.pool;
        let tz = self.state.config.timezone;
        let today = time::business_date(shared::util::now_millis(), tz);
        let window = time::day_window(today, tz);

        let meetings = match meeting::find_in_range(pool, window.start_ms, window.end_ms).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load today's meetings");
                return;
            }
        };
        if meetings.is_empty() {
            tracing::debug!(date = %today, "No meetings today, digest skipped");
            return;
        }

        let mut per_attendee: HashMap<String, Vec<String>> = HashMap::new();
        for m in &meetings {
            let mut line = format!("{} at {}", m.title, local_hm(m.scheduled_at, tz));
            if let Some(location) = &m.location {
                line.push_str(&format!(" ({location})"));
            }
            for attendee in m.attendee_ids() {
                per_attendee
                    .entry(attendee.to_string())
                    .or_default()
                    .push(line.clone());
            }
        }

        for (emp_id, lines) in per_attendee {
            match employee::find_by_emp_id(pool, &emp_id).await {
                Ok(Some(emp)) if emp.is_active() => {
                    mailer.meeting_digest(&emp.email, &emp.name, &lines).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, emp_id, "Could not resolve digest recipient");
                }
            }
        }
        tracing::info!(date = %today, meetings = meetings.len(), "Meeting digests sent");
    }
}

/// Scans for meetings starting inside the next half hour and reminds
/// their attendees once.
pub struct MeetingReminderScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl MeetingReminderScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self) {
        tracing::info!("Meeting reminder scheduler started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(REMINDER_SCAN_INTERVAL) => {
                    self.scan().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Meeting reminder scheduler stopped");
                    return;
                }
            }
        }
    }

    async fn scan(&self) {
        let pool = &self.state.db.pool;
        let tz = self.state.config.timezone;
        let now_ms = shared::util::now_millis();

        let upcoming =
            match meeting::find_unreminded_between(pool, now_ms, now_ms + REMINDER_LOOKAHEAD_MS)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(error = %e, "Reminder scan query failed");
                    return;
                }
            };

        for m in upcoming {
            if let Some(mailer) = &self.state.mailer {
                let starts_at = local_hm(m.scheduled_at, tz);
                let location = m.location.as_deref().unwrap_or("not specified");
                for attendee in m.attendee_ids() {
                    match employee::find_by_emp_id(pool, attendee).await {
                        Ok(Some(emp)) if emp.is_active() => {
                            mailer
                                .meeting_reminder(&emp.email, &m.title, &starts_at, location)
                                .await;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, emp_id = attendee, "Could not resolve reminder recipient");
                        }
                    }
                }
            }

            // mark even when sends failed: one attempt per meeting
            if let Err(e) = meeting::mark_reminded(pool, m.id, now_ms).await {
                tracing::error!(error = %e, meeting_id = m.id, "Could not mark meeting reminded");
            } else {
                tracing::info!(meeting_id = m.id, title = %m.title, "Meeting reminder dispatched");
            }
        }
    }
}

/// Most recent date whose `hour:00` local trigger has already passed:
/// today once the workday end is behind us, yesterday before that.
fn last_elapsed_sweep_date(hour: u32, tz: Tz) -> NaiveDate {
    let now = chrono::Utc::now().with_timezone(&tz);
    let today = now.date_naive();
    let trigger = chrono::NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
    if now.time() >= trigger {
        today
    } else {
        today - chrono::Duration::days(1)
    }
}

/// Time until the next local occurrence of `hour:00`, with fallbacks
/// for DST-ambiguous wall-clock times in zones that have them.
fn duration_until_hour(hour: u32, tz: Tz) -> Duration {
    let now = chrono::Utc::now().with_timezone(&tz);
    let today = now.date_naive();
    let target_time = chrono::NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default();

    let target_date = if now.time() >= target_time {
        today + chrono::Duration::days(1)
    } else {
        today
    };

    let target = target_date
        .and_time(target_time)
        .and_local_timezone(tz)
        .single()
        .unwrap_or_else(|| {
            (target_date.and_time(target_time) + chrono::Duration::minutes(1))
                .and_local_timezone(tz)
                .latest()
                .unwrap_or_else(|| {
                    tracing::error!("Cannot resolve local trigger time, using fallback");
                    now + chrono::Duration::hours(1)
                })
        });

    let duration = target.signed_duration_since(now);
    if duration.num_seconds() <= 0 {
        Duration::from_secs(60)
    } else {
        duration.to_std().unwrap_or(Duration::from_secs(60))
    }
}

fn local_hm(ms: i64, tz: Tz) -> String {
    chrono::Utc
        .timestamp_millis_opt(ms)
        .single()
        .map(|t| t.with_timezone(&tz).format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn next_trigger_is_within_a_day() {
        for hour in [0, 9, 20, 23] {
            let d = duration_until_hour(hour, Kolkata);
            assert!(d.as_secs() > 0);
            assert!(d.as_secs() <= 24 * 3600);
        }
    }

    #[test]
    fn catch_up_horizon_is_today_or_yesterday() {
        for hour in [0, 12, 23] {
            let d = last_elapsed_sweep_date(hour, Kolkata);
            let today = chrono::Utc::now().with_timezone(&Kolkata).date_naive();
            assert!(d == today || d == today - chrono::Duration::days(1));
        }
    }

    #[test]
    fn local_hm_prints_business_zone_clock() {
        let d = time::parse_date("2025-06-19").unwrap();
        let ms = time::date_hms_to_millis(d, 14, 30, 0, Kolkata);
        assert_eq!(local_hm(ms, Kolkata), "14:30");
    }
}
