//! Call-analytics vendor adapter
//!
//! Fetches per-agent talk time from the external call system. The
//! vendor hands out short-lived password-grant tokens; every request
//! re-authenticates rather than caching one (the token lifetime is
//! shorter than our typical gap between report requests).
//!
//! Every failure mode here (connect, timeout, non-2xx, bad JSON)
//! surfaces as `AppError::ExternalService` so callers can choose to
//! degrade or propagate.

use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::utils::{AppError, AppResult, TimeWindow, time};

/// Where evaluation gets talk-time minutes from. Implemented by the
/// production vendor client and by test stubs.
#[async_trait]
pub trait TalkTimeSource: Send + Sync {
    /// Total minutes of calls involving `alias` inside `window`.
    async fn talk_time_minutes(&self, alias: &str, window: TimeWindow) -> AppResult<f64>;
}

#[derive(Debug, Clone)]
pub struct CallAnalyticsConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub api_key: String,
    pub pbx_id: String,
    pub page_size: u32,
    pub timeout_ms: u64,
    /// Zone label the vendor expects in the query string
    pub timezone_label: String,
}

pub struct CallAnalyticsClient {
    http: reqwest::Client,
    config: CallAnalyticsConfig,
    tz: Tz,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallRecord {
    #[serde(default)]
    caller_name: Option<String>,
    #[serde(default)]
    callee_name: Option<String>,
    /// `"HH:MM:SS"`
    #[serde(default)]
    talk_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallRecordsPage {
    #[serde(default)]
    data: Vec<CallRecord>,
}

impl CallAnalyticsClient {
    pub fn new(config: CallAnalyticsConfig, tz: Tz) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config, tz })
    }

    async fn fetch_token(&self) -> AppResult<String> {
        let url = format!("{}/oauth/token", self.config.base_url);
        let params = [
            ("grant_type", "password"),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Vendor token request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Vendor token request returned {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Vendor token response unreadable: {e}"))
        })?;
        Ok(token.access_token)
    }

    async fn fetch_records(&self, token: &str, window: TimeWindow) -> AppResult<Vec<CallRecord>> {
        let url = format!("{}/call-records", self.config.base_url);
        // the vendor takes inclusive local timestamps; our windows are
        // half-open, so the end lands on 23:59:59
        let query = [
            ("pbxId", self.config.pbx_id.clone()),
            (
                "startTime",
                time::format_local_datetime(window.start_ms, self.tz),
            ),
            (
                "endTime",
                time::format_local_datetime(window.end_ms - 1_000, self.tz),
            ),
            ("timeZone", self.config.timezone_label.clone()),
            ("pageSize", self.config.page_size.to_string()),
        ];

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header("x-api-key", &self.config.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Call records request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Call records request returned {}",
                response.status()
            )));
        }
        let page: CallRecordsPage = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Call records response unreadable: {e}"))
        })?;
        Ok(page.data)
    }
}

#[async_trait]
impl TalkTimeSource for CallAnalyticsClient {
    async fn talk_time_minutes(&self, alias: &str, window: TimeWindow) -> AppResult<f64> {
        let token = self.fetch_token().await?;
        let records = self.fetch_records(&token, window).await?;
        let minutes = sum_minutes_for(&records, alias);
        tracing::debug!(alias, minutes, records = records.len(), "Talk time fetched");
        Ok(minutes)
    }
}

/// `"HH:MM:SS"` → seconds. Unparseable values are ignored by the
/// caller rather than failing the whole window.
fn parse_duration_seconds(value: &str) -> Option<i64> {
    let mut parts = value.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    let seconds: i64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Sum call durations where `alias` appears on either side of the call.
fn sum_minutes_for(records: &[CallRecord], alias: &str) -> f64 {
    let total_seconds: i64 = records
        .iter()
        .filter(|r| {
            r.caller_name.as_deref() == Some(alias) || r.callee_name.as_deref() == Some(alias)
        })
        .filter_map(|r| r.talk_time.as_deref().and_then(parse_duration_seconds))
        .sum();
    time::round2(total_seconds as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(caller: Option<&str>, callee: Option<&str>, talk: Option<&str>) -> CallRecord {
        CallRecord {
            caller_name: caller.map(str::to_string),
            callee_name: callee.map(str::to_string),
            talk_time: talk.map(str::to_string),
        }
    }

    #[test]
    fn durations_parse_as_seconds() {
        assert_eq!(parse_duration_seconds("00:01:30"), Some(90));
        assert_eq!(parse_duration_seconds("01:00:00"), Some(3600));
        assert_eq!(parse_duration_seconds("10:59:59"), Some(39599));
        assert_eq!(parse_duration_seconds("00:00:00"), Some(0));
    }

    #[test]
    fn garbage_durations_are_rejected() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("90"), None);
        assert_eq!(parse_duration_seconds("1:2"), None);
        assert_eq!(parse_duration_seconds("00:99:00"), None);
        assert_eq!(parse_duration_seconds("00:01:30:00"), None);
        assert_eq!(parse_duration_seconds("aa:bb:cc"), None);
    }

    #[test]
    fn minutes_sum_over_both_call_directions() {
        let records = vec![
            record(Some("Ravi K"), Some("Customer"), Some("00:30:00")),
            record(Some("Customer"), Some("Ravi K"), Some("00:24:00")),
            record(Some("Someone Else"), Some("Customer"), Some("05:00:00")),
            // unparseable duration is skipped, not fatal
            record(Some("Ravi K"), None, Some("bogus")),
            record(Some("Ravi K"), None, None),
        ];
        assert_eq!(sum_minutes_for(&records, "Ravi K"), 54.0);
        assert_eq!(sum_minutes_for(&records, "Nobody"), 0.0);
    }

    #[test]
    fn partial_minutes_round_to_two_decimals() {
        let records = vec![record(Some("Ravi K"), None, Some("00:01:40"))];
        // 100 seconds = 1.6666..m
        assert_eq!(sum_minutes_for(&records, "Ravi K"), 1.67);
    }
}
