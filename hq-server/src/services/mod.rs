//! Service layer
//!
//! # Services
//!
//! - [`CallAnalyticsClient`] - call-analytics vendor client ([`TalkTimeSource`])
//! - [`Mailer`] - SES notification mail
//! - [`build_app`] - HTTP router and middleware assembly
//! - schedulers - absentee sweep, meeting digest, meeting reminders

pub mod call_analytics;
pub mod http;
pub mod mailer;
pub mod scheduler;

pub use call_analytics::{CallAnalyticsClient, CallAnalyticsConfig, TalkTimeSource};
pub use http::{build_app, build_router};
pub use mailer::Mailer;
pub use scheduler::{AbsenteeSweepScheduler, MeetingDigestScheduler, MeetingReminderScheduler};
