//! SES notification mailer
//!
//! Plain-text, best-effort sends. Every public method swallows and
//! logs failures; notification mail must never fail a request or a
//! scheduler run. Handlers that should not wait on SES wrap the call
//! in `tokio::spawn`.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

type SendResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle on the state. `hr_email` unset silently drops HR alerts.
#[derive(Clone)]
pub struct Mailer {
    ses: SesClient,
    from: String,
    hr_email: Option<String>,
}

impl Mailer {
    pub fn new(ses: SesClient, from: String, hr_email: Option<String>) -> Self {
        Self {
            ses,
            from,
            hr_email,
        }
    }

    pub async fn login_notice(&self, to: &str, name: &str, login_at: &str) {
        if let Err(e) = send_login_notice(&self.ses, &self.from, to, name, login_at).await {
            tracing::warn!(error = %e, to, "Failed to send login notification");
        }
    }

    pub async fn logout_notice(&self, to: &str, name: &str, logout_at: &str, hours: f64) {
        if let Err(e) = send_logout_notice(&self.ses, &self.from, to, name, logout_at, hours).await
        {
            tracing::warn!(error = %e, to, "Failed to send logout notification");
        }
    }

    pub async fn reason_alert(&self, emp_name: &str, emp_id: &str, date: &str, reason: &str) {
        let Some(hr) = self.hr_email.as_deref() else {
            tracing::debug!("HR email not configured, skipping reason alert");
            return;
        };
        if let Err(e) = send_reason_alert(&self.ses, &self.from, hr, emp_name, emp_id, date, reason).await
        {
            tracing::warn!(error = %e, "Failed to send target reason alert");
        }
    }

    pub async fn absentee_digest(&self, date: &str, names: &[String]) {
        let Some(hr) = self.hr_email.as_deref() else {
            tracing::debug!("HR email not configured, skipping absentee digest");
            return;
        };
        if let Err(e) = send_absentee_digest(&self.ses, &self.from, hr, date, names).await {
            tracing::warn!(error = %e, "Failed to send absentee digest");
        }
    }

    pub async fn meeting_digest(&self, to: &str, name: &str, lines: &[String]) {
        if let Err(e) = send_meeting_digest(&self.ses, &self.from, to, name, lines).await {
            tracing::warn!(error = %e, to, "Failed to send meeting digest");
        }
    }

    pub async fn meeting_reminder(&self, to: &str, title: &str, starts_at: &str, location: &str) {
        if let Err(e) =
            send_meeting_reminder(&self.ses, &self.from, to, title, starts_at, location).await
        {
            tracing::warn!(error = %e, to, "Failed to send meeting reminder");
        }
    }
}

async fn send_login_notice(
    ses: &SesClient,
    from: &str,
    to: &str,
    name: &str,
    login_at: &str,
) -> SendResult {
    let subject = Content::builder().data("Attendance: logged in").build()?;

    let body_text = format!(
        "Hi {name},\n\n\
         Your attendance login was recorded at {login_at}.\n\
         Remember to log out at the end of your day."
    );

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(to, "Login notification sent");
    Ok(())
}

async fn send_logout_notice(
    ses: &SesClient,
    from: &str,
    to: &str,
    name: &str,
    logout_at: &str,
    hours: f64,
) -> SendResult {
    let subject = Content::builder().data("Attendance: logged out").build()?;

    let body_text = format!(
        "Hi {name},\n\n\
         Your attendance logout was recorded at {logout_at}.\n\
         Hours worked today: {hours}."
    );

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(to, "Logout notification sent");
    Ok(())
}

async fn send_reason_alert(
    ses: &SesClient,
    from: &str,
    to: &str,
    emp_name: &str,
    emp_id: &str,
    date: &str,
    reason: &str,
) -> SendResult {
    let subject = Content::builder()
        .data(format!("Target reason submitted: {emp_name} ({date})"))
        .build()?;

    let body_text = format!(
        "{emp_name} ({emp_id}) submitted a reason for the incomplete\n\
         daily target on {date}:\n\n\
         {reason}"
    );

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(emp_id, date, "Target reason alert sent");
    Ok(())
}

async fn send_absentee_digest(
    ses: &SesClient,
    from: &str,
    to: &str,
    date: &str,
    names: &[String],
) -> SendResult {
    let subject = Content::builder()
        .data(format!("Absentee report for {date}"))
        .build()?;

    let list = names
        .iter()
        .map(|n| format!("  - {n}"))
        .collect::<Vec<_>>()
        .join("\n");
    let body_text = format!(
        "The following employees had no attendance record on {date}\n\
         and were marked absent:\n\n\
         {list}"
    );

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(date, count = names.len(), "Absentee digest sent");
    Ok(())
}

async fn send_meeting_digest(
    ses: &SesClient,
    from: &str,
    to: &str,
    name: &str,
    lines: &[String],
) -> SendResult {
    let subject = Content::builder().data("Your meetings today").build()?;

    let list = lines
        .iter()
        .map(|l| format!("  - {l}"))
        .collect::<Vec<_>>()
        .join("\n");
    let body_text = format!("Hi {name},\n\nYour meetings scheduled for today:\n\n{list}");

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(to, meetings = lines.len(), "Meeting digest sent");
    Ok(())
}

async fn send_meeting_reminder(
    ses: &SesClient,
    from: &str,
    to: &str,
    title: &str,
    starts_at: &str,
    location: &str,
) -> SendResult {
    let subject = Content::builder()
        .data(format!("Reminder: {title} at {starts_at}"))
        .build()?;

    let body_text = format!(
        "Your meeting \"{title}\" starts at {starts_at}.\n\
         Location: {location}."
    );

    send_plain(ses, from, to, subject, body_text).await?;
    tracing::info!(to, title, "Meeting reminder sent");
    Ok(())
}

async fn send_plain(
    ses: &SesClient,
    from: &str,
    to: &str,
    subject: Content,
    body_text: String,
) -> SendResult {
    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    Ok(())
}
