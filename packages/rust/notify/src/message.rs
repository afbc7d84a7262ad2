//! Notification messages and their webhook embed representation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use careerwatch_shared::JobRecord;

/// Embed color for a new posting.
pub const NEW_JOB_COLOR: u32 = 0x00ff00;

/// Embed color for the "no new jobs" summary.
pub const NO_NEW_JOBS_COLOR: u32 = 0x808080;

const NO_NEW_JOBS_DESCRIPTION: &str = "No new relevant job postings were found in the latest scan.";

/// Something worth telling the user about after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationMessage {
    /// A relevant posting that was not seen before.
    NewJob { company: String, job: JobRecord },
    /// The run completed without any new relevant posting.
    NoNewJobs,
}

impl NotificationMessage {
    pub fn new_job(company: impl Into<String>, job: JobRecord) -> Self {
        Self::NewJob {
            company: company.into(),
            job,
        }
    }

    /// Short label for logs.
    pub fn summary(&self) -> &str {
        match self {
            Self::NewJob { job, .. } => &job.title,
            Self::NoNewJobs => "no new jobs",
        }
    }

    /// Render the message as a single embed stamped with `timestamp`.
    pub fn to_embed(&self, footer: &str, timestamp: DateTime<Utc>) -> Embed {
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        match self {
            Self::NewJob { company, job } => Embed {
                title: format!("New Job at {company}!"),
                description: Some(format!("**{}**", job.title)),
                url: Some(job.career_link.clone()).filter(|u| !u.is_empty()),
                color: NEW_JOB_COLOR,
                fields: vec![EmbedField {
                    name: "Apply Now".into(),
                    value: format!("[Click here to apply]({})", job.apply_link),
                    inline: false,
                }],
                footer: None,
                timestamp,
            },
            Self::NoNewJobs => Embed {
                title: "No New Jobs".into(),
                description: Some(NO_NEW_JOBS_DESCRIPTION.into()),
                url: None,
                color: NO_NEW_JOBS_COLOR,
                fields: Vec::new(),
                footer: Some(EmbedFooter {
                    text: footer.to_string(),
                }),
                timestamp,
            },
        }
    }

    /// The full request body posted to the webhook.
    pub fn to_payload(&self, username: &str, footer: &str, timestamp: DateTime<Utc>) -> WebhookPayload {
        WebhookPayload {
            username: username.to_string(),
            embeds: vec![self.to_embed(footer, timestamp)],
        }
    }
}

/// Request body: `{"username": ..., "embeds": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// ISO-8601, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0).unwrap()
    }

    #[test]
    fn new_job_payload() {
        let job = JobRecord::new(
            "Senior Electrical Engineer",
            "https://jobs.ashbyhq.com/openai/8c1e0a52",
            "https://openai.com/careers/senior-electrical-engineer/",
        );
        let payload = NotificationMessage::new_job("OpenAI", job).to_payload("Job Bot", "footer", at());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "username": "Job Bot",
                "embeds": [{
                    "title": "New Job at OpenAI!",
                    "description": "**Senior Electrical Engineer**",
                    "url": "https://openai.com/careers/senior-electrical-engineer/",
                    "color": 0x00ff00,
                    "fields": [{
                        "name": "Apply Now",
                        "value": "[Click here to apply](https://jobs.ashbyhq.com/openai/8c1e0a52)",
                        "inline": false
                    }],
                    "timestamp": "2026-03-02T13:00:00Z"
                }]
            })
        );
    }

    #[test]
    fn no_new_jobs_embed_carries_footer() {
        let embed = NotificationMessage::NoNewJobs.to_embed("OpenAI Careers Job Scraper", at());
        assert_eq!(embed.title, "No New Jobs");
        assert_eq!(embed.color, NO_NEW_JOBS_COLOR);
        assert_eq!(embed.footer.unwrap().text, "OpenAI Careers Job Scraper");
        assert!(embed.fields.is_empty());
        assert!(embed.url.is_none());
    }
}
