//! Core domain types for careerwatch.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobRecord
// ---------------------------------------------------------------------------

/// A discovered posting candidate.
///
/// The title is the identity key: two records with equal titles are the same
/// posting as far as deduplication is concerned, whatever their links say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Display title of the posting.
    pub title: String,
    /// URL of the external application form.
    #[serde(default, alias = "apply_link")]
    pub apply_link: String,
    /// URL of the canonical posting page.
    #[serde(default, alias = "career_link")]
    pub career_link: String,
}

impl JobRecord {
    /// Build a record from its three parts.
    pub fn new(
        title: impl Into<String>,
        apply_link: impl Into<String>,
        career_link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            apply_link: apply_link.into(),
            career_link: career_link.into(),
        }
    }

    /// The deduplication key.
    pub fn key(&self) -> &str {
        &self.title
    }

    /// A record is usable once it has a non-blank title.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl std::fmt::Display for JobRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.title, self.career_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_links() {
        let job = JobRecord::new(
            "Hardware Engineer",
            "https://jobs.ashbyhq.com/openai/123",
            "https://openai.com/careers/hardware-engineer",
        );
        let json = serde_json::to_value(&job).expect("serialize");
        assert_eq!(json["applyLink"], "https://jobs.ashbyhq.com/openai/123");
        assert_eq!(json["careerLink"], "https://openai.com/careers/hardware-engineer");
    }

    #[test]
    fn accepts_snake_case_aliases_and_missing_links() {
        let job: JobRecord = serde_json::from_str(
            r#"{"title": "Robotics Engineer", "career_link": "/careers/robotics"}"#,
        )
        .expect("deserialize");
        assert_eq!(job.title, "Robotics Engineer");
        assert_eq!(job.career_link, "/careers/robotics");
        assert!(job.apply_link.is_empty());
    }

    #[test]
    fn blank_title_is_invalid() {
        assert!(!JobRecord::new("   ", "", "").is_valid());
        assert!(JobRecord::new("Circuit Designer", "", "").is_valid());
    }
}
