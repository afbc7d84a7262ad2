//! Recursive-shape strategy: any job-shaped list in the hydration payload.

use super::embedded_data::resolve_job_list;
use super::{ExtractionStrategy, ExtractorConfig, Hydration, PageSource, records_from_items};
use crate::tree;
use careerwatch_shared::JobRecord;
use tracing::debug;

/// Field names that mark an object as a job record.
pub const JOB_FIELDS: &[&str] = &["title", "applyLink", "careerLink"];

/// How deep below the payload root the search looks.
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Last resort when the payload exists but none of the known key-paths resolve:
/// take the first list whose first element looks like a job record. Stays out
/// of the way when a key-path did resolve.
pub struct RecursiveShapeStrategy;

impl ExtractionStrategy for RecursiveShapeStrategy {
    fn extract(&self, page: &PageSource<'_>, config: &ExtractorConfig) -> Option<Vec<JobRecord>> {
        let Hydration::Parsed(data) = page.hydration() else {
            return None;
        };

        if let Some((path, _)) = resolve_job_list(data) {
            debug!(path = %path.join("."), "known key-path resolved, skipping shape search");
            return None;
        }

        let items = tree::find_record_list(data, JOB_FIELDS, MAX_SEARCH_DEPTH)?;
        let jobs = records_from_items(items, config);
        debug!(items = items.len(), jobs = jobs.len(), "job-shaped list found");

        if jobs.is_empty() { None } else { Some(jobs) }
    }

    fn name(&self) -> &str {
        "recursive-shape"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::JobExtractor;

    #[test]
    fn finds_list_under_unknown_key() {
        let html = r#"<script id="__NEXT_DATA__">
            {"props": {"pageProps": {"listing": {"results": [
                {"title": "Electrical Engineer", "careerLink": "/careers/ee"}
            ]}}}}
        </script>"#;

        let page = PageSource::new(html);
        let jobs = RecursiveShapeStrategy
            .extract(&page, &ExtractorConfig::default())
            .expect("jobs");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].career_link, "https://openai.com/careers/ee");
    }

    #[test]
    fn skipped_when_a_known_path_resolves() {
        let html = r#"<script id="__NEXT_DATA__">
            {"props": {"pageProps": {
                "jobs": [{"id": 1}],
                "other": {"list": [{"title": "Stray Electrical Thing"}]}
            }}}
        </script>"#;

        let page = PageSource::new(html);
        assert!(RecursiveShapeStrategy
            .extract(&page, &ExtractorConfig::default())
            .is_none());
        assert!(JobExtractor::new(ExtractorConfig::default())
            .extract_detailed(html)
            .is_none());
    }

    #[test]
    fn needs_a_hydration_payload() {
        let page = PageSource::new("<html><body>[{\"title\": \"x\"}]</body></html>");
        assert!(RecursiveShapeStrategy
            .extract(&page, &ExtractorConfig::default())
            .is_none());
    }
}
