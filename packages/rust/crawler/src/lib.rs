//! Careers page fetching and job extraction.
//!
//! This crate provides:
//! - [`fetcher`]: the [`PageFetcher`] boundary (HTTP and headless-browser command)
//! - [`strategies`]: ordered extraction strategies and the [`JobExtractor`] driving them
//! - [`tree`]: depth-bounded search over untyped JSON

pub mod fetcher;
pub mod strategies;
pub mod tree;

pub use fetcher::{CommandPageFetcher, Fetcher, HttpPageFetcher, PageFetcher};
pub use strategies::{
    AnchorPairStrategy, EmbeddedDataStrategy, Extraction, ExtractionStrategy, ExtractorConfig,
    Hydration, JobExtractor, PageSource, RecursiveShapeStrategy,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn extractor() -> JobExtractor {
        JobExtractor::new(ExtractorConfig::default())
    }

    // -----------------------------------------------------------------------
    // Strategy selection
    // -----------------------------------------------------------------------

    #[test]
    fn rendered_listing_uses_anchor_pairs() {
        let extraction = extractor()
            .extract_detailed(&load_fixture("careers-anchors.html"))
            .expect("extraction");
        assert_eq!(extraction.strategy, "anchor-pair");

        let titles: Vec<&str> = extraction.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Senior Electrical Engineer",
                "Firmware Electrical Engineer",
                "Robotics Engineer",
                "Account Director",
            ]
        );
    }

    #[test]
    fn hydration_payload_uses_known_key_path() {
        let extraction = extractor()
            .extract_detailed(&load_fixture("careers-next-data.html"))
            .expect("extraction");
        assert_eq!(extraction.strategy, "embedded-data");
        assert_eq!(extraction.jobs.len(), 3);
        assert_eq!(extraction.jobs[0].title, "Hardware Systems Engineer");
    }

    #[test]
    fn unknown_payload_shape_falls_through_to_recursive_search() {
        let extraction = extractor()
            .extract_detailed(&load_fixture("careers-unknown-shape.html"))
            .expect("extraction");
        assert_eq!(extraction.strategy, "recursive-shape");

        let jobs = extraction.jobs;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Circuit Design Engineer");
        assert_eq!(jobs[1].apply_link, "https://jobs.ashbyhq.com/openai/bb02");
    }

    #[test]
    fn unrendered_shell_yields_nothing() {
        assert!(extractor().extract(&load_fixture("careers-empty.html")).is_empty());
    }

    // -----------------------------------------------------------------------
    // Link resolution
    // -----------------------------------------------------------------------

    #[test]
    fn anchor_links_are_paired_per_row() {
        let jobs = extractor().extract(&load_fixture("careers-anchors.html"));

        assert_eq!(
            jobs[0].career_link,
            "https://openai.com/careers/senior-electrical-engineer/"
        );
        assert_eq!(jobs[0].apply_link, "https://jobs.ashbyhq.com/openai/8c1e0a52");
        assert_eq!(jobs[2].apply_link, "https://jobs.ashbyhq.com/openai/5d2f9c31");
        // No apply link in the row: career link stands in.
        assert_eq!(jobs[3].apply_link, jobs[3].career_link);
    }

    #[test]
    fn embedded_career_links_are_resolved_against_origin() {
        let jobs = extractor().extract(&load_fixture("careers-next-data.html"));
        assert_eq!(
            jobs[1].career_link,
            "https://openai.com/careers/machine-learning-engineer-robotics/"
        );
        assert_eq!(jobs[1].apply_link, "https://jobs.ashbyhq.com/openai/aa02");
    }

    #[test]
    fn custom_site_prefixes() {
        let config = ExtractorConfig {
            origin: url::Url::parse("https://example.org").unwrap(),
            detail_path_prefix: "/jobs/".into(),
            apply_url_prefix: "https://apply.example.org/".into(),
        };
        let html = r#"<div><a href="/jobs/42">Hardware Lead</a><a href="https://apply.example.org/42">Apply</a></div>
                      <div><a href="/careers/ignored">Ignored</a></div>"#;

        let jobs = JobExtractor::new(config).extract(html);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].career_link, "https://example.org/jobs/42");
        assert_eq!(jobs[0].apply_link, "https://apply.example.org/42");
    }
}
