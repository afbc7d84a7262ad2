//! Extraction strategy trait and the ordered extractor that drives it.
//!
//! A careers page is turned into [`JobRecord`]s by trying each strategy in
//! priority order; the first one that yields a non-empty list wins. Markup
//! that none of them understand produces an empty list, never an error.

mod anchor_pair;
mod embedded_data;
mod recursive_shape;

use std::cell::OnceCell;

use careerwatch_shared::{CareerWatchError, JobRecord, Result, SiteConfig};
use scraper::Html;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

pub use anchor_pair::AnchorPairStrategy;
pub use embedded_data::{EmbeddedDataStrategy, JOB_LIST_PATHS};
pub use recursive_shape::{JOB_FIELDS, MAX_SEARCH_DEPTH, RecursiveShapeStrategy};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Site-specific knobs shared by all strategies.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Origin that relative posting links are resolved against.
    pub origin: Url,
    /// `href` prefix of a posting detail link, e.g. `/careers/`.
    pub detail_path_prefix: String,
    /// `href` prefix of an external application link, e.g. `https://jobs.`.
    pub apply_url_prefix: String,
}

impl ExtractorConfig {
    /// Build from the `[site]` config section.
    pub fn from_site(site: &SiteConfig) -> Result<Self> {
        let origin = Url::parse(&site.origin).map_err(|e| {
            CareerWatchError::config(format!("site.origin '{}': {e}", site.origin))
        })?;

        Ok(Self {
            origin,
            detail_path_prefix: site.detail_path_prefix.clone(),
            apply_url_prefix: site.apply_url_prefix.clone(),
        })
    }

    /// Resolve a possibly-relative link against the origin.
    pub(crate) fn resolve(&self, href: &str) -> Option<String> {
        self.origin.join(href.trim()).ok().map(String::from)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default()).expect("default site config is valid")
    }
}

// ---------------------------------------------------------------------------
// Page source
// ---------------------------------------------------------------------------

/// State of the embedded hydration payload on a page.
#[derive(Debug, Clone)]
pub enum Hydration {
    /// No hydration marker on the page.
    Absent,
    /// The marker was found but its payload did not parse.
    Malformed(String),
    /// The parsed payload.
    Parsed(Value),
}

/// Parsed markup handed to every strategy.
///
/// The DOM is parsed once; the hydration payload is located and parsed
/// lazily, the first time a strategy asks for it.
pub struct PageSource<'a> {
    markup: &'a str,
    doc: Html,
    hydration: OnceCell<Hydration>,
}

impl<'a> PageSource<'a> {
    /// Parse `markup` as an HTML document.
    pub fn new(markup: &'a str) -> Self {
        Self {
            markup,
            doc: Html::parse_document(markup),
            hydration: OnceCell::new(),
        }
    }

    /// The parsed DOM.
    pub fn document(&self) -> &Html {
        &self.doc
    }

    /// The embedded hydration payload, parsed on first access.
    pub fn hydration(&self) -> &Hydration {
        self.hydration
            .get_or_init(|| embedded_data::locate_hydration(&self.doc, self.markup))
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One way of pulling job records out of a careers page.
///
/// Strategies are tried in priority order by [`JobExtractor`]. Returning
/// `None` or an empty list hands over to the next strategy.
pub trait ExtractionStrategy: Send + Sync {
    /// Try to extract records from the page.
    fn extract(&self, page: &PageSource<'_>, config: &ExtractorConfig) -> Option<Vec<JobRecord>>;

    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Records produced by the winning strategy.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Name of the strategy that produced the records.
    pub strategy: String,
    /// The extracted records, in page order.
    pub jobs: Vec<JobRecord>,
}

/// Holds the strategies in priority order.
pub struct JobExtractor {
    config: ExtractorConfig,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl JobExtractor {
    /// Create an extractor with the built-in strategies:
    /// anchor pairs, then embedded data key-paths, then the recursive shape search.
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            strategies: vec![
                Box::new(AnchorPairStrategy),
                Box::new(EmbeddedDataStrategy),
                Box::new(RecursiveShapeStrategy),
            ],
        }
    }

    /// Extract job records from `markup`. Empty when no strategy succeeds.
    pub fn extract(&self, markup: &str) -> Vec<JobRecord> {
        self.extract_detailed(markup)
            .map(|extraction| extraction.jobs)
            .unwrap_or_default()
    }

    /// Like [`extract`](Self::extract) but also reports which strategy won.
    pub fn extract_detailed(&self, markup: &str) -> Option<Extraction> {
        let page = PageSource::new(markup);

        for strategy in &self.strategies {
            match strategy.extract(&page, &self.config) {
                Some(jobs) if !jobs.is_empty() => {
                    info!(
                        strategy = strategy.name(),
                        count = jobs.len(),
                        "extracted jobs"
                    );
                    return Some(Extraction {
                        strategy: strategy.name().to_string(),
                        jobs,
                    });
                }
                _ => debug!(strategy = strategy.name(), "strategy found nothing"),
            }
        }

        if let Hydration::Malformed(reason) = page.hydration() {
            warn!(%reason, "embedded page data was malformed");
        }
        warn!(markup_len = markup.len(), "could not find job data in the page");
        None
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Convert a list of embedded job objects into records.
///
/// Items that are not objects or lack a non-blank string `title` are dropped.
/// Relative career links are resolved against the origin, and a missing
/// apply link falls back to the career link.
pub(crate) fn records_from_items(items: &[Value], config: &ExtractorConfig) -> Vec<JobRecord> {
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let title = obj.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }

            let field = |camel: &str, snake: &str| {
                obj.get(camel)
                    .or_else(|| obj.get(snake))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            };

            let raw_career = field("careerLink", "career_link");
            let career_link = if raw_career.is_empty() {
                raw_career
            } else {
                config.resolve(&raw_career).unwrap_or(raw_career)
            };

            let apply_link = match field("applyLink", "apply_link") {
                link if link.is_empty() => career_link.clone(),
                link => link,
            };

            Some(JobRecord::new(title, apply_link, career_link))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_are_converted_leniently() {
        let items = vec![
            json!({"title": "Hardware Engineer", "careerLink": "/careers/hw", "applyLink": "https://jobs.example.com/1"}),
            json!({"title": "  Robotics Lead  ", "career_link": "https://openai.com/careers/rl"}),
            json!({"title": ""}),
            json!({"name": "no title"}),
            json!("just a string"),
        ];

        let jobs = records_from_items(&items, &ExtractorConfig::default());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].career_link, "https://openai.com/careers/hw");
        assert_eq!(jobs[0].apply_link, "https://jobs.example.com/1");
        assert_eq!(jobs[1].title, "Robotics Lead");
        assert_eq!(jobs[1].apply_link, "https://openai.com/careers/rl");
    }

    #[test]
    fn malformed_markup_yields_nothing() {
        let extractor = JobExtractor::new(ExtractorConfig::default());
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("<<<>>> not html at all <a href=").is_empty());
        assert!(extractor.extract_detailed("<html><body></body></html>").is_none());
    }

    #[test]
    fn resolve_handles_relative_and_absolute_links() {
        let config = ExtractorConfig::default();
        assert_eq!(
            config.resolve("/careers/x").as_deref(),
            Some("https://openai.com/careers/x")
        );
        assert_eq!(
            config.resolve("https://jobs.example.com/a").as_deref(),
            Some("https://jobs.example.com/a")
        );
    }
}
