//! Anchor-pair strategy: posting links in the rendered DOM.

use super::{ExtractionStrategy, ExtractorConfig, PageSource};
use careerwatch_shared::JobRecord;
use scraper::{ElementRef, Selector};
use tracing::debug;

/// Pairs each posting detail anchor with the application anchor next to it.
///
/// The detail anchor's visible text is the title. The application link is
/// looked up in the anchor's immediate container; page-wide application links
/// are never borrowed, so without one in the container the career link
/// doubles as the apply link.
pub struct AnchorPairStrategy;

impl ExtractionStrategy for AnchorPairStrategy {
    fn extract(&self, page: &PageSource<'_>, config: &ExtractorConfig) -> Option<Vec<JobRecord>> {
        let doc = page.document();
        let anchor_sel = Selector::parse("a[href]").unwrap();

        let mut jobs = Vec::new();

        for anchor in doc.select(&anchor_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.starts_with(&config.detail_path_prefix) {
                continue;
            }

            let title = visible_text(&anchor);
            let Some(career_link) = config.resolve(href) else {
                debug!(href, "unresolvable posting link");
                continue;
            };
            if title.is_empty() {
                continue;
            }

            let apply_link = container_apply_link(&anchor, &anchor_sel, config)
                .unwrap_or_else(|| career_link.clone());

            jobs.push(JobRecord::new(title, apply_link, career_link));
        }

        debug!(count = jobs.len(), "anchor pairs found");
        if jobs.is_empty() { None } else { Some(jobs) }
    }

    fn name(&self) -> &str {
        "anchor-pair"
    }
}

/// First application link inside the anchor's parent element.
fn container_apply_link(
    anchor: &ElementRef<'_>,
    anchor_sel: &Selector,
    config: &ExtractorConfig,
) -> Option<String> {
    let parent = anchor.parent().and_then(ElementRef::wrap)?;
    parent
        .select(anchor_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with(&config.apply_url_prefix))
        .map(String::from)
}

/// Text content with each fragment trimmed and whitespace collapsed.
fn visible_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
