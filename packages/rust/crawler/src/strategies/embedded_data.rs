//! Embedded-data strategy: the Next.js hydration payload.

use std::sync::LazyLock;

use super::{ExtractionStrategy, ExtractorConfig, Hydration, PageSource, records_from_items};
use crate::tree;
use careerwatch_shared::JobRecord;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Known locations of the job list inside the hydration payload, probed in order.
pub const JOB_LIST_PATHS: &[&[&str]] = &[
    &["props", "pageProps", "jobs"],
    &["props", "pageProps", "data", "jobs"],
    &["props", "pageProps", "initialData", "jobs"],
    &["props", "pageProps", "jobsData"],
    &["props", "pageProps", "data"],
];

/// Inline `window.__NEXT_DATA__ = {...}` assignment.
static NEXT_DATA_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"window\.__NEXT_DATA__\s*=\s*").unwrap());

/// Reads the job list from a fixed set of key-paths in the hydration payload.
pub struct EmbeddedDataStrategy;

impl ExtractionStrategy for EmbeddedDataStrategy {
    fn extract(&self, page: &PageSource<'_>, config: &ExtractorConfig) -> Option<Vec<JobRecord>> {
        let Hydration::Parsed(data) = page.hydration() else {
            debug!("no usable hydration payload");
            return None;
        };

        let (path, items) = resolve_job_list(data)?;
        let jobs = records_from_items(items, config);
        debug!(path = %path.join("."), items = items.len(), jobs = jobs.len(), "key-path resolved");

        // The first resolved list is authoritative, even if none of its items convert.
        if jobs.is_empty() { None } else { Some(jobs) }
    }

    fn name(&self) -> &str {
        "embedded-data"
    }
}

/// The first known key-path that holds a non-empty list.
pub(crate) fn resolve_job_list(data: &Value) -> Option<(&'static [&'static str], &Vec<Value>)> {
    JOB_LIST_PATHS.iter().find_map(|path| {
        tree::lookup(data, path)
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty())
            .map(|items| (*path, items))
    })
}

/// Find and parse the hydration payload.
///
/// Looks for `<script id="__NEXT_DATA__">` first, then for an inline
/// `window.__NEXT_DATA__ = ` assignment anywhere in the markup.
pub(crate) fn locate_hydration(doc: &Html, markup: &str) -> Hydration {
    let script_sel = Selector::parse("script#__NEXT_DATA__").unwrap();
    if let Some(script) = doc.select(&script_sel).next() {
        let payload = script.text().collect::<String>();
        return match serde_json::from_str::<Value>(&payload) {
            Ok(value) => Hydration::Parsed(value),
            Err(e) => Hydration::Malformed(format!("__NEXT_DATA__ script: {e}")),
        };
    }

    if let Some(m) = NEXT_DATA_ASSIGNMENT.find(markup) {
        // Parse exactly one JSON value after the `=`; whatever follows is ignored.
        let rest = &markup[m.end()..];
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        return match values.next() {
            Some(Ok(value)) => Hydration::Parsed(value),
            Some(Err(e)) => Hydration::Malformed(format!("window.__NEXT_DATA__: {e}")),
            None => Hydration::Malformed("window.__NEXT_DATA__: empty assignment".into()),
        };
    }

    Hydration::Absent
}
