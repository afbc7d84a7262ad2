//! Keyword relevance policy over job titles.

use careerwatch_shared::{JobRecord, KeywordConfig};

/// Why a title was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relevance {
    /// Rejected: the title contains this avoid-keyword.
    Avoided(String),
    /// Accepted: the title contains this target-keyword.
    Targeted(String),
    /// Rejected: no target-keyword matched.
    Unmatched,
}

impl Relevance {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Self::Targeted(_))
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Avoided(kw) => write!(f, "avoided ({kw})"),
            Self::Targeted(kw) => write!(f, "targeted ({kw})"),
            Self::Unmatched => f.write_str("unmatched"),
        }
    }
}

/// Case-insensitive substring matching against target and avoid keywords.
///
/// Avoid-keywords always win. An empty target list accepts nothing.
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    target: Vec<String>,
    avoid: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<T, A>(target: T, avoid: A) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self {
            target: normalize(target),
            avoid: normalize(avoid),
        }
    }

    pub fn from_config(config: &KeywordConfig) -> Self {
        Self::new(&config.target, &config.avoid)
    }

    pub fn classify(&self, record: &JobRecord) -> Relevance {
        let title = record.title.to_lowercase();

        if let Some(kw) = self.avoid.iter().find(|kw| title.contains(kw.as_str())) {
            return Relevance::Avoided(kw.clone());
        }
        match self.target.iter().find(|kw| title.contains(kw.as_str())) {
            Some(kw) => Relevance::Targeted(kw.clone()),
            None => Relevance::Unmatched,
        }
    }

    pub fn is_relevant(&self, record: &JobRecord) -> bool {
        self.classify(record).is_relevant()
    }
}

fn normalize<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|kw| kw.as_ref().trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str) -> JobRecord {
        JobRecord::new(title, "", "")
    }

    fn ee_filter() -> RelevanceFilter {
        RelevanceFilter::new(["electrical"], ["firmware"])
    }

    #[test]
    fn target_keyword_accepts() {
        let filter = ee_filter();
        assert!(filter.is_relevant(&job("Senior Electrical Engineer")));
        assert_eq!(
            filter.classify(&job("Senior Electrical Engineer")),
            Relevance::Targeted("electrical".into())
        );
    }

    #[test]
    fn avoid_keyword_takes_precedence() {
        let filter = ee_filter();
        assert!(!filter.is_relevant(&job("Firmware Electrical Engineer")));
        assert_eq!(
            filter.classify(&job("Firmware Electrical Engineer")),
            Relevance::Avoided("firmware".into())
        );
    }

    #[test]
    fn matching_ignores_case_on_both_sides() {
        let filter = RelevanceFilter::new(["Machine Learning"], ["DATA CENTER"]);
        assert!(filter.is_relevant(&job("machine learning engineer, robotics")));
        assert!(!filter.is_relevant(&job("Data Center Machine Learning Lead")));
    }

    #[test]
    fn unmatched_title_is_rejected() {
        assert_eq!(ee_filter().classify(&job("Account Director")), Relevance::Unmatched);
    }

    #[test]
    fn empty_target_list_accepts_nothing() {
        let filter = RelevanceFilter::new(Vec::<String>::new(), ["firmware"]);
        assert!(!filter.is_relevant(&job("Electrical Engineer")));
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let filter = RelevanceFilter::new(["", "  ", "robotics"], [""]);
        assert!(!filter.is_relevant(&job("Account Director")));
        assert!(filter.is_relevant(&job("Robotics Engineer")));
    }

    #[test]
    fn default_config_policy() {
        let filter = RelevanceFilter::from_config(&KeywordConfig::default());
        assert!(filter.is_relevant(&job("Hardware Systems Engineer")));
        assert!(!filter.is_relevant(&job("Data Center Site Lead")));
        assert!(!filter.is_relevant(&job("Software Engineer, Frontend")));
    }
}
