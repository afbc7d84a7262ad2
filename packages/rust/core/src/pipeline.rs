//! One careers-page run: fetch → extract → filter → dedupe → notify → persist.

use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use careerwatch_crawler::{ExtractorConfig, JobExtractor, PageFetcher};
use careerwatch_notify::{NotificationMessage, NotificationSink};
use careerwatch_shared::{AppConfig, CareerWatchError, JobRecord, Result};
use careerwatch_storage::SeenJobStore;

use crate::filter::{Relevance, RelevanceFilter};

/// Why a run stopped before touching the seen set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The page could not be fetched or rendered.
    FetchFailed(String),
    /// The page came back but no strategy found any job in it.
    NoJobsExtracted,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(msg) => write!(f, "fetch failed: {msg}"),
            Self::NoJobsExtracted => f.write_str("no jobs extracted from the page"),
        }
    }
}

/// Counters for a run that reached the persistence step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Strategy that produced the job list.
    pub strategy: String,
    /// Jobs extracted from the page.
    pub fetched: usize,
    /// Jobs that passed the keyword filter.
    pub relevant: usize,
    /// Relevant jobs skipped because their title was already seen.
    pub already_seen: usize,
    /// Relevant jobs reported for the first time.
    pub new_jobs: Vec<JobRecord>,
    /// Messages the sink accepted, including the "no new jobs" summary. A
    /// disabled sink accepts every message without sending it.
    pub notified: usize,
    /// Messages whose delivery failed.
    pub notify_failures: usize,
    /// Whether the seen set reached disk.
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    Aborted(AbortReason),
}

/// A job as seen by `preview`: no notification, no persistence.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub job: JobRecord,
    pub relevance: Relevance,
    pub seen: bool,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the run has finished, either way.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Everything one run needs, wired once and reusable across runs.
pub struct Pipeline<F, N> {
    url: Url,
    company: String,
    fetcher: F,
    extractor: JobExtractor,
    filter: RelevanceFilter,
    store: SeenJobStore,
    notifier: N,
}

impl<F: PageFetcher, N: NotificationSink> Pipeline<F, N> {
    pub fn new(
        url: Url,
        company: impl Into<String>,
        fetcher: F,
        extractor: JobExtractor,
        filter: RelevanceFilter,
        store: SeenJobStore,
        notifier: N,
    ) -> Self {
        Self {
            url,
            company: company.into(),
            fetcher,
            extractor,
            filter,
            store,
            notifier,
        }
    }

    /// Wire a pipeline from the loaded config and the chosen boundaries.
    pub fn from_config(config: &AppConfig, fetcher: F, notifier: N) -> Result<Self> {
        let url = Url::parse(&config.site.careers_url).map_err(|e| {
            CareerWatchError::config(format!("site.careers_url is not a valid URL: {e}"))
        })?;

        Ok(Self::new(
            url,
            &config.site.company,
            fetcher,
            JobExtractor::new(ExtractorConfig::from_site(&config.site)?),
            RelevanceFilter::from_config(&config.keywords),
            SeenJobStore::new(config.storage.seen_file_path()),
            notifier,
        ))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn store(&self) -> &SeenJobStore {
        &self.store
    }

    /// Execute one full run.
    ///
    /// Only a fetch failure (including an empty extraction) aborts, and it
    /// does so before the seen set is loaded. Notification failures are
    /// counted and never stop the remaining notifications or the save.
    #[instrument(skip_all, fields(run_id = %Uuid::now_v7(), url = %self.url))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> RunOutcome {
        info!("starting run");
        let outcome = self.run_inner(progress).await;

        match &outcome {
            RunOutcome::Completed(report) => info!(
                fetched = report.fetched,
                relevant = report.relevant,
                new = report.new_jobs.len(),
                notify_failures = report.notify_failures,
                saved = report.saved,
                "run completed"
            ),
            RunOutcome::Aborted(reason) => error!(%reason, "run aborted"),
        }

        progress.done(&outcome);
        outcome
    }

    async fn run_inner(&self, progress: &dyn ProgressReporter) -> RunOutcome {
        // --- Fetch + extract ---
        progress.phase("Fetching careers page");
        let markup = match self.fetcher.fetch(&self.url).await {
            Ok(markup) => markup,
            Err(e) => return RunOutcome::Aborted(AbortReason::FetchFailed(e.to_string())),
        };

        progress.phase("Extracting jobs");
        let Some(extraction) = self.extractor.extract_detailed(&markup) else {
            return RunOutcome::Aborted(AbortReason::NoJobsExtracted);
        };

        let mut report = RunReport {
            strategy: extraction.strategy,
            fetched: extraction.jobs.len(),
            ..RunReport::default()
        };

        // --- Filter ---
        let relevant: Vec<JobRecord> = extraction
            .jobs
            .into_iter()
            .filter(|job| {
                let relevance = self.filter.classify(job);
                debug!(title = %job.title, %relevance, "classified");
                relevance.is_relevant()
            })
            .collect();
        report.relevant = relevant.len();
        info!(relevant = report.relevant, "relevant jobs found");

        // --- Dedupe ---
        let mut seen = self.store.load();
        for job in relevant {
            if seen.add(job.key()) {
                info!(title = %job.title, "new job found");
                report.new_jobs.push(job);
            } else {
                info!(title = %job.title, "job already seen");
                report.already_seen += 1;
            }
        }

        // --- Notify ---
        progress.phase("Sending notifications");
        let messages: Vec<NotificationMessage> = if report.new_jobs.is_empty() {
            info!("no new jobs found");
            vec![NotificationMessage::NoNewJobs]
        } else {
            report
                .new_jobs
                .iter()
                .map(|job| NotificationMessage::new_job(&self.company, job.clone()))
                .collect()
        };

        for message in &messages {
            match self.notifier.send(message).await {
                Ok(()) => report.notified += 1,
                Err(e) => {
                    warn!(message = %message.summary(), error = %e, "notification failed");
                    report.notify_failures += 1;
                }
            }
        }

        // --- Persist ---
        progress.phase("Saving seen jobs");
        report.saved = self.store.save(&seen);

        RunOutcome::Completed(report)
    }

    /// Fetch, extract and classify without notifying or saving.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn preview(&self, progress: &dyn ProgressReporter) -> Result<Vec<Candidate>> {
        progress.phase("Fetching careers page");
        let markup = self.fetcher.fetch(&self.url).await?;

        progress.phase("Extracting jobs");
        let jobs = self.extractor.extract(&markup);
        if jobs.is_empty() {
            return Err(CareerWatchError::parse("no jobs extracted from the page"));
        }

        let seen = self.store.load();
        Ok(jobs
            .into_iter()
            .map(|job| Candidate {
                relevance: self.filter.classify(&job),
                seen: seen.contains(job.key()),
                job,
            })
            .collect())
    }
}
