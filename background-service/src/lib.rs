use chrono::{DateTime, Utc};
use github_client::{IssueExtractor, IssueListingClient};
use issuewatch_core::{AppConfig, CoreError, ErrorReporter};
use seen_store::SeenStore;
use std::time::Duration;
use tracing::{debug, info};
use webhook_notifier::WebhookNotifier;

/// What a single poll cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub matched: usize,
    pub already_seen: usize,
    pub notified: usize,
    pub failed_deliveries: usize,
    pub saved: bool,
}

pub struct BackgroundService {
    listing_client: IssueListingClient,
    extractor: IssueExtractor,
    store: SeenStore,
    notifier: WebhookNotifier,
    reporter: ErrorReporter,
    polling_interval: Duration,
    notify_delay: Duration,
    last_checked: Option<DateTime<Utc>>,
}

impl BackgroundService {
    /// Validates `config` and wires up the services it describes.
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        config.validate()?;

        Ok(Self {
            listing_client: IssueListingClient::new(config.github_repo.trim())?,
            extractor: IssueExtractor::new(&config.source_host)?,
            store: SeenStore::new(&config.cache_file),
            notifier: WebhookNotifier::new(config.webhook_targets()),
            reporter: ErrorReporter::new(),
            polling_interval: config.refresh_interval,
            notify_delay: config.notify_delay,
            last_checked: None,
        })
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Polls forever, one cycle at a time, sleeping `polling_interval` after
    /// each. Cycle failures are reported and the loop carries on.
    pub async fn start(&mut self) -> Result<(), CoreError> {
        info!(
            "Watching {} every {:?}, notifying {} target(s)",
            self.listing_client.listing_url(),
            self.polling_interval,
            self.notifier.targets().len()
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => info!(
                    "Cycle complete: {} matched, {} already seen, {} notified, {} failed deliveries",
                    report.matched, report.already_seen, report.notified, report.failed_deliveries
                ),
                Err(e) => self.reporter.report_error(&e),
            }

            tokio::time::sleep(self.polling_interval).await;
        }
    }

    /// Fetch, extract, filter against the seen set, notify, persist.
    ///
    /// Fetch and load failures abort before anything is sent or written. A
    /// failed save is reported but still returns `Ok`.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CoreError> {
        match self.last_checked.replace(Utc::now()) {
            Some(previous) => info!(
                "Checking for new issues (last checked {})",
                previous.to_rfc3339()
            ),
            None => info!("Checking for new issues..."),
        }

        let body = self.listing_client.fetch_listing().await?;

        info!("Parsing issues...");
        let issues = self.extractor.extract(&body)?;

        let mut seen = self.store.load().await?;
        let mut report = CycleReport {
            matched: issues.len(),
            ..Default::default()
        };

        for issue in &issues {
            if seen.contains(&issue.id) {
                debug!(
                    "Issue already notified: ID={}, Title={}, URL={}",
                    issue.id, issue.title, issue.url
                );
                report.already_seen += 1;
                continue;
            }

            info!(
                "Found new issue: ID={}, Title={}, URL={}",
                issue.id, issue.title, issue.url
            );
            let outcomes = self.notifier.notify(issue).await;
            report.failed_deliveries += outcomes.iter().filter(|o| !o.is_delivered()).count();
            report.notified += 1;

            // Marked seen whether or not any target accepted it.
            seen.insert(issue.id.clone());

            tokio::time::sleep(self.notify_delay).await;
        }

        report.saved = match self.store.save(&seen).await {
            Ok(()) => true,
            Err(e) => {
                self.reporter.report_error(&e);
                false
            }
        };

        Ok(report)
    }
}
