//! End-to-end report retrieval for one issuer
//!
//! Annual reports are fetched for the trailing completed fiscal years. Interim
//! reports (Q1, semi-annual, Q3) are fetched for the current year, with a
//! fallback to the previous year to cover publication lag.

use crate::cninfo::{fetch_all, Announcement, DisclosureSource};
use crate::config::{Config, RateLimits};
use crate::models::{FetchOutcome, IssuerRecord, PeriodKind, ReportingPeriod};
use crate::query::build_period_query;
use crate::selector::select;
use crate::storage::Storage;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What happened for a single reporting period
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodOutcome {
    /// No candidate passed the title rules
    NotFound,
    /// A document was selected; `None` when it could not be saved locally
    Selected(Option<PathBuf>),
}

/// Result of one sweep over the interim periods of a year
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodicSweep {
    /// Number of periods for which a document was selected
    pub selected: usize,
    pub files: Vec<PathBuf>,
}

/// Drives queries, selection and downloads against a [`DisclosureSource`]
pub struct ReportFetcher<S> {
    source: S,
    storage: Storage,
    page_size: u32,
    annual_years: i32,
    rate_limits: RateLimits,
}

impl<S: DisclosureSource> ReportFetcher<S> {
    pub fn new(source: S, storage: Storage, config: &Config) -> Self {
        Self {
            source,
            storage,
            page_size: config.http.page_size,
            annual_years: config.annual_years,
            rate_limits: config.rate_limits.clone(),
        }
    }

    /// Fetch everything for `issuer`, treating `current_year` as "now"
    pub async fn run(&self, issuer: &IssuerRecord, current_year: i32) -> FetchOutcome {
        let years: Vec<i32> = (current_year - self.annual_years..current_year).collect();
        info!("Downloading annual reports for: {:?}", years);
        let mut files = self.fetch_annual_reports(issuer, &years).await;

        info!("Downloading periodic reports (Q1, semi-annual, Q3)...");
        files.extend(self.fetch_periodic_with_fallback(issuer, current_year).await);

        FetchOutcome {
            stock_code: issuer.code.clone(),
            stock_name: issuer.name.clone(),
            market: issuer.market,
            output_dir: self.storage.output_dir().to_path_buf(),
            files,
        }
    }

    /// One annual report per fiscal year in `years`
    pub async fn fetch_annual_reports(&self, issuer: &IssuerRecord, years: &[i32]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for &year in years {
            if let PeriodOutcome::Selected(Some(path)) =
                self.fetch_period(issuer, &ReportingPeriod::annual(year)).await
            {
                files.push(path);
            }
        }
        files
    }

    /// Interim reports of `current_year`, falling back to the year before.
    ///
    /// Nothing selected: the previous year replaces the current one. Some but
    /// not all selected: the previous year's matches are appended, which may
    /// repeat a period kind across the two years.
    pub async fn fetch_periodic_with_fallback(&self, issuer: &IssuerRecord, current_year: i32) -> Vec<PathBuf> {
        let current = self.fetch_periodic_reports(issuer, current_year).await;
        let previous_year = current_year - 1;

        if current.selected == 0 {
            info!("No {} reports yet, trying {}...", current_year, previous_year);
            return self.fetch_periodic_reports(issuer, previous_year).await.files;
        }

        let mut files = current.files;
        if current.selected < PeriodKind::PERIODIC.len() {
            info!("Checking {} for additional reports...", previous_year);
            files.extend(self.fetch_periodic_reports(issuer, previous_year).await.files);
        }
        files
    }

    /// Q1, semi-annual and Q3 reports of a single year
    pub async fn fetch_periodic_reports(&self, issuer: &IssuerRecord, year: i32) -> PeriodicSweep {
        let mut sweep = PeriodicSweep::default();
        for kind in PeriodKind::PERIODIC {
            if let PeriodOutcome::Selected(path) = self.fetch_period(issuer, &ReportingPeriod::new(year, kind)).await {
                sweep.selected += 1;
                sweep.files.extend(path);
            }
        }
        sweep
    }

    /// Query, select and download the document for one period
    pub async fn fetch_period(&self, issuer: &IssuerRecord, period: &ReportingPeriod) -> PeriodOutcome {
        let payload = build_period_query(issuer, period, self.page_size);
        let candidates = fetch_all(&self.source, &payload).await;
        debug!("{} candidates for {} {}", candidates.len(), issuer.code, period);

        match select(&candidates, period, issuer.market) {
            Some(announcement) => {
                debug!(
                    "Selected {} ({}, published {})",
                    announcement.announcement_title,
                    announcement.announcement_id,
                    announcement
                        .published_on()
                        .map_or_else(|| "unknown".to_string(), |d| d.to_string())
                );
                let path = self.download(announcement).await;
                if path.is_some() {
                    info!("✅ Downloaded: {}", period);
                }
                PeriodOutcome::Selected(path)
            }
            None => {
                debug!("No matching document for {} {}", issuer.code, period);
                PeriodOutcome::NotFound
            }
        }
    }

    /// Save the announcement's PDF, skipping files already on disk.
    /// Failures are logged and yield `None`.
    async fn download(&self, announcement: &Announcement) -> Option<PathBuf> {
        if !announcement.is_pdf() {
            warn!(
                "Skipping {}: attachment type is {}",
                announcement.announcement_title,
                announcement.adjunct_type.as_deref().unwrap_or("unknown")
            );
            return None;
        }

        let path = self.storage.path_for(announcement);
        if path.exists() {
            debug!("Already present: {}", path.display());
            return Some(path);
        }

        info!("Downloading: {}", announcement.announcement_title);
        let result = match self.source.fetch_document(&announcement.adjunct_url).await {
            Ok(content) => self.storage.write(&path, &content).map(|_| path),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(path) => {
                tokio::time::sleep(self.download_delay()).await;
                Some(path)
            }
            Err(e) => {
                warn!("✗ Download failed for {}: {}", announcement.announcement_title, e);
                None
            }
        }
    }

    fn download_delay(&self) -> Duration {
        let min = self.rate_limits.download_delay_min_ms;
        let max = self.rate_limits.download_delay_max_ms.max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cninfo::{AnnouncementPage, CninfoError};
    use crate::models::Market;
    use crate::query::QueryPayload;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory registry keyed by the `seDate` window of each query
    #[derive(Default)]
    struct FakeRegistry {
        windows: HashMap<String, Vec<Announcement>>,
        failing_documents: Vec<String>,
        queried: Mutex<Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with(mut self, window: &str, titles: &[(&str, &str)]) -> Self {
            let announcements = titles
                .iter()
                .map(|(id, title)| announcement(id, title, "PDF"))
                .collect();
            self.windows.insert(window.to_string(), announcements);
            self
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    fn announcement(id: &str, title: &str, adjunct_type: &str) -> Announcement {
        serde_json::from_value(serde_json::json!({
            "announcementId": id,
            "announcementTitle": title,
            "secCode": "600350",
            "secName": "山东高速",
            "adjunctUrl": format!("finalpage/{}.PDF", id),
            "adjunctType": adjunct_type,
        }))
        .unwrap()
    }

    #[async_trait]
    impl DisclosureSource for FakeRegistry {
        async fn query_page(&self, payload: &QueryPayload) -> Result<AnnouncementPage, CninfoError> {
            self.queried.lock().unwrap().push(payload.se_date.clone());
            Ok(AnnouncementPage {
                has_more: false,
                announcements: self.windows.get(&payload.se_date).cloned(),
                total_announcement: None,
            })
        }

        async fn fetch_document(&self, adjunct_url: &str) -> Result<Vec<u8>, CninfoError> {
            self.fetched.lock().unwrap().push(adjunct_url.to_string());
            if self.failing_documents.iter().any(|d| d == adjunct_url) {
                return Err(CninfoError::ApiError {
                    status_code: 404,
                    message: "Not Found".to_string(),
                });
            }
            Ok(b"%PDF-1.4".to_vec())
        }
    }

    fn issuer() -> IssuerRecord {
        IssuerRecord {
            code: "600350".to_string(),
            name: "山东高速".to_string(),
            org_id: "gssh0600350".to_string(),
            market: Market::Mainland,
        }
    }

    fn test_config() -> Config {
        Config {
            rate_limits: RateLimits::disabled(),
            ..Config::default()
        }
    }

    fn fetcher(registry: FakeRegistry, dir: &TempDir) -> ReportFetcher<FakeRegistry> {
        ReportFetcher::new(registry, Storage::new(dir.path()).unwrap(), &test_config())
    }

    const Q1_2025: &str = "2025-04-01~2025-05-31";
    const SEMI_2025: &str = "2025-08-01~2025-09-30";
    const Q3_2025: &str = "2025-10-01~2025-11-30";
    const Q1_2024: &str = "2024-04-01~2024-05-31";
    const SEMI_2024: &str = "2024-08-01~2024-09-30";
    const Q3_2024: &str = "2024-10-01~2024-11-30";

    fn file_names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_no_current_year_reports_falls_back_to_previous_year() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default()
            .with(Q1_2024, &[("q1", "2024年第一季度报告")])
            .with(SEMI_2024, &[("semi", "2024年半年度报告")])
            .with(Q3_2024, &[("q3", "2024年第三季度报告")]);
        let fetcher = fetcher(registry, &dir);

        let files = fetcher.fetch_periodic_with_fallback(&issuer(), 2025).await;

        assert_eq!(
            fetcher.source.queried(),
            vec![Q1_2025, SEMI_2025, Q3_2025, Q1_2024, SEMI_2024, Q3_2024]
        );
        assert_eq!(files.len(), 3);
    }

    #[tokio::test]
    async fn test_partial_current_year_merges_previous_year() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default()
            .with(Q1_2025, &[("q1-25", "2025年第一季度报告")])
            .with(Q3_2025, &[("q3-25", "2025年第三季度报告")])
            .with(SEMI_2024, &[("semi-24", "2024年半年度报告")])
            .with(Q3_2024, &[("q3-24", "2024年第三季度报告")]);
        let fetcher = fetcher(registry, &dir);

        let files = fetcher.fetch_periodic_with_fallback(&issuer(), 2025).await;

        assert_eq!(fetcher.source.queried().len(), 6);
        assert_eq!(
            file_names(&files),
            vec![
                "600350_山东高速_2025年第一季度报告_q1-25.pdf",
                "600350_山东高速_2025年第三季度报告_q3-25.pdf",
                "600350_山东高速_2024年半年度报告_semi-24.pdf",
                "600350_山东高速_2024年第三季度报告_q3-24.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn test_complete_current_year_skips_previous_year() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default()
            .with(Q1_2025, &[("q1", "2025年第一季度报告")])
            .with(SEMI_2025, &[("semi", "2025年半年度报告")])
            .with(Q3_2025, &[("q3", "2025年第三季度报告")]);
        let fetcher = fetcher(registry, &dir);

        let files = fetcher.fetch_periodic_with_fallback(&issuer(), 2025).await;

        assert_eq!(files.len(), 3);
        assert_eq!(fetcher.source.queried(), vec![Q1_2025, SEMI_2025, Q3_2025]);
    }

    #[tokio::test]
    async fn test_selection_counts_even_when_download_fails() {
        let dir = TempDir::new().unwrap();
        let mut registry = FakeRegistry::default()
            .with(Q1_2025, &[("q1", "2025年第一季度报告")])
            .with(SEMI_2025, &[("semi", "2025年半年度报告")])
            .with(Q3_2025, &[("q3", "2025年第三季度报告")]);
        registry.failing_documents.push("finalpage/semi.PDF".to_string());
        let fetcher = fetcher(registry, &dir);

        let files = fetcher.fetch_periodic_with_fallback(&issuer(), 2025).await;

        assert_eq!(files.len(), 2);
        assert_eq!(fetcher.source.queried().len(), 3);
    }

    #[tokio::test]
    async fn test_annual_reports_one_per_year() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default()
            .with(
                "2023-03-01~2023-06-30",
                &[("a1", "2022年年度报告摘要"), ("a2", "2022年年度报告"), ("a3", "2022年年度报告（更新后）")],
            )
            .with("2024-03-01~2024-06-30", &[("b1", "2023年年度报告（英文版）")]);
        let fetcher = fetcher(registry, &dir);

        let files = fetcher.fetch_annual_reports(&issuer(), &[2022, 2023]).await;

        assert_eq!(file_names(&files), vec!["600350_山东高速_2022年年度报告_a2.pdf"]);
        assert_eq!(fetcher.source.fetched(), vec!["finalpage/a2.PDF"]);
    }

    #[tokio::test]
    async fn test_existing_file_is_not_downloaded_again() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default().with("2024-03-01~2024-06-30", &[("a", "2023年年度报告")]);
        let fetcher = fetcher(registry, &dir);
        std::fs::write(dir.path().join("600350_山东高速_2023年年度报告_a.pdf"), b"cached").unwrap();

        let outcome = fetcher.fetch_period(&issuer(), &ReportingPeriod::annual(2023)).await;

        assert!(matches!(outcome, PeriodOutcome::Selected(Some(_))));
        assert!(fetcher.source.fetched().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_delay_only_after_fresh_download() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default().with("2024-03-01~2024-06-30", &[("a", "2023年年度报告")]);
        let config = Config {
            rate_limits: RateLimits {
                download_delay_min_ms: 500,
                download_delay_max_ms: 1500,
            },
            ..Config::default()
        };
        let fetcher = ReportFetcher::new(registry, Storage::new(dir.path()).unwrap(), &config);
        let period = ReportingPeriod::annual(2023);

        let start = tokio::time::Instant::now();
        let outcome = fetcher.fetch_period(&issuer(), &period).await;
        let waited = start.elapsed();
        assert!(matches!(outcome, PeriodOutcome::Selected(Some(_))));
        assert!(waited >= Duration::from_millis(500), "waited {:?}", waited);
        assert!(waited <= Duration::from_millis(1500), "waited {:?}", waited);

        // Second pass finds the file on disk and neither fetches nor waits
        let start = tokio::time::Instant::now();
        let outcome = fetcher.fetch_period(&issuer(), &period).await;
        assert!(matches!(outcome, PeriodOutcome::Selected(Some(_))));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(fetcher.source.fetched().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_download_does_not_wait() {
        let dir = TempDir::new().unwrap();
        let mut registry = FakeRegistry::default().with("2024-03-01~2024-06-30", &[("a", "2023年年度报告")]);
        registry.failing_documents.push("finalpage/a.PDF".to_string());
        let config = Config {
            rate_limits: RateLimits {
                download_delay_min_ms: 500,
                download_delay_max_ms: 500,
            },
            ..Config::default()
        };
        let fetcher = ReportFetcher::new(registry, Storage::new(dir.path()).unwrap(), &config);

        let start = tokio::time::Instant::now();
        let outcome = fetcher.fetch_period(&issuer(), &ReportingPeriod::annual(2023)).await;

        assert_eq!(outcome, PeriodOutcome::Selected(None));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_non_pdf_selection_yields_no_file() {
        let dir = TempDir::new().unwrap();
        let mut registry = FakeRegistry::default();
        registry.windows.insert(
            "2024-03-01~2024-06-30".to_string(),
            vec![
                announcement("html", "2023年年度报告", "HTML"),
                announcement("pdf", "2023年年度报告", "PDF"),
            ],
        );
        let fetcher = fetcher(registry, &dir);

        let outcome = fetcher.fetch_period(&issuer(), &ReportingPeriod::annual(2023)).await;

        assert_eq!(outcome, PeriodOutcome::Selected(None));
        assert!(fetcher.source.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_run_covers_trailing_five_years() {
        let dir = TempDir::new().unwrap();
        let registry = FakeRegistry::default()
            .with("2025-03-01~2025-06-30", &[("y24", "2024年年度报告")])
            .with("2021-03-01~2021-06-30", &[("y20", "2020年年度报告")])
            .with(Q1_2025, &[("q1", "2025年第一季度报告")])
            .with(SEMI_2025, &[("semi", "2025年半年度报告")])
            .with(Q3_2025, &[("q3", "2025年第三季度报告")]);
        let fetcher = fetcher(registry, &dir);

        let outcome = fetcher.run(&issuer(), 2025).await;

        let queried = fetcher.source.queried();
        assert_eq!(queried[0], "2021-03-01~2021-06-30");
        assert_eq!(queried[4], "2025-03-01~2025-06-30");
        assert_eq!(queried.len(), 8);
        assert_eq!(outcome.stock_code, "600350");
        assert_eq!(outcome.market, Market::Mainland);
        assert_eq!(outcome.output_dir, dir.path());
        assert_eq!(outcome.files.len(), 5);
    }
}
