//! Announcement query construction and search-window policy

use crate::models::{IssuerRecord, Market, PeriodKind, ReportingPeriod};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Default number of announcements requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Inclusive publication-date range searched for a reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    fn from_ymd(start: (i32, u32, u32), end: (i32, u32, u32)) -> Self {
        // Every (month, day) used below is a valid calendar date in any year.
        let date = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            start: date(start),
            end: date(end),
        }
    }

    /// Publication window for `period` in `market`.
    ///
    /// Mainland annual reports for fiscal year Y are filed in spring of Y+1.
    /// Hong Kong issuers may file within the fiscal year itself, so their
    /// window opens on Jan 1 of Y. Interim windows are market independent.
    pub fn for_period(period: &ReportingPeriod, market: Market) -> Self {
        let year = period.year;
        match (period.kind, market) {
            (PeriodKind::Annual, Market::Mainland) => {
                Self::from_ymd((year + 1, 3, 1), (year + 1, 6, 30))
            }
            (PeriodKind::Annual, Market::HongKong) => {
                Self::from_ymd((year, 1, 1), (year + 1, 6, 30))
            }
            (PeriodKind::Q1, _) => Self::from_ymd((year, 4, 1), (year, 5, 31)),
            (PeriodKind::SemiAnnual, _) => Self::from_ymd((year, 8, 1), (year, 9, 30)),
            (PeriodKind::Q3, _) => Self::from_ymd((year, 10, 1), (year, 11, 30)),
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

/// Registry document-type bucket for mainland filings
pub fn category_for(kind: PeriodKind) -> &'static str {
    match kind {
        PeriodKind::Annual => "category_ndbg_szsh",
        PeriodKind::Q1 => "category_yjdbg_szsh",
        PeriodKind::SemiAnnual => "category_bndbg_szsh",
        PeriodKind::Q3 => "category_sjdbg_szsh",
    }
}

/// Title substring used to narrow mainland searches
pub fn search_key_for(period: &ReportingPeriod) -> String {
    match period.kind {
        PeriodKind::Annual => format!("{}年年度报告", period.year),
        PeriodKind::Q1 => "一季度报告".to_string(),
        PeriodKind::SemiAnnual => "半年度报告".to_string(),
        PeriodKind::Q3 => "三季度报告".to_string(),
    }
}

/// Form body of the announcement query endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    /// Page cursor; the pagination driver advances it before each request
    pub page_num: u32,
    pub page_size: u32,
    pub column: String,
    pub tab_name: String,
    pub plate: String,
    /// `"{code},{orgId}"`
    pub stock: String,
    pub searchkey: String,
    pub secid: String,
    /// `;`-joined category tokens
    pub category: String,
    pub trade: String,
    /// `"start~end"`
    pub se_date: String,
    pub sort_name: String,
    pub sort_type: String,
    #[serde(rename = "isHLtitle")]
    pub is_hl_title: bool,
}

/// Build a market-aware query for one issuer and search window.
///
/// Hong Kong queries ignore `categories` and `search_key`: the registry does
/// not filter that market by category or keyword, so every announcement in
/// the window comes back and the selector sorts them out by title.
pub fn build_query(
    issuer: &IssuerRecord,
    market: Market,
    window: &DateWindow,
    categories: &[&str],
    search_key: &str,
    page_size: u32,
) -> QueryPayload {
    let (category, searchkey) = match market {
        Market::HongKong => (String::new(), String::new()),
        Market::Mainland => (categories.join(";"), search_key.to_string()),
    };

    QueryPayload {
        page_num: 0,
        page_size,
        column: market.column().to_string(),
        tab_name: "fulltext".to_string(),
        plate: String::new(),
        stock: format!("{},{}", issuer.code, issuer.org_id),
        searchkey,
        secid: String::new(),
        category,
        trade: String::new(),
        se_date: window.to_string(),
        sort_name: String::new(),
        sort_type: String::new(),
        is_hl_title: false,
    }
}

/// Query for a reporting period using the standard category and search key
pub fn build_period_query(issuer: &IssuerRecord, period: &ReportingPeriod, page_size: u32) -> QueryPayload {
    let window = DateWindow::for_period(period, issuer.market);
    build_query(
        issuer,
        issuer.market,
        &window,
        &[category_for(period.kind)],
        &search_key_for(period),
        page_size,
    )
}
