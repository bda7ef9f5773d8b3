//! Title heuristics that pick the one authoritative filing per reporting period.
//!
//! A query window usually returns several announcements for the same period:
//! the full report, its summary, an English edition, corrections and revised
//! versions, and for Hong Kong issuers every other filing of the window too.
//! Each market carries a [`TitleRules`] table describing its vocabulary; the
//! selection algorithm itself is market agnostic.

use crate::cninfo::Announcement;
use crate::models::{Market, PeriodKind, ReportingPeriod};

/// How an annual report title has to reference its fiscal year
#[derive(Debug)]
pub enum AnnualRule {
    /// Title contains `{year}` immediately followed by one of the suffixes
    YearSuffix(&'static [&'static str]),
    /// Title mentions the year (arabic or Chinese numerals), one of the
    /// annual markers, and none of the interim markers
    YearWithMarker {
        annual_markers: &'static [&'static str],
        interim_markers: &'static [&'static str],
    },
}

/// Per-market title vocabulary. Markers are lowercase.
#[derive(Debug)]
pub struct TitleRules {
    /// Summary, English-only, correction and revision markers
    pub exclusion_markers: &'static [&'static str],
    pub annual: AnnualRule,
    pub q1: &'static [&'static str],
    pub semi_annual: &'static [&'static str],
    pub q3: &'static [&'static str],
}

static MAINLAND_RULES: TitleRules = TitleRules {
    exclusion_markers: &["摘要", "summary", "英文", "更正", "修订"],
    annual: AnnualRule::YearSuffix(&["年年度报告", "年年报"]),
    q1: &["一季度", "第一季度"],
    semi_annual: &["半年度报告", "中期报告"],
    q3: &["三季度", "第三季度"],
};

static HONGKONG_RULES: TitleRules = TitleRules {
    exclusion_markers: &["摘要", "summary", "英文", "更正", "修订", "修訂"],
    annual: AnnualRule::YearWithMarker {
        annual_markers: &["annual report", "年度报告", "年报", "年度報告", "年報"],
        interim_markers: &["季度", "半年度", "半年报", "半年報", "中期", "interim"],
    },
    q1: &["一季度", "第一季度"],
    semi_annual: &["半年度报告", "中期报告", "半年度報告", "中期報告"],
    q3: &["三季度", "第三季度"],
};

impl TitleRules {
    pub fn for_market(market: Market) -> &'static TitleRules {
        match market {
            Market::Mainland => &MAINLAND_RULES,
            Market::HongKong => &HONGKONG_RULES,
        }
    }

    fn periodic_markers(&self, kind: PeriodKind) -> &'static [&'static str] {
        match kind {
            PeriodKind::Annual => &[],
            PeriodKind::Q1 => self.q1,
            PeriodKind::SemiAnnual => self.semi_annual,
            PeriodKind::Q3 => self.q3,
        }
    }
}

const CHINESE_DIGITS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Spell a year digit by digit in Chinese numerals, e.g. 2023 -> 二零二三
pub fn to_chinese_year(year: i32) -> String {
    year.to_string()
        .chars()
        .map(|c| c.to_digit(10).map_or(c, |d| CHINESE_DIGITS[d as usize]))
        .collect()
}

fn contains_any(title: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| title.contains(m))
}

/// Whether `title` is the primary filing for `period` under `market` rules
pub fn is_primary_report(title: &str, period: &ReportingPeriod, market: Market) -> bool {
    let rules = TitleRules::for_market(market);
    let title = title.to_lowercase();

    if contains_any(&title, rules.exclusion_markers) {
        return false;
    }

    match period.kind {
        PeriodKind::Annual => match rules.annual {
            AnnualRule::YearSuffix(suffixes) => suffixes
                .iter()
                .any(|suffix| title.contains(&format!("{}{}", period.year, suffix))),
            AnnualRule::YearWithMarker {
                annual_markers,
                interim_markers,
            } => {
                let has_year = title.contains(&period.year.to_string())
                    || title.contains(&to_chinese_year(period.year));
                has_year
                    && contains_any(&title, annual_markers)
                    && !contains_any(&title, interim_markers)
            }
        },
        kind => contains_any(&title, rules.periodic_markers(kind)),
    }
}

/// First candidate, in registry order, that passes the title rules.
///
/// Registry order stands in for recency when several filings qualify.
pub fn select<'a>(
    candidates: &'a [Announcement],
    period: &ReportingPeriod,
    market: Market,
) -> Option<&'a Announcement> {
    candidates
        .iter()
        .find(|candidate| is_primary_report(&candidate.announcement_title, period, market))
}
