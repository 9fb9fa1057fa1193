use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ProjectionError;
use crate::period;
use crate::projection::assumptions::QuarterActual;
use crate::types::Money;
use crate::ProjectionResult;

const COMPANY_CODE_KEYS: &[&str] = &["公司代號"];
const YEAR_KEYS: &[&str] = &["年度", "年"];
const QUARTER_KEYS: &[&str] = &["季別", "季", "季度"];
const NET_INCOME_KEYS: &[&str] = &[
    "稅後淨利",
    "綜合損益總額-稅後淨利",
    "本期稅後淨利",
    "本期綜合損益總額",
    "歸屬於母公司業主之淨利(損失)",
];
const EPS_KEYS: &[&str] = &["基本每股盈餘", "基本每股盈餘(元)", "基本每股盈餘-完全稀釋"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the quarterly earnings feed. Column names vary between
/// filings, so the row is kept as a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawQuarterRecord(pub BTreeMap<String, String>);

/// A disclosed quarterly result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyReport {
    pub company_code: String,
    pub year: i32,
    /// Quarter, 1-4
    pub quarter: u8,
    /// Net income after tax
    pub net_income: Money,
    /// Basic EPS; zero when the filing omits it
    pub basic_eps: Decimal,
}

/// Most recent disclosed EPS, e.g. for display next to the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsReference {
    /// Period label such as "2024Q2"
    pub label: String,
    pub eps: Decimal,
}

impl RawQuarterRecord {
    /// First non-empty value among `keys`, skipping the "-" placeholder.
    pub fn value(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty() && *v != "-")
    }

    pub fn normalize(&self) -> ProjectionResult<QuarterlyReport> {
        let year_raw = self.value(YEAR_KEYS).ok_or_else(|| missing("year"))?;
        let year: i32 = year_raw.parse().map_err(|e| ProjectionError::ParseError {
            field: "year".into(),
            value: year_raw.to_string(),
            reason: format!("{e}"),
        })?;

        let quarter_raw = self.value(QUARTER_KEYS).ok_or_else(|| missing("quarter"))?;
        let quarter = parse_quarter(quarter_raw)?;

        let net_income_raw = self
            .value(NET_INCOME_KEYS)
            .ok_or_else(|| missing("net_income"))?;
        let net_income = parse_number("net_income", net_income_raw)?;

        let basic_eps = match self.value(EPS_KEYS) {
            Some(raw) => parse_number("basic_eps", raw)?,
            None => Decimal::ZERO,
        };

        Ok(QuarterlyReport {
            company_code: self.value(COMPANY_CODE_KEYS).unwrap_or_default().to_string(),
            year,
            quarter,
            net_income,
            basic_eps,
        })
    }
}

fn missing(field: &str) -> ProjectionError {
    ProjectionError::InvalidInput {
        field: field.into(),
        reason: "column missing from earnings record".into(),
    }
}

/// Parse a quarter label: "2", "Q2", "2Q" or "第2季".
pub fn parse_quarter(raw: &str) -> ProjectionResult<u8> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_prefix('第').unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix('季').unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix('Q').unwrap_or(cleaned);
    let cleaned = cleaned.strip_prefix('Q').unwrap_or(cleaned).trim();

    let quarter: u8 = cleaned.parse().map_err(|e| ProjectionError::ParseError {
        field: "quarter".into(),
        value: raw.to_string(),
        reason: format!("{e}"),
    })?;
    if !period::is_valid_quarter(quarter) {
        return Err(ProjectionError::ParseError {
            field: "quarter".into(),
            value: raw.to_string(),
            reason: "quarter outside 1-4".into(),
        });
    }
    Ok(quarter)
}

/// Parse an amount, dropping separators, spaces and currency units.
fn parse_number(field: &str, raw: &str) -> ProjectionResult<Decimal> {
    let cleaned: String = raw
        .replace("千元", "")
        .replace('元', "")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(ProjectionError::ParseError {
            field: field.into(),
            value: raw.to_string(),
            reason: "empty value".into(),
        });
    }
    Decimal::from_str(&cleaned).map_err(|e| ProjectionError::ParseError {
        field: field.into(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Keep rows for `stock_no`; an empty code matches nothing.
pub fn filter_by_stock(records: &[RawQuarterRecord], stock_no: &str) -> Vec<RawQuarterRecord> {
    let key = stock_no.trim();
    if key.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| {
            r.value(COMPANY_CODE_KEYS)
                .is_some_and(|code| code.eq_ignore_ascii_case(key))
        })
        .cloned()
        .collect()
}

pub fn normalize_all(records: &[RawQuarterRecord]) -> ProjectionResult<Vec<QuarterlyReport>> {
    let reports = records
        .iter()
        .map(RawQuarterRecord::normalize)
        .collect::<ProjectionResult<Vec<_>>>()?;
    Ok(sort_quarterly_reports(reports))
}

/// Sort by year, then quarter.
pub fn sort_quarterly_reports(mut reports: Vec<QuarterlyReport>) -> Vec<QuarterlyReport> {
    reports.sort_by_key(|r| (r.year, r.quarter));
    reports
}

/// Disclosed figures for `year`, keyed by quarter, ready to feed
/// `Assumptions::actual_quarters`.
pub fn actual_quarters_for_year(
    reports: &[QuarterlyReport],
    year: i32,
) -> BTreeMap<u8, QuarterActual> {
    reports
        .iter()
        .filter(|r| r.year == year)
        .map(|r| {
            (
                r.quarter,
                QuarterActual {
                    net_income: r.net_income,
                    eps: r.basic_eps,
                },
            )
        })
        .collect()
}

/// EPS of the latest disclosed quarter, if that EPS is positive.
pub fn latest_eps_reference(reports: &[QuarterlyReport]) -> Option<EpsReference> {
    let latest = reports.iter().max_by_key(|r| (r.year, r.quarter))?;
    if latest.basic_eps <= Decimal::ZERO {
        return None;
    }
    Some(EpsReference {
        label: period::quarter_label(latest.year, latest.quarter),
        eps: latest.basic_eps,
    })
}
