use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ProjectionError;
use crate::period;
use crate::types::Money;
use crate::ProjectionResult;

/// Offset between the ROC (Minguo) calendar and the Gregorian year.
const ROC_YEAR_OFFSET: i32 = 1911;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single reported monthly revenue figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Gregorian year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Reported revenue for the month (source units, usually NT$ thousands)
    pub revenue: Money,
}

impl MonthRecord {
    /// Build a validated record.
    pub fn new(year: i32, month: u32, revenue: Money) -> ProjectionResult<Self> {
        if !period::is_valid_month(month) {
            return Err(ProjectionError::InvalidInput {
                field: "month".into(),
                reason: format!("month must be within 1-12, got {month}"),
            });
        }
        if revenue < Decimal::ZERO {
            return Err(ProjectionError::InvalidInput {
                field: "revenue".into(),
                reason: "must be non-negative".into(),
            });
        }
        Ok(Self {
            year,
            month,
            revenue,
        })
    }
}

/// One row of the monthly revenue open-data feed, keyed by the feed's own
/// column names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRevenueRecord {
    #[serde(rename = "公司代號", default)]
    pub company_code: String,
    #[serde(rename = "公司名稱", default)]
    pub company_name: String,
    #[serde(rename = "出表日期", default)]
    pub publish_date: String,
    #[serde(rename = "資料年月", default)]
    pub data_month: String,
    #[serde(rename = "營業收入-當月營收", default)]
    pub monthly_revenue: String,
    #[serde(rename = "營業收入-當月累計營收", default)]
    pub accumulated_revenue: String,
    #[serde(rename = "營業收入-去年累計營收", default)]
    pub accumulated_revenue_last_year: String,
    #[serde(rename = "營業收入-去年同月增減(%)", default)]
    pub yoy_percent: String,
    #[serde(rename = "備註", default)]
    pub note: String,
}

impl RawRevenueRecord {
    /// Parse the data month. Five digits are an ROC year plus month
    /// (`11205` = May 2023); six digits are a Gregorian year plus month.
    pub fn parse_year_month(&self) -> ProjectionResult<(i32, u32)> {
        let raw = self.data_month.trim();
        let parse_err = |reason: String| ProjectionError::ParseError {
            field: "data_month".into(),
            value: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(parse_err("empty value".into()));
        }
        if !raw.is_ascii() || (raw.len() != 5 && raw.len() != 6) {
            return Err(parse_err("expected YYYMM or YYYYMM".into()));
        }

        let (year_part, month_part) = raw.split_at(raw.len() - 2);
        let month: u32 = month_part
            .parse()
            .map_err(|e| parse_err(format!("bad month: {e}")))?;
        if !period::is_valid_month(month) {
            return Err(parse_err(format!("month {month} outside 1-12")));
        }
        let mut year: i32 = year_part
            .parse()
            .map_err(|e| parse_err(format!("bad year: {e}")))?;
        if raw.len() == 5 {
            year += ROC_YEAR_OFFSET;
        }
        Ok((year, month))
    }

    /// Parse the monthly revenue column, tolerating thousands separators.
    pub fn parse_revenue(&self) -> ProjectionResult<Money> {
        let raw = self.monthly_revenue.trim();
        if raw.is_empty() || raw == "-" {
            return Err(ProjectionError::ParseError {
                field: "monthly_revenue".into(),
                value: raw.to_string(),
                reason: "no revenue reported".into(),
            });
        }
        let cleaned = raw.replace(',', "");
        Decimal::from_str(&cleaned).map_err(|e| ProjectionError::ParseError {
            field: "monthly_revenue".into(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn normalize(&self) -> ProjectionResult<MonthRecord> {
        let (year, month) = self.parse_year_month()?;
        let revenue = self.parse_revenue()?;
        MonthRecord::new(year, month, revenue)
    }
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Keep rows whose company code matches `stock_no` (trimmed, case-insensitive).
pub fn filter_by_stock(records: &[RawRevenueRecord], stock_no: &str) -> Vec<RawRevenueRecord> {
    let key = stock_no.trim();
    records
        .iter()
        .filter(|r| r.company_code.trim().eq_ignore_ascii_case(key))
        .cloned()
        .collect()
}

/// Normalize every row, failing on the first malformed one.
pub fn normalize_all(records: &[RawRevenueRecord]) -> ProjectionResult<Vec<MonthRecord>> {
    let normalized = records
        .iter()
        .map(RawRevenueRecord::normalize)
        .collect::<ProjectionResult<Vec<_>>>()?;
    Ok(sort_month_records(normalized))
}

/// Sort by year, then month.
pub fn sort_month_records(mut records: Vec<MonthRecord>) -> Vec<MonthRecord> {
    records.sort_by_key(|r| (r.year, r.month));
    records
}

/// Bucket records by year; each bucket is sorted by month.
pub fn group_by_year(records: &[MonthRecord]) -> BTreeMap<i32, Vec<MonthRecord>> {
    let mut grouped: BTreeMap<i32, Vec<MonthRecord>> = BTreeMap::new();
    for rec in records {
        grouped.entry(rec.year).or_default().push(*rec);
    }
    for bucket in grouped.values_mut() {
        bucket.sort_by_key(|r| r.month);
    }
    grouped
}

/// Pick the year to project.
///
/// A requested year wins when data exists for it. Otherwise the latest year
/// not after `current_year` is used, then the latest year overall. With no
/// data at all the requested year (or `current_year`) is returned so the
/// engine can report the gap.
pub fn select_year(requested: Option<i32>, available: &[i32], current_year: i32) -> i32 {
    if available.is_empty() {
        return requested.unwrap_or(current_year);
    }
    if let Some(year) = requested {
        if available.contains(&year) {
            return year;
        }
    }
    let mut sorted = available.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .rev()
        .find(|&&y| y <= current_year)
        .or_else(|| sorted.last())
        .copied()
        .unwrap_or(current_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(data_month: &str, revenue: &str) -> RawRevenueRecord {
        RawRevenueRecord {
            data_month: data_month.into(),
            monthly_revenue: revenue.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_year_month_roc() {
        assert_eq!(raw("11205", "").parse_year_month().unwrap(), (2023, 5));
    }

    #[test]
    fn test_parse_year_month_gregorian() {
        assert_eq!(raw("202312", "").parse_year_month().unwrap(), (2023, 12));
    }

    #[test]
    fn test_parse_year_month_rejects_bad_month() {
        assert!(raw("202313", "").parse_year_month().is_err());
        assert!(raw("11200", "").parse_year_month().is_err());
    }

    #[test]
    fn test_parse_year_month_rejects_bad_length() {
        assert!(raw("2023", "").parse_year_month().is_err());
        assert!(raw("", "").parse_year_month().is_err());
        assert!(raw("2023-01", "").parse_year_month().is_err());
    }

    #[test]
    fn test_parse_revenue_strips_commas() {
        assert_eq!(raw("", "1,234,567").parse_revenue().unwrap(), dec!(1234567));
    }

    #[test]
    fn test_parse_revenue_missing() {
        assert!(raw("", "-").parse_revenue().is_err());
        assert!(raw("", "  ").parse_revenue().is_err());
        assert!(raw("", "abc").parse_revenue().is_err());
    }

    #[test]
    fn test_normalize() {
        let rec = raw("11201", "10,000").normalize().unwrap();
        assert_eq!(rec, MonthRecord::new(2023, 1, dec!(10000)).unwrap());
    }

    #[test]
    fn test_normalize_rejects_negative_revenue() {
        let err = raw("11201", "-1,000").normalize().unwrap_err();
        match err {
            ProjectionError::InvalidInput { field, .. } => assert_eq!(field, "revenue"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(normalize_all(&[raw("11201", "5"), raw("11202", "-5")]).is_err());
    }

    #[test]
    fn test_raw_record_deserializes_source_columns() {
        let json = r#"{"公司代號":"2330","資料年月":"11301","營業收入-當月營收":"215,804,000"}"#;
        let rec: RawRevenueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.company_code, "2330");
        let normalized = rec.normalize().unwrap();
        assert_eq!((normalized.year, normalized.month), (2024, 1));
        assert_eq!(normalized.revenue, dec!(215804000));
    }

    #[test]
    fn test_month_record_new_validates() {
        assert!(MonthRecord::new(2024, 0, dec!(1)).is_err());
        assert!(MonthRecord::new(2024, 1, dec!(-1)).is_err());
    }

    #[test]
    fn test_filter_by_stock() {
        let recs = vec![
            RawRevenueRecord {
                company_code: "2330".into(),
                ..Default::default()
            },
            RawRevenueRecord {
                company_code: "2303".into(),
                ..Default::default()
            },
            RawRevenueRecord {
                company_code: " 2330 ".into(),
                ..Default::default()
            },
        ];
        assert_eq!(filter_by_stock(&recs, "2330").len(), 2);
    }

    #[test]
    fn test_group_by_year_sorts_each_bucket() {
        let recs = vec![
            MonthRecord { year: 2022, month: 5, revenue: dec!(1) },
            MonthRecord { year: 2023, month: 1, revenue: dec!(2) },
            MonthRecord { year: 2022, month: 2, revenue: dec!(3) },
        ];
        let grouped = group_by_year(&recs);
        assert_eq!(grouped[&2022].len(), 2);
        assert_eq!(grouped[&2022][0].month, 2);
        assert_eq!(grouped[&2023].len(), 1);
    }

    #[test]
    fn test_sort_month_records() {
        let recs = vec![
            MonthRecord { year: 2023, month: 3, revenue: dec!(0) },
            MonthRecord { year: 2022, month: 5, revenue: dec!(0) },
            MonthRecord { year: 2023, month: 1, revenue: dec!(0) },
        ];
        let sorted = sort_month_records(recs);
        assert_eq!(sorted[0].year, 2022);
        assert_eq!(sorted[1].month, 1);
    }

    #[test]
    fn test_select_year() {
        let years = [2023, 2024, 2026];
        assert_eq!(select_year(Some(2023), &years, 2025), 2023);
        assert_eq!(select_year(Some(2019), &years, 2025), 2024);
        assert_eq!(select_year(None, &years, 2022), 2026);
        assert_eq!(select_year(None, &[], 2025), 2025);
        assert_eq!(select_year(Some(2020), &[], 2025), 2020);
    }
}
