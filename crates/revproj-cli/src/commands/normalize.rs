use chrono::Datelike;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use revproj_core::earnings::{self, EpsReference, QuarterlyReport, RawQuarterRecord};
use revproj_core::projection::QuarterActual;
use revproj_core::revenue::{self, MonthRecord, RawRevenueRecord};
use revproj_core::types::with_metadata;

use crate::input;

/// Arguments for monthly revenue feed normalization
#[derive(Args, Serialize)]
pub struct NormalizeRevenueArgs {
    /// Path to the raw monthly revenue feed (JSON/YAML array)
    #[arg(long)]
    pub input: Option<String>,

    /// Keep only rows for this company code
    #[arg(long)]
    pub stock: Option<String>,
}

/// Arguments for quarterly earnings feed normalization
#[derive(Args, Serialize)]
pub struct NormalizeEarningsArgs {
    /// Path to the raw quarterly earnings feed (JSON/YAML array)
    #[arg(long)]
    pub input: Option<String>,

    /// Keep only rows for this company code
    #[arg(long)]
    pub stock: Option<String>,

    /// Year whose disclosed quarters are extracted; defaults to the latest reported
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
struct YearSummary {
    year: i32,
    months_reported: usize,
    total_revenue: Decimal,
}

#[derive(Debug, Serialize)]
struct RevenueFeed {
    stock_no: Option<String>,
    years: Vec<YearSummary>,
    records: Vec<MonthRecord>,
}

#[derive(Debug, Serialize)]
struct EarningsFeed {
    stock_no: Option<String>,
    year: i32,
    actual_quarters: BTreeMap<u8, QuarterActual>,
    latest_eps: Option<EpsReference>,
    reports: Vec<QuarterlyReport>,
}

pub fn run_normalize_revenue(args: NormalizeRevenueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let raw: Vec<RawRevenueRecord> = read_feed(args.input.as_deref())?;
    let raw_len = raw.len();
    let rows = match args.stock.as_deref() {
        Some(code) => revenue::filter_by_stock(&raw, code),
        None => raw,
    };

    let records = revenue::normalize_all(&rows)?;
    info!(rows = raw_len, kept = records.len(), "revenue feed normalized");
    let years = revenue::group_by_year(&records)
        .into_iter()
        .map(|(year, bucket)| YearSummary {
            year,
            months_reported: bucket.len(),
            total_revenue: bucket
                .iter()
                .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.revenue)),
        })
        .collect();

    let mut warnings = Vec::new();
    if records.is_empty() {
        warnings.push("No revenue rows matched".to_string());
    }

    let feed = RevenueFeed {
        stock_no: args.stock.clone(),
        years,
        records,
    };
    let output = with_metadata(
        "Monthly revenue feed normalization",
        &args,
        warnings,
        start.elapsed().as_micros() as u64,
        feed,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_normalize_earnings(args: NormalizeEarningsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let raw: Vec<RawQuarterRecord> = read_feed(args.input.as_deref())?;
    let raw_len = raw.len();
    let rows = match args.stock.as_deref() {
        Some(code) => earnings::filter_by_stock(&raw, code),
        None => raw,
    };

    let reports = earnings::normalize_all(&rows)?;
    info!(rows = raw_len, kept = reports.len(), "earnings feed normalized");
    let mut available: Vec<i32> = reports.iter().map(|r| r.year).collect();
    available.dedup();
    let year = revenue::select_year(args.year, &available, chrono::Local::now().year());

    let actual_quarters = earnings::actual_quarters_for_year(&reports, year);
    let mut warnings = Vec::new();
    if reports.is_empty() {
        warnings.push("No earnings rows matched".to_string());
    } else if actual_quarters.is_empty() {
        warnings.push(format!("No quarters disclosed for {}", year));
    }

    let feed = EarningsFeed {
        stock_no: args.stock.clone(),
        year,
        actual_quarters,
        latest_eps: earnings::latest_eps_reference(&reports),
        reports,
    };
    let output = with_metadata(
        "Quarterly earnings feed normalization",
        &args,
        warnings,
        start.elapsed().as_micros() as u64,
        feed,
    );
    Ok(serde_json::to_value(output)?)
}

fn read_feed<T: serde::de::DeserializeOwned>(
    path: Option<&str>,
) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input is required (or pipe JSON to stdin)".into())
    }
}
