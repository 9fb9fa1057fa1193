//! Year projection and valuation engine.
//!
//! Months are resolved first ([`month_estimator`]), then grouped into
//! quarters under the profitability assumptions ([`quarter_aggregator`]),
//! then summed into annual EPS and a P/E-based price ([`annual_summary`]).
//! Every step is a pure function of its inputs.

pub mod annual_summary;
pub mod assumptions;
pub mod month_estimator;
pub mod quarter_aggregator;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ProjectionError;
use crate::period;
use crate::revenue::{self, MonthRecord};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ProjectionResult;

pub use annual_summary::AnnualSummary;
pub use assumptions::{Assumptions, QuarterActual, QuarterInputs, QuarterOverride};
pub use month_estimator::MonthEstimate;
pub use quarter_aggregator::QuarterBreakdown;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Twelve-month revenue projection with quarterly income and valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: i32,
    /// January..December
    pub months: Vec<MonthEstimate>,
    /// Q1..Q4
    pub quarters: Vec<QuarterBreakdown>,
    pub annual_revenue: Money,
    pub annual_eps: Decimal,
    pub estimated_price: Money,
    pub upside: Rate,
    /// Mean YoY over months reported in both years
    pub avg_yoy: Rate,
    /// Mean MoM over reported months with a reported predecessor
    pub avg_mom: Rate,
}

/// Serializable input for [`project_year`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Year to project
    pub year: i32,
    /// Reported monthly revenue; must cover `year` and ideally `year - 1`
    pub monthly_revenue: Vec<MonthRecord>,
    /// Manual YoY rate per month (1-12) for months without reported revenue
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub manual_yoy: BTreeMap<u32, Rate>,
    pub assumptions: Assumptions,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project `year` from revenue grouped by year.
///
/// Fails when `year` has no revenue records or when the share count is not
/// positive; otherwise always returns twelve months and four quarters.
pub fn build_year_projection(
    year: i32,
    revenue_by_year: &BTreeMap<i32, Vec<MonthRecord>>,
    manual_yoy: &BTreeMap<u32, Rate>,
    assumptions: &Assumptions,
) -> ProjectionResult<YearProjection> {
    let current = revenue_by_year
        .get(&year)
        .filter(|records| !records.is_empty())
        .ok_or(ProjectionError::MissingYearData { year })?;
    assumptions.validate()?;

    let prior = revenue_by_year
        .get(&year.saturating_sub(1))
        .map(Vec::as_slice)
        .unwrap_or_default();

    let estimation = month_estimator::estimate_months(year, current, prior, manual_yoy);
    let quarters = quarter_aggregator::aggregate_quarters(&estimation.months, assumptions);
    let summary = annual_summary::summarize(
        &estimation.months,
        &quarters,
        assumptions.per_multiple,
        assumptions.current_price,
    );

    debug!(
        year,
        annual_revenue = %summary.annual_revenue,
        annual_eps = %summary.annual_eps,
        estimated_price = %summary.estimated_price,
        "year projection built"
    );

    Ok(YearProjection {
        year,
        months: estimation.months,
        quarters,
        annual_revenue: summary.annual_revenue,
        annual_eps: summary.annual_eps,
        estimated_price: summary.estimated_price,
        upside: summary.upside,
        avg_yoy: estimation.avg_yoy,
        avg_mom: estimation.avg_mom,
    })
}

/// Run [`build_year_projection`] on a flat input and wrap the result with
/// methodology, warnings and timing metadata.
pub fn project_year(
    input: &ProjectionInput,
) -> ProjectionResult<ComputationOutput<YearProjection>> {
    let start = Instant::now();

    let grouped = revenue::group_by_year(&input.monthly_revenue);
    let projection = build_year_projection(
        input.year,
        &grouped,
        &input.manual_yoy,
        &input.assumptions,
    )?;

    let warnings = collect_warnings(input, &grouped, &projection);
    for w in &warnings {
        warn!("{w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Monthly revenue extrapolation (YoY / MoM) with P/E valuation",
        input,
        warnings,
        elapsed,
        projection,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect_warnings(
    input: &ProjectionInput,
    grouped: &BTreeMap<i32, Vec<MonthRecord>>,
    projection: &YearProjection,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let prior_year = input.year.saturating_sub(1);

    if grouped.get(&prior_year).map_or(true, Vec::is_empty) {
        warnings.push(format!(
            "No revenue data for {prior_year}; YoY references unavailable"
        ));
    }

    for &month in input.manual_yoy.keys() {
        if !period::is_valid_month(month) {
            warnings.push(format!("Manual YoY for month {month} ignored; month must be 1-12"));
        }
    }
    for m in projection.months.iter().filter(|m| m.is_actual) {
        if input.manual_yoy.contains_key(&m.month) {
            warnings.push(format!(
                "Manual YoY for {} ignored; revenue was reported",
                period::month_name(m.month)
            ));
        }
    }

    let asm = &input.assumptions;
    for &q in asm.quarter_overrides.keys() {
        if !period::is_valid_quarter(q) {
            warnings.push(format!("Override for quarter {q} ignored; quarter must be 1-4"));
        }
    }
    for (&q, actual) in &asm.actual_quarters {
        if !period::is_valid_quarter(q) {
            warnings.push(format!("Disclosure for quarter {q} ignored; quarter must be 1-4"));
        } else if actual.net_income <= Decimal::ZERO {
            warnings.push(format!(
                "Disclosure for Q{q} ignored; net income must be positive"
            ));
        }
    }

    let unanchored: Vec<String> = projection
        .months
        .iter()
        .filter(|m| !m.is_actual && !m.has_reference)
        .map(|m| period::month_name(m.month))
        .collect();
    if !unanchored.is_empty() {
        warnings.push(format!(
            "No YoY or MoM reference for {}; estimated revenue is zero",
            unanchored.join(", ")
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
