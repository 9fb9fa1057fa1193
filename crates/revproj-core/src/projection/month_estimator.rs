use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::period::{self, MONTHS, MONTHS_PER_YEAR};
use crate::revenue::MonthRecord;
use crate::types::{checked_change, checked_growth, Money, Rate};

/// Revenue per calendar month, `None` where nothing was reported.
type MonthTable = [Option<Money>; MONTHS_PER_YEAR];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Resolved revenue for one month of the projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEstimate {
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Reported revenue, or the extrapolated figure for missing months
    pub revenue: Money,
    /// Same month of the prior year (0 when not reported)
    pub previous_year_revenue: Money,
    /// Year-over-year growth used or observed for this month
    pub yoy: Rate,
    /// Revenue the MoM figure was measured against
    pub previous_month_revenue: Money,
    /// Month-over-month growth
    pub mom: Rate,
    /// YoY rate offered as reference for an estimated month
    pub reference_yoy: Rate,
    /// MoM rate offered as reference for an estimated month
    pub reference_mom: Rate,
    /// What the YoY and MoM candidates would produce together (informational)
    pub reference_revenue: Money,
    /// Whether an estimated month had any anchor to extrapolate from
    pub has_reference: bool,
    /// Whether the revenue was actually reported
    pub is_actual: bool,
}

/// The twelve resolved months plus the reference averages behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEstimation {
    pub months: Vec<MonthEstimate>,
    pub avg_yoy: Rate,
    pub avg_mom: Rate,
}

/// Growth rates observed between reported figures.
#[derive(Debug, Clone, PartialEq)]
struct ReferenceRates {
    actual_yoy: [Option<Rate>; MONTHS_PER_YEAR],
    actual_mom: [Option<Rate>; MONTHS_PER_YEAR],
    avg_yoy: Rate,
    avg_mom: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve all twelve months of `year`.
///
/// `current` and `prior` are the reported records for `year` and `year - 1`.
/// Rows belonging to another year or to an invalid month are skipped; when a
/// month is reported twice the later row wins. `manual_yoy` replaces the
/// average YoY for the months it names, and only for months without a
/// reported figure.
pub fn estimate_months(
    year: i32,
    current: &[MonthRecord],
    prior: &[MonthRecord],
    manual_yoy: &BTreeMap<u32, Rate>,
) -> MonthEstimation {
    let current = month_table(current, year);
    let prior = month_table(prior, year.saturating_sub(1));
    let rates = reference_rates(&current, &prior);

    debug!(
        year,
        avg_yoy = %rates.avg_yoy,
        avg_mom = %rates.avg_mom,
        reported = current.iter().flatten().count(),
        "reference rates computed"
    );

    let mut months = Vec::with_capacity(MONTHS_PER_YEAR);
    // Last reported or estimated revenue, carried across gaps.
    let mut last_revenue = Decimal::ZERO;

    for month in MONTHS {
        let idx = (month - 1) as usize;
        let previous_year_revenue = prior[idx].unwrap_or(Decimal::ZERO);

        if let Some(revenue) = current[idx] {
            let mut previous_month_revenue = last_revenue;
            if previous_month_revenue <= Decimal::ZERO {
                previous_month_revenue = preceding_revenue(month, &current, &prior);
            }
            let mom = rates.actual_mom[idx]
                .unwrap_or_else(|| growth(revenue, previous_month_revenue));

            months.push(MonthEstimate {
                year,
                month,
                revenue,
                previous_year_revenue,
                yoy: rates.actual_yoy[idx].unwrap_or(Decimal::ZERO),
                previous_month_revenue,
                mom,
                reference_yoy: Decimal::ZERO,
                reference_mom: Decimal::ZERO,
                reference_revenue: Decimal::ZERO,
                has_reference: false,
                is_actual: true,
            });
            last_revenue = revenue;
            continue;
        }

        let previous_month_revenue = last_revenue;
        let yoy = manual_yoy.get(&month).copied().unwrap_or(rates.avg_yoy);
        // A candidate that overflows counts as having no anchor.
        let revenue_yoy = Some(previous_year_revenue)
            .filter(|base| *base > Decimal::ZERO)
            .and_then(|base| checked_growth(base, yoy));
        let revenue_mom = Some(previous_month_revenue)
            .filter(|base| *base > Decimal::ZERO)
            .and_then(|base| checked_growth(base, rates.avg_mom));

        // Seasonal anchor first, running MoM extrapolation second.
        let (revenue, has_reference) = match (revenue_yoy, revenue_mom) {
            (Some(r), _) | (None, Some(r)) => (r, true),
            (None, None) => (Decimal::ZERO, false),
        };

        months.push(MonthEstimate {
            year,
            month,
            revenue,
            previous_year_revenue,
            yoy,
            previous_month_revenue,
            mom: growth(revenue, previous_month_revenue),
            reference_yoy: yoy,
            reference_mom: rates.avg_mom,
            reference_revenue: reference_revenue(revenue_yoy, revenue_mom),
            has_reference,
            is_actual: false,
        });
        if revenue > Decimal::ZERO {
            last_revenue = revenue;
        }
    }

    MonthEstimation {
        months,
        avg_yoy: rates.avg_yoy,
        avg_mom: rates.avg_mom,
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn month_table(records: &[MonthRecord], year: i32) -> MonthTable {
    let mut table: MonthTable = [None; MONTHS_PER_YEAR];
    for rec in records.iter().filter(|r| r.year == year) {
        if let Some(idx) = period::month_index(rec.month) {
            table[idx] = Some(rec.revenue);
        }
    }
    table
}

fn reference_rates(current: &MonthTable, prior: &MonthTable) -> ReferenceRates {
    let mut actual_yoy: [Option<Rate>; MONTHS_PER_YEAR] = [None; MONTHS_PER_YEAR];
    let mut actual_mom: [Option<Rate>; MONTHS_PER_YEAR] = [None; MONTHS_PER_YEAR];

    for month in MONTHS {
        let idx = (month - 1) as usize;
        let Some(revenue) = current[idx] else {
            continue;
        };

        actual_yoy[idx] = prior[idx].and_then(|prev| checked_change(revenue, prev));
        actual_mom[idx] = checked_change(revenue, preceding_revenue(month, current, prior));
    }

    ReferenceRates {
        avg_yoy: mean(&actual_yoy),
        avg_mom: mean(&actual_mom),
        actual_yoy,
        actual_mom,
    }
}

/// Reported revenue of the calendar month before `month`: the same year's
/// figure, or the prior year's December when `month` is January.
fn preceding_revenue(month: u32, current: &MonthTable, prior: &MonthTable) -> Money {
    let preceding = period::previous_month(month);
    let table = if month == 1 { prior } else { current };
    period::month_index(preceding)
        .and_then(|idx| table[idx])
        .unwrap_or(Decimal::ZERO)
}

/// Relative change from `base`, or zero when there is no positive base or
/// the change is not representable.
fn growth(value: Money, base: Money) -> Rate {
    checked_change(value, base).unwrap_or(Decimal::ZERO)
}

/// Mean of the recorded points, zero when there are none. A sum that
/// overflows is averaged term by term, saturating at the range limits.
fn mean(points: &[Option<Rate>]) -> Rate {
    let count = points.iter().flatten().count();
    if count == 0 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(count);
    match points
        .iter()
        .flatten()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
    {
        Some(sum) => sum / n,
        None => points
            .iter()
            .flatten()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v / n)),
    }
}

/// Average of the two candidates when both exist, otherwise the one that
/// does.
fn reference_revenue(revenue_yoy: Option<Money>, revenue_mom: Option<Money>) -> Money {
    match (revenue_yoy, revenue_mom) {
        (Some(y), Some(m)) => match y.checked_add(m) {
            Some(sum) => sum / Decimal::TWO,
            None => (y / Decimal::TWO).saturating_add(m / Decimal::TWO),
        },
        (Some(r), None) | (None, Some(r)) => r,
        (None, None) => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn records(year: i32, values: &[(u32, Decimal)]) -> Vec<MonthRecord> {
        values
            .iter()
            .map(|&(month, revenue)| MonthRecord {
                year,
                month,
                revenue,
            })
            .collect()
    }

    fn full_year(year: i32, value: Decimal) -> Vec<MonthRecord> {
        (1..=12)
            .map(|month| MonthRecord {
                year,
                month,
                revenue: value,
            })
            .collect()
    }

    #[test]
    fn test_always_twelve_ordered_months() {
        let current = records(2024, &[(5, dec!(10))]);
        let out = estimate_months(2024, &current, &[], &BTreeMap::new());
        assert_eq!(out.months.len(), 12);
        for (i, m) in out.months.iter().enumerate() {
            assert_eq!(m.month, i as u32 + 1);
            assert_eq!(m.year, 2024);
        }
    }

    #[test]
    fn test_actual_yoy_and_january_mom_against_prior_december() {
        let prior = full_year(2023, dec!(100));
        let current = records(2024, &[(1, dec!(120))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        let jan = &out.months[0];
        assert!(jan.is_actual);
        assert_eq!(jan.yoy, dec!(0.2));
        assert_eq!(jan.previous_month_revenue, dec!(100));
        assert_eq!(jan.mom, dec!(0.2));
        assert_eq!(out.avg_yoy, dec!(0.2));
        assert_eq!(out.avg_mom, dec!(0.2));
    }

    #[test]
    fn test_estimated_month_prefers_yoy_but_reports_average() {
        let prior = full_year(2023, dec!(100));
        let current = records(2024, &[(1, dec!(120))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        let feb = &out.months[1];
        assert!(!feb.is_actual);
        assert!(feb.has_reference);
        // YoY candidate 100 * 1.2, MoM candidate 120 * 1.2
        assert_eq!(feb.revenue, dec!(120));
        assert_eq!(feb.reference_revenue, (dec!(120) + dec!(144)) / dec!(2));
        assert_eq!(feb.reference_yoy, dec!(0.2));
        assert_eq!(feb.reference_mom, dec!(0.2));
        assert_eq!(feb.previous_month_revenue, dec!(120));
        assert_eq!(feb.mom, Decimal::ZERO);
    }

    #[test]
    fn test_mom_fallback_without_prior_year() {
        let current = records(2024, &[(1, dec!(100)), (2, dec!(110))]);
        let out = estimate_months(2024, &current, &[], &BTreeMap::new());
        assert_eq!(out.avg_yoy, Decimal::ZERO);
        assert_eq!(out.avg_mom, dec!(0.1));

        let mar = &out.months[2];
        assert!(mar.has_reference);
        assert_eq!(mar.revenue, dec!(121));
        assert_eq!(mar.reference_revenue, dec!(121));
        assert_eq!(mar.mom, dec!(0.1));

        // running value carries the estimate forward
        let apr = &out.months[3];
        assert_eq!(apr.previous_month_revenue, dec!(121));
        assert_eq!(apr.revenue, dec!(133.1));
    }

    #[test]
    fn test_no_anchor_yields_zero_without_reference() {
        let current = records(2024, &[(12, dec!(50))]);
        let out = estimate_months(2024, &current, &[], &BTreeMap::new());
        for m in &out.months[..11] {
            assert_eq!(m.revenue, Decimal::ZERO);
            assert!(!m.has_reference);
            assert_eq!(m.reference_revenue, Decimal::ZERO);
            assert_eq!(m.mom, Decimal::ZERO);
        }
        let dec_month = &out.months[11];
        assert!(dec_month.is_actual);
        assert_eq!(dec_month.mom, Decimal::ZERO);
        assert_eq!(dec_month.previous_month_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_manual_yoy_applies_to_missing_months_only() {
        let prior = full_year(2023, dec!(100));
        let current = records(2024, &[(1, dec!(120))]);
        let manual = BTreeMap::from([(1, dec!(0.5)), (3, dec!(0.10))]);
        let out = estimate_months(2024, &current, &prior, &manual);
        assert_eq!(out.months[0].revenue, dec!(120));
        assert_eq!(out.months[0].yoy, dec!(0.2));
        assert_eq!(out.months[2].yoy, dec!(0.10));
        assert_eq!(out.months[2].revenue, dec!(110));
        // months without a manual rate fall back to the average
        assert_eq!(out.months[3].yoy, dec!(0.2));
    }

    #[test]
    fn test_actual_mom_skips_gap_but_still_reports_running_mom() {
        let prior = full_year(2023, dec!(100));
        let current = records(2024, &[(1, dec!(100)), (3, dec!(130))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        // Only January has an observed MoM point (vs prior December)
        assert_eq!(out.avg_mom, Decimal::ZERO);
        let feb = &out.months[1];
        // avg YoY = (0 + 0.3) / 2
        assert_eq!(feb.revenue, dec!(115));
        let mar = &out.months[2];
        assert!(mar.is_actual);
        assert_eq!(mar.previous_month_revenue, dec!(115));
        assert_eq!(mar.mom, (dec!(130) - dec!(115)) / dec!(115));
    }

    #[test]
    fn test_foreign_rows_and_duplicates() {
        let mut current = records(2024, &[(1, dec!(10)), (1, dec!(20)), (13, dec!(99))]);
        current.push(MonthRecord {
            year: 2022,
            month: 2,
            revenue: dec!(500),
        });
        let out = estimate_months(2024, &current, &[], &BTreeMap::new());
        assert_eq!(out.months[0].revenue, dec!(20));
        assert!(!out.months[1].is_actual);
        assert_eq!(out.months.iter().filter(|m| m.is_actual).count(), 1);
    }

    #[test]
    fn test_zero_prior_revenue_is_not_an_anchor() {
        let prior = records(2023, &[(1, dec!(0)), (2, dec!(0))]);
        let current = records(2024, &[(1, dec!(50))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        assert_eq!(out.months[0].yoy, Decimal::ZERO);
        assert_eq!(out.avg_yoy, Decimal::ZERO);
        // falls through to the running MoM candidate
        assert_eq!(out.months[1].revenue, dec!(50));
        assert!(out.months[1].has_reference);
    }

    #[test]
    fn test_reference_revenue_helper() {
        assert_eq!(reference_revenue(Some(dec!(10)), Some(dec!(20))), dec!(15));
        assert_eq!(reference_revenue(Some(dec!(10)), None), dec!(10));
        assert_eq!(reference_revenue(None, Some(dec!(20))), dec!(20));
        assert_eq!(reference_revenue(None, None), dec!(0));
        assert_eq!(
            reference_revenue(Some(Decimal::MAX), Some(Decimal::MAX)),
            Decimal::MAX
        );
    }

    #[test]
    fn test_january_uses_prior_december_even_when_december_reported() {
        let prior = records(2023, &[(12, dec!(80))]);
        let current = records(2024, &[(1, dec!(100)), (12, dec!(500))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        let jan = &out.months[0];
        assert!(jan.is_actual);
        assert_eq!(jan.previous_month_revenue, dec!(80));
        assert_eq!(jan.mom, dec!(0.25));
    }

    #[test]
    fn test_overflowing_extrapolation_loses_its_anchor() {
        let prior = records(2023, &[(12, dec!(1))]);
        let current = records(2024, &[(1, dec!(1000000))]);
        let out = estimate_months(2024, &current, &prior, &BTreeMap::new());
        assert_eq!(out.avg_mom, dec!(999999));

        // 1e6 compounds by 1e6 each month until it no longer fits
        assert_eq!(out.months[1].revenue, dec!(1000000000000));
        assert_eq!(out.months[3].revenue, dec!(1000000000000000000000000));
        for m in &out.months[4..11] {
            assert!(!m.has_reference);
            assert_eq!(m.revenue, Decimal::ZERO);
            assert_eq!(m.reference_revenue, Decimal::ZERO);
        }
        // December still has its prior-year anchor
        let dec_month = &out.months[11];
        assert!(dec_month.has_reference);
        assert_eq!(dec_month.revenue, dec!(1));
    }

    #[test]
    fn test_mean_survives_overflowing_sum() {
        let points = [Some(Decimal::MAX), Some(dec!(1)), None];
        let avg = mean(&points);
        assert!(avg > Decimal::ZERO);
        assert_eq!(mean(&[None, None]), Decimal::ZERO);
        assert_eq!(mean(&[Some(dec!(0.1)), Some(dec!(0.2))]), dec!(0.15));
    }
}
