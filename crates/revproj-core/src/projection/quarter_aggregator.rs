use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::assumptions::{Assumptions, QuarterInputs};
use super::month_estimator::MonthEstimate;
use crate::period::{self, QUARTERS, QUARTERS_PER_YEAR};
use crate::types::{saturating_div, Money};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Income statement estimate for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterBreakdown {
    /// Quarter, 1-4
    pub quarter: u8,
    pub revenue: Money,
    pub gross_profit: Money,
    pub operating_income: Money,
    pub pre_tax_income: Money,
    pub net_income: Money,
    pub eps: Decimal,
    /// All three months reported, or the quarter's results were disclosed
    pub is_actual: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Group the months into quarters, apply the margin/tax assumptions, then
/// let disclosed results replace the computed figures.
///
/// `months` must hold the twelve months of one year in calendar order.
pub fn aggregate_quarters(months: &[MonthEstimate], assumptions: &Assumptions) -> Vec<QuarterBreakdown> {
    let computed: Vec<QuarterBreakdown> = QUARTERS
        .map(|q| {
            let (revenue, all_actual) = quarter_revenue(months, q);
            compute_quarter(
                q,
                revenue,
                all_actual,
                &assumptions.quarter_inputs(q),
                assumptions.shares_outstanding,
            )
        })
        .collect();
    debug_assert_eq!(computed.len(), QUARTERS_PER_YEAR);

    apply_disclosures(computed, assumptions)
}

/// Income statement for a single quarter. `shares_outstanding` must be
/// positive; callers validate it up front. Figures beyond the decimal range
/// saturate at its limits.
pub fn compute_quarter(
    quarter: u8,
    revenue: Money,
    all_months_actual: bool,
    inputs: &QuarterInputs,
    shares_outstanding: Decimal,
) -> QuarterBreakdown {
    let gross_profit = revenue.saturating_mul(inputs.gross_margin);
    let operating_income = gross_profit.saturating_sub(inputs.operating_expense);
    let pre_tax_income = operating_income.saturating_add(inputs.non_operating_income);
    let net_income = pre_tax_income.saturating_mul(Decimal::ONE.saturating_sub(inputs.tax_rate));
    let eps = saturating_div(net_income, shares_outstanding);

    QuarterBreakdown {
        quarter,
        revenue,
        gross_profit,
        operating_income,
        pre_tax_income,
        net_income,
        eps,
        is_actual: all_months_actual,
    }
}

/// Replace computed net income / EPS with disclosed figures. A disclosure
/// only counts when its net income is positive; a non-positive disclosed EPS
/// is re-derived from net income. Disclosed quarters are always actual.
pub fn apply_disclosures(
    mut quarters: Vec<QuarterBreakdown>,
    assumptions: &Assumptions,
) -> Vec<QuarterBreakdown> {
    for quarter in quarters.iter_mut() {
        let Some(actual) = assumptions.disclosed(quarter.quarter) else {
            continue;
        };
        quarter.net_income = actual.net_income;
        quarter.eps = if actual.eps > Decimal::ZERO {
            actual.eps
        } else {
            saturating_div(actual.net_income, assumptions.shares_outstanding)
        };
        quarter.is_actual = true;
        debug!(
            quarter = quarter.quarter,
            net_income = %quarter.net_income,
            eps = %quarter.eps,
            "disclosed results applied"
        );
    }
    quarters
}

/// Sum of EPS across quarters.
pub fn annual_eps(quarters: &[QuarterBreakdown]) -> Decimal {
    quarters
        .iter()
        .fold(Decimal::ZERO, |acc, q| acc.saturating_add(q.eps))
}

fn quarter_revenue(months: &[MonthEstimate], quarter: u8) -> (Money, bool) {
    let mut revenue = Decimal::ZERO;
    let mut all_actual = true;
    for month in period::quarter_months(quarter) {
        match months.iter().find(|m| m.month == month) {
            Some(m) => {
                revenue = revenue.saturating_add(m.revenue);
                all_actual &= m.is_actual;
            }
            None => all_actual = false,
        }
    }
    (revenue, all_actual)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::assumptions::{QuarterActual, QuarterOverride};
    use rust_decimal_macros::dec;

    fn month(month: u32, revenue: Decimal, is_actual: bool) -> MonthEstimate {
        MonthEstimate {
            year: 2024,
            month,
            revenue,
            previous_year_revenue: Decimal::ZERO,
            yoy: Decimal::ZERO,
            previous_month_revenue: Decimal::ZERO,
            mom: Decimal::ZERO,
            reference_yoy: Decimal::ZERO,
            reference_mom: Decimal::ZERO,
            reference_revenue: Decimal::ZERO,
            has_reference: false,
            is_actual,
        }
    }

    fn year_of_months(actual_through: u32) -> Vec<MonthEstimate> {
        (1..=12)
            .map(|m| month(m, dec!(100), m <= actual_through))
            .collect()
    }

    fn assumptions() -> Assumptions {
        Assumptions {
            gross_margin: dec!(0.5),
            operating_expense: dec!(50),
            non_operating_income: dec!(10),
            tax_rate: dec!(0.2),
            shares_outstanding: dec!(10),
            per_multiple: dec!(15),
            current_price: dec!(20),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_quarter_income_statement() {
        let asm = assumptions();
        let q = compute_quarter(1, dec!(300), true, &asm.base_inputs(), asm.shares_outstanding);
        assert_eq!(q.gross_profit, dec!(150));
        assert_eq!(q.operating_income, dec!(100));
        assert_eq!(q.pre_tax_income, dec!(110));
        assert_eq!(q.net_income, dec!(88));
        assert_eq!(q.eps, dec!(8.8));
    }

    #[test]
    fn test_aggregate_four_quarters_in_order() {
        let quarters = aggregate_quarters(&year_of_months(4), &assumptions());
        assert_eq!(quarters.len(), 4);
        assert_eq!(
            quarters.iter().map(|q| q.quarter).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(quarters[0].is_actual);
        // April actual, May/June estimated
        assert!(!quarters[1].is_actual);
        assert!(quarters.iter().all(|q| q.revenue == dec!(300)));
    }

    #[test]
    fn test_quarter_override_changes_only_that_quarter() {
        let mut asm = assumptions();
        asm.quarter_overrides.insert(
            2,
            QuarterOverride {
                gross_margin: Some(dec!(1)),
                ..Default::default()
            },
        );
        let quarters = aggregate_quarters(&year_of_months(0), &asm);
        assert_eq!(quarters[1].gross_profit, dec!(300));
        assert_eq!(quarters[0].gross_profit, dec!(150));
        assert_eq!(quarters[2].gross_profit, dec!(150));
    }

    #[test]
    fn test_disclosure_overrides_and_marks_actual() {
        let mut asm = assumptions();
        asm.actual_quarters.insert(
            3,
            QuarterActual {
                net_income: dec!(1000),
                eps: dec!(1.25),
            },
        );
        let quarters = aggregate_quarters(&year_of_months(7), &asm);
        let q3 = &quarters[2];
        assert_eq!(q3.net_income, dec!(1000));
        assert_eq!(q3.eps, dec!(1.25));
        assert!(q3.is_actual);
        // the income statement above net income stays computed
        assert_eq!(q3.gross_profit, dec!(150));
    }

    #[test]
    fn test_disclosure_without_eps_derives_from_shares() {
        let mut asm = assumptions();
        asm.actual_quarters.insert(
            1,
            QuarterActual {
                net_income: dec!(250),
                eps: dec!(0),
            },
        );
        let quarters = aggregate_quarters(&year_of_months(0), &asm);
        assert_eq!(quarters[0].eps, dec!(25));
        assert!(quarters[0].is_actual);
    }

    #[test]
    fn test_non_positive_disclosure_ignored() {
        let mut asm = assumptions();
        asm.actual_quarters.insert(
            1,
            QuarterActual {
                net_income: dec!(-40),
                eps: dec!(-4),
            },
        );
        let quarters = aggregate_quarters(&year_of_months(0), &asm);
        assert_eq!(quarters[0].net_income, dec!(88));
        assert!(!quarters[0].is_actual);
    }

    #[test]
    fn test_annual_eps_sums_quarters() {
        let quarters = aggregate_quarters(&year_of_months(0), &assumptions());
        assert_eq!(annual_eps(&quarters), dec!(35.2));
    }

    #[test]
    fn test_compute_quarter_saturates_instead_of_overflowing() {
        let inputs = QuarterInputs {
            gross_margin: dec!(2),
            operating_expense: dec!(-10),
            non_operating_income: dec!(10),
            tax_rate: dec!(0),
        };
        let q = compute_quarter(1, Decimal::MAX, false, &inputs, dec!(0.5));
        assert_eq!(q.gross_profit, Decimal::MAX);
        assert_eq!(q.net_income, Decimal::MAX);
        assert_eq!(q.eps, Decimal::MAX);
    }

    #[test]
    fn test_quarter_revenue_and_annual_eps_saturate() {
        let months: Vec<_> = (1..=12).map(|m| month(m, Decimal::MAX, false)).collect();
        let mut quarters = aggregate_quarters(&months, &assumptions());
        assert!(quarters.iter().all(|q| q.revenue == Decimal::MAX));
        for q in quarters.iter_mut() {
            q.eps = Decimal::MAX;
        }
        assert_eq!(annual_eps(&quarters), Decimal::MAX);
    }
}
