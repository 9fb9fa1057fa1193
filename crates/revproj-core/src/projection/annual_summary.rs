use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::month_estimator::MonthEstimate;
use super::quarter_aggregator::{self, QuarterBreakdown};
use crate::types::{saturating_div, Money, Multiple, Rate};

/// Full-year totals and the valuation derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub annual_revenue: Money,
    pub annual_eps: Decimal,
    /// annual EPS x P/E multiple
    pub estimated_price: Money,
    /// (estimated - current) / current; zero without a current price
    pub upside: Rate,
}

pub fn summarize(
    months: &[MonthEstimate],
    quarters: &[QuarterBreakdown],
    per_multiple: Multiple,
    current_price: Money,
) -> AnnualSummary {
    let annual_revenue = months
        .iter()
        .fold(Decimal::ZERO, |acc, m| acc.saturating_add(m.revenue));
    let annual_eps = quarter_aggregator::annual_eps(quarters);
    let estimated_price = annual_eps.saturating_mul(per_multiple);

    AnnualSummary {
        annual_revenue,
        annual_eps,
        estimated_price,
        upside: upside(estimated_price, current_price),
    }
}

pub fn upside(estimated_price: Money, current_price: Money) -> Rate {
    if current_price > Decimal::ZERO {
        saturating_div(estimated_price.saturating_sub(current_price), current_price)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quarter(q: u8, eps: Decimal) -> QuarterBreakdown {
        QuarterBreakdown {
            quarter: q,
            revenue: dec!(0),
            gross_profit: dec!(0),
            operating_income: dec!(0),
            pre_tax_income: dec!(0),
            net_income: dec!(0),
            eps,
            is_actual: false,
        }
    }

    #[test]
    fn test_summarize_price_and_upside() {
        let quarters: Vec<_> = (1..=4).map(|q| quarter(q, dec!(1.5))).collect();
        let out = summarize(&[], &quarters, dec!(20), dec!(100));
        assert_eq!(out.annual_eps, dec!(6));
        assert_eq!(out.estimated_price, dec!(120));
        assert_eq!(out.upside, dec!(0.2));
        assert_eq!(out.annual_revenue, dec!(0));
    }

    #[test]
    fn test_upside_zero_without_price() {
        assert_eq!(upside(dec!(120), dec!(0)), dec!(0));
        assert_eq!(upside(dec!(120), dec!(-5)), dec!(0));
        assert_eq!(upside(dec!(50), dec!(100)), dec!(-0.5));
    }

    #[test]
    fn test_summarize_saturates_large_figures() {
        let quarters: Vec<_> = (1..=4).map(|q| quarter(q, Decimal::MAX)).collect();
        let out = summarize(&[], &quarters, dec!(20), dec!(0.0001));
        assert_eq!(out.annual_eps, Decimal::MAX);
        assert_eq!(out.estimated_price, Decimal::MAX);
        assert_eq!(out.upside, Decimal::MAX);
    }
}
