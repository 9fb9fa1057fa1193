use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProjectionError;
use crate::types::{Money, Multiple, Rate};
use crate::ProjectionResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Profitability assumptions that turn quarterly revenue into net income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterInputs {
    /// Gross margin as a decimal (0.53 = 53%)
    pub gross_margin: Rate,
    /// Operating expense per quarter, same units as revenue
    pub operating_expense: Money,
    /// Non-operating income per quarter, same units as revenue
    pub non_operating_income: Money,
    /// Effective tax rate as a decimal
    pub tax_rate: Rate,
}

/// Per-quarter replacement for any subset of [`QuarterInputs`].
/// Absent fields fall back to the global value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_expense: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_operating_income: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Rate>,
}

impl QuarterOverride {
    pub fn is_empty(&self) -> bool {
        self.gross_margin.is_none()
            && self.operating_expense.is_none()
            && self.non_operating_income.is_none()
            && self.tax_rate.is_none()
    }

    /// Lay the present fields over `base`.
    pub fn apply(&self, base: QuarterInputs) -> QuarterInputs {
        QuarterInputs {
            gross_margin: self.gross_margin.unwrap_or(base.gross_margin),
            operating_expense: self.operating_expense.unwrap_or(base.operating_expense),
            non_operating_income: self
                .non_operating_income
                .unwrap_or(base.non_operating_income),
            tax_rate: self.tax_rate.unwrap_or(base.tax_rate),
        }
    }
}

/// Officially disclosed quarterly figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterActual {
    pub net_income: Money,
    /// Disclosed EPS; zero or negative means "derive from net income"
    #[serde(default)]
    pub eps: Decimal,
}

/// Everything the engine needs besides revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Gross margin as a decimal, used by every quarter without an override
    pub gross_margin: Rate,
    /// Operating expense per quarter
    pub operating_expense: Money,
    /// Non-operating income per quarter
    pub non_operating_income: Money,
    /// Effective tax rate as a decimal
    pub tax_rate: Rate,
    /// Shares outstanding, same unit basis as net income / EPS
    pub shares_outstanding: Decimal,
    /// P/E multiple applied to annual EPS
    pub per_multiple: Multiple,
    /// Current share price; zero disables the upside calculation
    #[serde(default)]
    pub current_price: Money,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quarter_overrides: BTreeMap<u8, QuarterOverride>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actual_quarters: BTreeMap<u8, QuarterActual>,
}

impl Assumptions {
    pub fn validate(&self) -> ProjectionResult<()> {
        if self.shares_outstanding <= Decimal::ZERO {
            return Err(ProjectionError::InvalidAssumption {
                field: "shares_outstanding".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// The global profitability inputs.
    pub fn base_inputs(&self) -> QuarterInputs {
        QuarterInputs {
            gross_margin: self.gross_margin,
            operating_expense: self.operating_expense,
            non_operating_income: self.non_operating_income,
            tax_rate: self.tax_rate,
        }
    }

    /// Inputs for quarter `q`: the global values with that quarter's
    /// override fields substituted.
    pub fn quarter_inputs(&self, quarter: u8) -> QuarterInputs {
        let base = self.base_inputs();
        match self.quarter_overrides.get(&quarter) {
            Some(ov) => ov.apply(base),
            None => base,
        }
    }

    /// Disclosure for quarter `q` when it carries a positive net income.
    pub fn disclosed(&self, quarter: u8) -> Option<&QuarterActual> {
        self.actual_quarters
            .get(&quarter)
            .filter(|a| a.net_income > Decimal::ZERO)
    }
}
