use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 23x P/E)
pub type Multiple = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Convert a percentage figure (17.3) into a decimal rate (0.173).
pub fn percent_to_rate(percent: Decimal) -> Rate {
    percent / Decimal::ONE_HUNDRED
}

/// Convert a decimal rate (0.173) into a percentage figure (17.3), or `None`
/// when the percentage is not representable.
pub fn rate_to_percent(rate: Rate) -> Option<Decimal> {
    rate.checked_mul(Decimal::ONE_HUNDRED)
}

// ---------------------------------------------------------------------------
// Overflow-safe arithmetic
// ---------------------------------------------------------------------------

/// `base * (1 + rate)`, or `None` when the result overflows.
pub fn checked_growth(base: Money, rate: Rate) -> Option<Money> {
    Decimal::ONE
        .checked_add(rate)
        .and_then(|factor| base.checked_mul(factor))
}

/// `(value - base) / base`, or `None` without a positive base or on overflow.
pub fn checked_change(value: Money, base: Money) -> Option<Rate> {
    if base <= Decimal::ZERO {
        return None;
    }
    value.checked_sub(base).and_then(|d| d.checked_div(base))
}

/// `a / b` clamped to the representable range. `b` must be non-zero.
pub fn saturating_div(a: Decimal, b: Decimal) -> Decimal {
    a.checked_div(b).unwrap_or(if a.is_sign_negative() == b.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}
