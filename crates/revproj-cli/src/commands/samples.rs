use serde_json::{json, Value};

use revproj_core::samples;

/// List the built-in sample companies with their default assumptions.
pub fn run_samples() -> Result<Value, Box<dyn std::error::Error>> {
    let companies: Vec<Value> = samples::sample_companies()
        .into_iter()
        .map(|c| {
            let d = &c.defaults;
            json!({
                "stock_no": c.stock_no,
                "name": c.name,
                "industry": c.industry,
                "years": c.available_years(),
                "gross_margin_pct": d.gross_margin_pct,
                "tax_rate_pct": d.tax_rate_pct,
                "shares_outstanding": d.shares_outstanding,
                "per_multiple": d.per_multiple,
                "current_price": d.current_price,
                "website": c.website,
            })
        })
        .collect();

    Ok(json!({ "result": companies }))
}
