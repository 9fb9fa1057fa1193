use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use revproj_core::period;

use super::values::{amount, display, field, flag, object_rows, percent};

const MONTH_HEADERS: [&str; 10] = [
    "Month",
    "Revenue",
    "YoY %",
    "MoM %",
    "Prev-year revenue",
    "Prev-month revenue",
    "Ref YoY %",
    "Ref MoM %",
    "Ref revenue",
    "Status",
];

const QUARTER_HEADERS: [&str; 8] = [
    "Quarter",
    "Revenue",
    "Gross profit",
    "Operating income",
    "Pre-tax income",
    "Net income",
    "EPS",
    "Status",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result(result, map),
            None => print_fields(map),
        },
        Value::Array(arr) => print_records(arr),
        _ => println!("{}", display(value)),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res) if is_projection(res) => print_projection(res),
        Value::Object(res) => print_sections(res),
        Value::Array(arr) => print_records(arr),
        other => println!("{}", display(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_projection(res: &Map<String, Value>) -> bool {
    res.contains_key("months") && res.contains_key("quarters") && res.contains_key("estimated_price")
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn print_projection(res: &Map<String, Value>) {
    println!("Projection {}", display(field(res, "year")));

    if let Some(months) = object_rows(field(res, "months")) {
        let mut builder = Builder::default();
        builder.push_record(MONTH_HEADERS);
        for m in months {
            builder.push_record(month_row(m));
        }
        println!("{}", Table::from(builder));
    }

    if let Some(quarters) = object_rows(field(res, "quarters")) {
        let mut builder = Builder::default();
        builder.push_record(QUARTER_HEADERS);
        for q in quarters {
            builder.push_record(quarter_row(q));
        }
        println!("\n{}", Table::from(builder));
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (label, row) in summary_rows(res) {
        builder.push_record([label.to_string(), row]);
    }
    println!("\n{}", Table::from(builder));
}

fn month_row(m: &Map<String, Value>) -> Vec<String> {
    let month = field(m, "month").as_u64().unwrap_or(0) as u32;
    let status = if flag(field(m, "is_actual")) {
        "actual"
    } else if flag(field(m, "has_reference")) {
        "editable"
    } else {
        "editable (no reference)"
    };
    vec![
        period::month_name(month),
        amount(field(m, "revenue")),
        percent(field(m, "yoy")),
        percent(field(m, "mom")),
        amount(field(m, "previous_year_revenue")),
        amount(field(m, "previous_month_revenue")),
        percent(field(m, "reference_yoy")),
        percent(field(m, "reference_mom")),
        amount(field(m, "reference_revenue")),
        status.to_string(),
    ]
}

fn quarter_row(q: &Map<String, Value>) -> Vec<String> {
    let status = if flag(field(q, "is_actual")) {
        "actual"
    } else {
        "estimate"
    };
    vec![
        format!("Q{}", display(field(q, "quarter"))),
        amount(field(q, "revenue")),
        amount(field(q, "gross_profit")),
        amount(field(q, "operating_income")),
        amount(field(q, "pre_tax_income")),
        amount(field(q, "net_income")),
        amount(field(q, "eps")),
        status.to_string(),
    ]
}

fn summary_rows(res: &Map<String, Value>) -> Vec<(&'static str, String)> {
    vec![
        ("Annual revenue", amount(field(res, "annual_revenue"))),
        ("Annual EPS", amount(field(res, "annual_eps"))),
        ("Estimated price", amount(field(res, "estimated_price"))),
        ("Upside %", percent(field(res, "upside"))),
        ("Avg YoY %", percent(field(res, "avg_yoy"))),
        ("Avg MoM %", percent(field(res, "avg_mom"))),
    ]
}

// ---------------------------------------------------------------------------
// Generic
// ---------------------------------------------------------------------------

/// Scalar fields in one table, then one table per array-of-objects field.
fn print_sections(res: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in res {
        match object_rows(val) {
            Some(_) => nested.push((key, val)),
            None => builder.push_record([key.as_str(), &display(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in nested {
        println!("\n{}:", key);
        if let Value::Array(arr) = val {
            print_records(arr);
        }
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &display(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_records(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(display).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", display(item));
        }
    }
}
