use serde_json::{Map, Value};
use std::io::{self, Write};

use super::values::{display, field, object_rows};

const MONTH_COLUMNS: [&str; 11] = [
    "month",
    "revenue",
    "yoy",
    "mom",
    "previous_year_revenue",
    "previous_month_revenue",
    "reference_yoy",
    "reference_mom",
    "reference_revenue",
    "has_reference",
    "is_actual",
];

const QUARTER_COLUMNS: [&str; 8] = [
    "quarter",
    "revenue",
    "gross_profit",
    "operating_income",
    "pre_tax_income",
    "net_income",
    "eps",
    "is_actual",
];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let _ = write_csv(stdout.lock(), value);
}

/// Projections become a month section followed by a quarter section, each
/// prefixed with its own header row.
pub fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(res) => {
            let months = object_rows(field(res, "months"));
            let quarters = object_rows(field(res, "quarters"));
            if let (Some(months), Some(quarters)) = (months, quarters) {
                write_section(&mut wtr, "month", &MONTH_COLUMNS, &months)?;
                write_section(&mut wtr, "quarter", &QUARTER_COLUMNS, &quarters)?;
            } else if let Some(rows) = res.values().find_map(object_rows) {
                write_records(&mut wtr, &rows)?;
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in res {
                    wtr.write_record([key.as_str(), &display(val)])?;
                }
            }
        }
        Value::Array(_) => {
            if let Some(rows) = object_rows(result) {
                write_records(&mut wtr, &rows)?;
            }
        }
        other => wtr.write_record([&display(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_section<W: Write>(
    wtr: &mut csv::Writer<W>,
    section: &str,
    columns: &[&str],
    rows: &[&Map<String, Value>],
) -> Result<(), csv::Error> {
    let mut header = vec!["section"];
    header.extend_from_slice(columns);
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![section.to_string()];
        record.extend(columns.iter().map(|c| display(field(row, c))));
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_records<W: Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[&Map<String, Value>],
) -> Result<(), csv::Error> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        let record: Vec<String> = headers.iter().map(|h| display(field(row, h))).collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}
