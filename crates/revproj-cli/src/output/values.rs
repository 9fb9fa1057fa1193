use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use revproj_core::types::rate_to_percent;

/// Decimals serialise as strings; accept either form.
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    }
}

/// Amount rounded to two places, trailing zeros dropped.
pub fn amount(value: &Value) -> String {
    decimal(value)
        .map(|d| d.round_dp(2).normalize().to_string())
        .unwrap_or_else(|| display(value))
}

/// Rate shown as a percentage, e.g. 0.1534 -> 15.34. Rates too large to
/// scale are shown as given.
pub fn percent(value: &Value) -> String {
    decimal(value)
        .and_then(rate_to_percent)
        .map(|d| d.round_dp(2).normalize().to_string())
        .unwrap_or_else(|| display(value))
}

pub fn flag(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

pub fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a Value {
    obj.get(key).unwrap_or(&Value::Null)
}

/// Object rows of an array field, if the field is a non-empty array of objects.
pub fn object_rows<'a>(value: &'a Value) -> Option<Vec<&'a Map<String, Value>>> {
    let arr = value.as_array()?;
    if arr.is_empty() {
        return None;
    }
    arr.iter().map(Value::as_object).collect()
}

pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(display).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
