use serde_json::Value;

use super::values::display;

/// Key output fields, most important first.
const PRIORITY_KEYS: [&str; 4] = ["estimated_price", "latest_eps", "annual_eps", "year"];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            match map.get(key) {
                Some(Value::Null) | None => continue,
                // EPS references carry their period label alongside the figure
                Some(Value::Object(obj)) if obj.contains_key("eps") => {
                    let eps = obj.get("eps").map(display).unwrap_or_default();
                    return match obj.get("label") {
                        Some(label) => format!("{} {}", display(label), eps),
                        None => eps,
                    };
                }
                Some(val) => return display(val),
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, display(val));
        }
    }

    display(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_estimated_price_wins() {
        let value = json!({"result": {"annual_eps": "6", "estimated_price": "120", "year": 2024}});
        assert_eq!(minimal_line(&value), "120");
    }

    #[test]
    fn test_latest_eps_reference() {
        let value = json!({"result": {"latest_eps": {"label": "2024Q2", "eps": "9.00"}, "year": 2024}});
        assert_eq!(minimal_line(&value), "2024Q2 9.00");
        let missing = json!({"result": {"latest_eps": null, "year": 2024}});
        assert_eq!(minimal_line(&missing), "2024");
    }

    #[test]
    fn test_fallback_first_field() {
        let value = json!({"result": {"records": [], "stock_no": "2330"}});
        assert_eq!(minimal_line(&value), "records: ");
    }
}
