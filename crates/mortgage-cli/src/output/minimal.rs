use serde_json::{Map, Value};

/// Key answer fields, most important first.
const PRIORITY_KEYS: [&str; 6] = [
    "monthly_payment",
    "current_balance",
    "periodic_payment",
    "payoff_months",
    "months_saved",
    "total_interest",
];

/// Print just the key answer value from the output.
///
/// Objects print their highest-priority field. Record arrays (scenarios,
/// schedule rows) print one `label: value` line per record, labelled by the
/// extra payment or period.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => println!("{}", key_answer(map)),
        Value::Array(rows) => {
            for row in rows {
                match row.as_object() {
                    Some(map) => println!("{}: {}", row_label(map), key_answer(map)),
                    None => println!("{}", format_minimal(row)),
                }
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn key_answer(map: &Map<String, Value>) -> String {
    PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
        .or_else(|| map.get("balance"))
        .map(format_minimal)
        .unwrap_or_else(|| "null".to_string())
}

fn row_label(map: &Map<String, Value>) -> String {
    ["extra_payment", "period"]
        .iter()
        .find_map(|key| map.get(*key))
        .map(format_minimal)
        .unwrap_or_default()
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
