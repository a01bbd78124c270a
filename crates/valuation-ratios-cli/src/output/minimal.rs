use serde_json::Value;

use super::display;

/// Print just the key answer from the output.
///
/// A report prints one `NAME value` line per ratio; single-value commands
/// print the bare value; row sets print one line per row.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(rows)) = result_obj.get("results") {
        for row in rows.iter().filter_map(Value::as_object) {
            let cells: Vec<String> = row.values().map(display).collect();
            println!("{}", cells.join(" "));
        }
        return;
    }

    if let Some(Value::Object(ratios)) = result_obj.get("ratios") {
        for (name, val) in ratios {
            println!("{} {}", name, display(val));
        }
        return;
    }

    let priority_keys = ["enterprise_value", "effective_tax_rate"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                println!("{}", display(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, display(val));
            return;
        }
    }

    println!("{}", display(result_obj));
}
