pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Decimal places shown for ratio values in human-oriented output.
const DISPLAY_DP: u32 = 2;

/// Ratio values serialise as `{"status": "computed", "value": "0.2"}` or
/// `{"status": "undefined", "kind": "division_by_zero", ...}`. Render them as
/// the bare value or `undefined (kind)`; anything else yields None.
pub fn ratio_cell(value: &Value) -> Option<String> {
    render_ratio(value, None)
}

fn render_ratio(value: &Value, dp: Option<u32>) -> Option<String> {
    let map = value.as_object()?;
    match map.get("status")?.as_str()? {
        "computed" => map.get("value").map(|v| match (v.as_str(), dp) {
            (Some(text), Some(dp)) => Decimal::from_str(text)
                .map(|d| d.round_dp(dp).to_string())
                .unwrap_or_else(|_| text.to_string()),
            _ => render(v, dp),
        }),
        "undefined" => Some(format!(
            "undefined ({})",
            map.get("kind").and_then(Value::as_str).unwrap_or("unknown")
        )),
        _ => None,
    }
}

/// Full-precision text for a value; ratio values via [`ratio_cell`].
pub fn scalar(value: &Value) -> String {
    render(value, None)
}

/// Like [`scalar`], but ratio values are rounded for reading.
pub fn display(value: &Value) -> String {
    render(value, Some(DISPLAY_DP))
}

fn render(value: &Value, dp: Option<u32>) -> String {
    if let Some(cell) = render_ratio(value, dp) {
        return cell;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| render(v, dp))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten one level of nesting (`ratios.ROE` etc.) so reports fit a
/// two-column field/value layout. Ratio values are kept whole.
pub fn flatten_fields(map: &serde_json::Map<String, Value>) -> Vec<(String, &Value)> {
    let mut fields = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) if ratio_cell(val).is_none() => {
                for (inner_key, inner_val) in inner {
                    fields.push((format!("{key}.{inner_key}"), inner_val));
                }
            }
            _ => fields.push((key.clone(), val)),
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ratio_cell_rendering() {
        assert_eq!(
            ratio_cell(&json!({"status": "computed", "value": "0.2"})),
            Some("0.2".to_string())
        );
        assert_eq!(
            ratio_cell(&json!({"status": "undefined", "kind": "missing_input", "detail": "absent: ebit"})),
            Some("undefined (missing_input)".to_string())
        );
        assert_eq!(ratio_cell(&json!({"value": 1})), None);
        assert_eq!(ratio_cell(&json!("0.2")), None);
    }

    #[test]
    fn test_display_rounds_ratio_values_only() {
        let ev_ebit = json!({"status": "computed", "value": "7.3333333333333333333333333333"});
        assert_eq!(display(&ev_ebit), "7.33");
        assert_eq!(scalar(&ev_ebit), "7.3333333333333333333333333333");

        assert_eq!(display(&json!({"status": "computed", "value": "0.2"})), "0.2");
        assert_eq!(display(&json!({"status": "computed", "value": "26.2649"})), "26.26");
        assert_eq!(
            display(&json!({"status": "undefined", "kind": "division_by_zero"})),
            "undefined (division_by_zero)"
        );
        // plain fields such as market cap are not ratio values
        assert_eq!(display(&json!("3459000000000.123")), "3459000000000.123");
    }

    #[test]
    fn test_flatten_nested_report() {
        let value = json!({
            "enterprise_value": {"status": "computed", "value": "1100"},
            "ratios": {
                "EV_EBIT": {"status": "computed", "value": "11"},
                "ROE": {"status": "undefined", "kind": "missing_input", "detail": "absent: net_income"}
            },
            "computed": 1
        });
        let fields = flatten_fields(value.as_object().unwrap());
        let rendered: Vec<(String, String)> =
            fields.into_iter().map(|(k, v)| (k, scalar(v))).collect();
        assert_eq!(
            rendered,
            vec![
                ("enterprise_value".to_string(), "1100".to_string()),
                ("ratios.EV_EBIT".to_string(), "11".to_string()),
                ("ratios.ROE".to_string(), "undefined (missing_input)".to_string()),
                ("computed".to_string(), "1".to_string()),
            ]
        );
    }
}
