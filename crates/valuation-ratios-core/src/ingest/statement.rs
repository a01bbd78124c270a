use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::ValuationError;
use crate::types::Money;
use crate::ValuationResult;

/// One statement dataset (income statement, balance sheet or cash flow):
/// reported items by period.
///
/// Source JSON is column-oriented, one object per period:
///
/// ```json
/// { "1727654400000": { "Net Income": 93736000000.0, "EBIT": null }, ... }
/// ```
///
/// Period keys are epoch milliseconds or ISO dates. `null` items are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementTable {
    periods: BTreeMap<NaiveDate, BTreeMap<String, Money>>,
}

impl StatementTable {
    pub fn from_json_str(json: &str) -> ValuationResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> ValuationResult<Self> {
        let columns = value.as_object().ok_or_else(|| ValuationError::InvalidInput {
            field: "statement".into(),
            reason: "expected an object keyed by period".into(),
        })?;

        let mut periods = BTreeMap::new();
        for (key, items) in columns {
            let period = parse_period_key(key)?;
            let items = items.as_object().ok_or_else(|| ValuationError::InvalidInput {
                field: format!("statement[{key}]"),
                reason: "expected an object of line items".into(),
            })?;

            let mut row = BTreeMap::new();
            for (label, raw) in items {
                match raw {
                    Value::Null => {}
                    Value::Number(n) => match decimal_from_number(n, label) {
                        Ok(d) => {
                            row.insert(label.clone(), d);
                        }
                        Err(e) => debug!(%period, %label, error = %e, "skipping out-of-range item"),
                    },
                    Value::String(s) => match parse_decimal(s) {
                        Some(d) => {
                            row.insert(label.clone(), d);
                        }
                        None => debug!(%period, %label, value = %s, "skipping non-numeric item"),
                    },
                    other => debug!(%period, %label, value = %other, "skipping non-numeric item"),
                }
            }
            periods.insert(period, row);
        }

        Ok(Self { periods })
    }

    /// Reporting dates, oldest first.
    pub fn periods(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.periods.keys().copied()
    }

    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.periods.keys().next_back().copied()
    }

    pub fn value(&self, period: NaiveDate, label: &str) -> Option<Money> {
        self.periods.get(&period)?.get(label).copied()
    }

    /// First present value among `labels`.
    pub fn first_value(&self, period: NaiveDate, labels: &[String]) -> Option<Money> {
        labels.iter().find_map(|label| self.value(period, label))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Epoch milliseconds (`"1727654400000"`) or an ISO date, optionally with a
/// time part (`"2024-09-28"`, `"2024-09-28T00:00:00.000"`).
pub(crate) fn parse_period_key(key: &str) -> ValuationResult<NaiveDate> {
    let key = key.trim();
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        let millis: i64 = key
            .parse()
            .map_err(|_| ValuationError::DateError(format!("timestamp out of range: {key}")))?;
        return DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ValuationError::DateError(format!("timestamp out of range: {key}")));
    }

    key.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| ValuationError::DateError(format!("unrecognised period key: '{key}'")))
}

/// Convert through the number's text so `0.1` stays `0.1` rather than the
/// nearest binary fraction.
pub(crate) fn decimal_from_number(n: &Number, label: &str) -> ValuationResult<Decimal> {
    parse_decimal(&n.to_string()).ok_or_else(|| ValuationError::InvalidInput {
        field: label.to_string(),
        reason: format!("{n} is outside the decimal range"),
    })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
