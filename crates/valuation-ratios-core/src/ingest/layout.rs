use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::ratios::FinancialField;
use crate::ValuationResult;

/// The four per-company datasets a snapshot is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Income statement items, one column per reporting period
    Financials,
    BalanceSheet,
    Cashflow,
    /// Current quote / company profile record (not period-indexed)
    Info,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Financials,
        DatasetKind::BalanceSheet,
        DatasetKind::Cashflow,
        DatasetKind::Info,
    ];

    /// Substituted for `{kind}` in the file pattern.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financials => "financials",
            Self::BalanceSheet => "balance_sheet",
            Self::Cashflow => "cashflow",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one snapshot attribute is read from. The first label present in the
/// dataset wins, so providers that rename items can be listed side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSource {
    pub dataset: DatasetKind,
    pub labels: Vec<String>,
}

impl FieldSource {
    fn new(dataset: DatasetKind, labels: &[&str]) -> Self {
        Self {
            dataset,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// How a directory of per-company datasets maps onto [`CompanyFinancials`].
///
/// Deserialises from JSON or YAML; keys left out fall back to the defaults,
/// which match statement exports keyed by Yahoo Finance item labels.
///
/// [`CompanyFinancials`]: crate::ratios::CompanyFinancials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    /// File name pattern with `{ticker}` and `{kind}` placeholders
    pub file_pattern: String,
    pub fields: BTreeMap<FinancialField, FieldSource>,
    /// A period is complete when all of these are present
    pub complete_period_fields: Vec<FinancialField>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        use DatasetKind::*;
        use FinancialField::*;

        let fields = BTreeMap::from([
            (NetIncome, FieldSource::new(Financials, &["Net Income"])),
            (Ebit, FieldSource::new(Financials, &["EBIT"])),
            (Ebitda, FieldSource::new(Financials, &["EBITDA", "Normalized EBITDA"])),
            (TaxProvision, FieldSource::new(Financials, &["Tax Provision"])),
            (PretaxIncome, FieldSource::new(Financials, &["Pretax Income"])),
            (DilutedEps, FieldSource::new(Financials, &["Diluted EPS"])),
            (
                StockholdersEquity,
                FieldSource::new(BalanceSheet, &["Stockholders Equity"]),
            ),
            (
                InvestedCapital,
                FieldSource::new(BalanceSheet, &["Invested Capital"]),
            ),
            (TotalDebt, FieldSource::new(BalanceSheet, &["Total Debt"])),
            (
                CashAndEquivalents,
                FieldSource::new(BalanceSheet, &["Cash And Cash Equivalents"]),
            ),
            (FreeCashFlow, FieldSource::new(Cashflow, &["Free Cash Flow"])),
            (MarketCap, FieldSource::new(Info, &["marketCap"])),
            (CurrentPrice, FieldSource::new(Info, &["currentPrice", "regularMarketPrice"])),
        ]);

        Self {
            file_pattern: "{ticker}_{kind}.json".into(),
            fields,
            complete_period_fields: vec![
                NetIncome,
                StockholdersEquity,
                Ebit,
                Ebitda,
                FreeCashFlow,
            ],
        }
    }
}

impl SourceLayout {
    pub fn validate(&self) -> ValuationResult<()> {
        if !self.file_pattern.contains("{ticker}") || !self.file_pattern.contains("{kind}") {
            return Err(ValuationError::InvalidInput {
                field: "file_pattern".into(),
                reason: format!(
                    "'{}' must contain both {{ticker}} and {{kind}}",
                    self.file_pattern
                ),
            });
        }
        for (field, source) in &self.fields {
            if source.labels.iter().all(|l| l.trim().is_empty()) {
                return Err(ValuationError::InvalidInput {
                    field: format!("fields.{field}"),
                    reason: "at least one non-empty label is required".into(),
                });
            }
        }
        Ok(())
    }

    /// File name for one dataset of one company.
    pub fn file_name(&self, ticker: &str, kind: DatasetKind) -> String {
        self.file_pattern
            .replace("{ticker}", ticker)
            .replace("{kind}", kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid_and_maps_all_fields() {
        let layout = SourceLayout::default();
        layout.validate().unwrap();
        assert_eq!(layout.fields.len(), FinancialField::ALL.len());
        assert_eq!(layout.complete_period_fields.len(), 5);
    }

    #[test]
    fn test_file_name() {
        let layout = SourceLayout::default();
        assert_eq!(
            layout.file_name("AAPL", DatasetKind::BalanceSheet),
            "AAPL_balance_sheet.json"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let layout: SourceLayout =
            serde_json::from_str(r#"{ "file_pattern": "{kind}/{ticker}.json" }"#).unwrap();
        assert_eq!(layout.file_name("MSFT", DatasetKind::Info), "info/MSFT.json");
        assert_eq!(layout.fields, SourceLayout::default().fields);
    }

    #[test]
    fn test_field_override_from_json() {
        let layout: SourceLayout = serde_json::from_str(
            r#"{ "fields": { "net_income": { "dataset": "financials", "labels": ["Net Income Common Stockholders"] } } }"#,
        )
        .unwrap();
        assert_eq!(layout.fields.len(), 1);
        assert_eq!(
            layout.fields[&FinancialField::NetIncome].labels,
            vec!["Net Income Common Stockholders".to_string()]
        );
    }

    #[test]
    fn test_pattern_without_placeholder_rejected() {
        let layout = SourceLayout {
            file_pattern: "data.json".into(),
            ..Default::default()
        };
        match layout.validate().unwrap_err() {
            ValuationError::InvalidInput { field, .. } => assert_eq!(field, "file_pattern"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_labels_rejected() {
        let mut layout = SourceLayout::default();
        layout.fields.insert(
            FinancialField::Ebit,
            FieldSource {
                dataset: DatasetKind::Financials,
                labels: vec![" ".into()],
            },
        );
        assert!(layout.validate().is_err());
    }
}
