use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::layout::{DatasetKind, FieldSource, SourceLayout};
use super::statement::{decimal_from_number, StatementTable};
use crate::error::ValuationError;
use crate::ratios::CompanyFinancials;
use crate::types::Money;
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which reporting period a snapshot is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodSelection {
    /// Most recent period of any statement
    Latest,
    /// Most recent period where every complete-period field is present
    #[default]
    LatestComplete,
    On(NaiveDate),
}

impl FromStr for PeriodSelection {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "latest-complete" | "latest_complete" => Ok(Self::LatestComplete),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Self::On)
                .map_err(|_| ValuationError::InvalidInput {
                    field: "period".into(),
                    reason: format!(
                        "'{s}' is not 'latest', 'latest-complete' or a YYYY-MM-DD date"
                    ),
                }),
        }
    }
}

/// A snapshot together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub ticker: String,
    pub period: NaiveDate,
    pub financials: CompanyFinancials,
}

/// Every dataset loaded for one company.
#[derive(Debug, Clone, Default)]
pub struct CompanyDataset {
    pub ticker: String,
    pub financials: StatementTable,
    pub balance_sheet: StatementTable,
    pub cashflow: StatementTable,
    pub info: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl CompanyDataset {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }

    /// Install one parsed dataset. `Info` must be a JSON object; the other
    /// kinds are parsed as [`StatementTable`]s.
    pub fn load(&mut self, kind: DatasetKind, value: &Value) -> ValuationResult<()> {
        match kind {
            DatasetKind::Info => {
                self.info = value
                    .as_object()
                    .cloned()
                    .ok_or_else(|| ValuationError::InvalidInput {
                        field: "info".into(),
                        reason: "expected a JSON object".into(),
                    })?;
            }
            DatasetKind::Financials => self.financials = StatementTable::from_value(value)?,
            DatasetKind::BalanceSheet => self.balance_sheet = StatementTable::from_value(value)?,
            DatasetKind::Cashflow => self.cashflow = StatementTable::from_value(value)?,
        }
        Ok(())
    }

    pub fn statement(&self, kind: DatasetKind) -> Option<&StatementTable> {
        match kind {
            DatasetKind::Financials => Some(&self.financials),
            DatasetKind::BalanceSheet => Some(&self.balance_sheet),
            DatasetKind::Cashflow => Some(&self.cashflow),
            DatasetKind::Info => None,
        }
    }

    /// Union of the statement periods, oldest first.
    pub fn periods(&self) -> Vec<NaiveDate> {
        let all: BTreeSet<NaiveDate> = self
            .financials
            .periods()
            .chain(self.balance_sheet.periods())
            .chain(self.cashflow.periods())
            .collect();
        all.into_iter().collect()
    }

    /// Periods in which every complete-period field is reported.
    pub fn complete_periods(&self, layout: &SourceLayout) -> Vec<NaiveDate> {
        self.periods()
            .into_iter()
            .filter(|p| {
                layout.complete_period_fields.iter().all(|field| {
                    layout
                        .fields
                        .get(field)
                        .and_then(|source| self.lookup(source, *p))
                        .is_some()
                })
            })
            .collect()
    }

    /// Build the snapshot for the selected period: statement items from that
    /// period plus the current quote from the info record.
    pub fn snapshot(
        &self,
        layout: &SourceLayout,
        selection: PeriodSelection,
    ) -> ValuationResult<PeriodSnapshot> {
        let periods = self.periods();
        if periods.is_empty() {
            return Err(ValuationError::InsufficientData(format!(
                "no statement periods for {}",
                self.ticker
            )));
        }

        let period = match selection {
            PeriodSelection::Latest => *periods.last().ok_or_else(|| {
                ValuationError::InsufficientData(format!("no periods for {}", self.ticker))
            })?,
            PeriodSelection::LatestComplete => {
                *self.complete_periods(layout).last().ok_or_else(|| {
                    ValuationError::InsufficientData(format!(
                        "no complete reporting period for {}",
                        self.ticker
                    ))
                })?
            }
            PeriodSelection::On(date) => {
                if !periods.contains(&date) {
                    return Err(ValuationError::InvalidInput {
                        field: "period".into(),
                        reason: format!("{} has no reporting period on {date}", self.ticker),
                    });
                }
                date
            }
        };
        debug!(ticker = %self.ticker, %period, ?selection, "selected reporting period");

        Ok(PeriodSnapshot {
            ticker: self.ticker.clone(),
            period,
            financials: self.financials_for(layout, period, true),
        })
    }

    /// One snapshot per period, oldest first. Market quote fields are left
    /// absent because the info record only describes the present.
    pub fn history(&self, layout: &SourceLayout) -> Vec<PeriodSnapshot> {
        self.periods()
            .into_iter()
            .map(|period| PeriodSnapshot {
                ticker: self.ticker.clone(),
                period,
                financials: self.financials_for(layout, period, false),
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn financials_for(
        &self,
        layout: &SourceLayout,
        period: NaiveDate,
        include_quote: bool,
    ) -> CompanyFinancials {
        let mut financials = CompanyFinancials::default();
        for (field, source) in &layout.fields {
            if source.dataset == DatasetKind::Info && !include_quote {
                continue;
            }
            financials.set(*field, self.lookup(source, period));
        }
        financials
    }

    fn lookup(&self, source: &FieldSource, period: NaiveDate) -> Option<Money> {
        match self.statement(source.dataset) {
            Some(table) => table.first_value(period, &source.labels),
            None => source.labels.iter().find_map(|l| self.info_value(l)),
        }
    }

    fn info_value(&self, key: &str) -> Option<Money> {
        match self.info.get(key)? {
            Value::Number(n) => match decimal_from_number(n, key) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!(ticker = %self.ticker, key, error = %e, "ignoring info value");
                    None
                }
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::FinancialField;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dataset() -> CompanyDataset {
        let mut ds = CompanyDataset::new("ACME");
        ds.load(
            DatasetKind::Financials,
            &json!({
                "2023-12-31": { "Net Income": 80, "EBIT": 120, "EBITDA": 150,
                                "Tax Provision": 20, "Pretax Income": 100, "Diluted EPS": 4 },
                "2024-12-31": { "Net Income": 100, "EBIT": 150, "EBITDA": 190,
                                "Tax Provision": 30, "Pretax Income": 120, "Diluted EPS": 5 }
            }),
        )
        .unwrap();
        ds.load(
            DatasetKind::BalanceSheet,
            &json!({
                "2023-12-31": { "Stockholders Equity": 400, "Invested Capital": 900,
                                "Total Debt": 200, "Cash And Cash Equivalents": 50 },
                "2024-12-31": { "Stockholders Equity": 500, "Invested Capital": 1000,
                                "Total Debt": 200, "Cash And Cash Equivalents": 100 }
            }),
        )
        .unwrap();
        ds.load(
            DatasetKind::Cashflow,
            &json!({
                "2023-12-31": { "Free Cash Flow": 70 },
                "2024-12-31": { "Free Cash Flow": null }
            }),
        )
        .unwrap();
        ds.load(
            DatasetKind::Info,
            &json!({ "marketCap": 1000, "currentPrice": 150.5, "sector": "Industrials" }),
        )
        .unwrap();
        ds
    }

    #[test]
    fn test_parse_period_selection() {
        assert_eq!("latest".parse::<PeriodSelection>().unwrap(), PeriodSelection::Latest);
        assert_eq!(
            "latest-complete".parse::<PeriodSelection>().unwrap(),
            PeriodSelection::LatestComplete
        );
        assert_eq!(
            "2024-12-31".parse::<PeriodSelection>().unwrap(),
            PeriodSelection::On(date(2024, 12, 31))
        );
        assert!("last year".parse::<PeriodSelection>().is_err());
    }

    #[test]
    fn test_latest_complete_skips_period_without_fcf() {
        let ds = sample_dataset();
        let layout = SourceLayout::default();
        assert_eq!(ds.complete_periods(&layout), vec![date(2023, 12, 31)]);

        let snap = ds.snapshot(&layout, PeriodSelection::LatestComplete).unwrap();
        assert_eq!(snap.period, date(2023, 12, 31));
        assert_eq!(snap.financials.free_cash_flow, Some(dec!(70)));
        assert_eq!(snap.financials.net_income, Some(dec!(80)));
        // quote comes from info regardless of period
        assert_eq!(snap.financials.market_cap, Some(dec!(1000)));
        assert_eq!(snap.financials.current_price, Some(dec!(150.5)));
    }

    #[test]
    fn test_latest_keeps_absent_fcf_absent() {
        let ds = sample_dataset();
        let snap = ds
            .snapshot(&SourceLayout::default(), PeriodSelection::Latest)
            .unwrap();
        assert_eq!(snap.period, date(2024, 12, 31));
        assert_eq!(snap.financials.free_cash_flow, None);
        assert_eq!(
            snap.financials.missing_fields(),
            vec![FinancialField::FreeCashFlow]
        );
    }

    #[test]
    fn test_explicit_period_must_exist() {
        let ds = sample_dataset();
        let err = ds
            .snapshot(&SourceLayout::default(), PeriodSelection::On(date(2022, 12, 31)))
            .unwrap_err();
        match err {
            ValuationError::InvalidInput { field, .. } => assert_eq!(field, "period"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_dataset_is_insufficient() {
        let ds = CompanyDataset::new("NONE");
        assert!(matches!(
            ds.snapshot(&SourceLayout::default(), PeriodSelection::Latest),
            Err(ValuationError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_no_complete_period_is_insufficient() {
        let mut ds = sample_dataset();
        ds.cashflow = StatementTable::default();
        assert!(matches!(
            ds.snapshot(&SourceLayout::default(), PeriodSelection::LatestComplete),
            Err(ValuationError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_history_omits_quote() {
        let ds = sample_dataset();
        let history = ds.history(&SourceLayout::default());
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period, date(2023, 12, 31));
        assert!(history.iter().all(|s| s.financials.market_cap.is_none()));
        assert_eq!(history[1].financials.stockholders_equity, Some(dec!(500)));
    }

    #[test]
    fn test_info_must_be_object() {
        let mut ds = CompanyDataset::new("X");
        assert!(ds.load(DatasetKind::Info, &json!([1, 2])).is_err());
    }

    #[test]
    fn test_non_numeric_info_value_is_absent() {
        let mut ds = sample_dataset();
        ds.info.insert("marketCap".into(), json!("unknown"));
        let snap = ds
            .snapshot(&SourceLayout::default(), PeriodSelection::Latest)
            .unwrap();
        assert_eq!(snap.financials.market_cap, None);
    }
}
