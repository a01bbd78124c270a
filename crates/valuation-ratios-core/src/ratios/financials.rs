use serde::{Deserialize, Serialize};

use crate::types::{Money, PerShare};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One valuation snapshot of a company: the statement items of a single
/// reporting period plus the current market quote.
///
/// Every attribute is optional. `None` means the source did not report the
/// item, which is never the same thing as a reported zero. Absent keys and
/// JSON `null` both deserialise to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Period net income
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Money>,
    /// Stockholders' equity (negative for distressed firms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stockholders_equity: Option<Money>,
    /// Earnings before interest and taxes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebit: Option<Money>,
    /// EBIT plus depreciation and amortisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<Money>,
    /// Income tax provision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_provision: Option<Money>,
    /// Pre-tax income
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretax_income: Option<Money>,
    /// Invested capital
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invested_capital: Option<Money>,
    /// Diluted earnings per share
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diluted_eps: Option<PerShare>,
    /// Current share price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<PerShare>,
    /// Market capitalisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Money>,
    /// Total debt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_debt: Option<Money>,
    /// Cash and cash equivalents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_and_equivalents: Option<Money>,
    /// Free cash flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_cash_flow: Option<Money>,
}

/// Names a single attribute of [`CompanyFinancials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialField {
    NetIncome,
    StockholdersEquity,
    Ebit,
    Ebitda,
    TaxProvision,
    PretaxIncome,
    InvestedCapital,
    DilutedEps,
    CurrentPrice,
    MarketCap,
    TotalDebt,
    CashAndEquivalents,
    FreeCashFlow,
}

impl FinancialField {
    pub const ALL: [FinancialField; 13] = [
        FinancialField::NetIncome,
        FinancialField::StockholdersEquity,
        FinancialField::Ebit,
        FinancialField::Ebitda,
        FinancialField::TaxProvision,
        FinancialField::PretaxIncome,
        FinancialField::InvestedCapital,
        FinancialField::DilutedEps,
        FinancialField::CurrentPrice,
        FinancialField::MarketCap,
        FinancialField::TotalDebt,
        FinancialField::CashAndEquivalents,
        FinancialField::FreeCashFlow,
    ];

    /// The snake_case attribute name, as used in JSON input.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetIncome => "net_income",
            Self::StockholdersEquity => "stockholders_equity",
            Self::Ebit => "ebit",
            Self::Ebitda => "ebitda",
            Self::TaxProvision => "tax_provision",
            Self::PretaxIncome => "pretax_income",
            Self::InvestedCapital => "invested_capital",
            Self::DilutedEps => "diluted_eps",
            Self::CurrentPrice => "current_price",
            Self::MarketCap => "market_cap",
            Self::TotalDebt => "total_debt",
            Self::CashAndEquivalents => "cash_and_equivalents",
            Self::FreeCashFlow => "free_cash_flow",
        }
    }
}

impl std::fmt::Display for FinancialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl CompanyFinancials {
    /// Value of one attribute, `None` when absent.
    pub fn get(&self, field: FinancialField) -> Option<Money> {
        *self.slot(field)
    }

    /// Builder-style setter used when assembling a snapshot.
    pub fn with(mut self, field: FinancialField, value: Money) -> Self {
        *self.slot_mut(field) = Some(value);
        self
    }

    /// Set or clear one attribute while the snapshot is being assembled.
    pub fn set(&mut self, field: FinancialField, value: Option<Money>) {
        *self.slot_mut(field) = value;
    }

    /// Attributes the source did not report, in declaration order.
    pub fn missing_fields(&self) -> Vec<FinancialField> {
        FinancialField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// True when no attribute is present at all.
    pub fn is_empty(&self) -> bool {
        FinancialField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    fn slot(&self, field: FinancialField) -> &Option<Money> {
        match field {
            FinancialField::NetIncome => &self.net_income,
            FinancialField::StockholdersEquity => &self.stockholders_equity,
            FinancialField::Ebit => &self.ebit,
            FinancialField::Ebitda => &self.ebitda,
            FinancialField::TaxProvision => &self.tax_provision,
            FinancialField::PretaxIncome => &self.pretax_income,
            FinancialField::InvestedCapital => &self.invested_capital,
            FinancialField::DilutedEps => &self.diluted_eps,
            FinancialField::CurrentPrice => &self.current_price,
            FinancialField::MarketCap => &self.market_cap,
            FinancialField::TotalDebt => &self.total_debt,
            FinancialField::CashAndEquivalents => &self.cash_and_equivalents,
            FinancialField::FreeCashFlow => &self.free_cash_flow,
        }
    }

    fn slot_mut(&mut self, field: FinancialField) -> &mut Option<Money> {
        match field {
            FinancialField::NetIncome => &mut self.net_income,
            FinancialField::StockholdersEquity => &mut self.stockholders_equity,
            FinancialField::Ebit => &mut self.ebit,
            FinancialField::Ebitda => &mut self.ebitda,
            FinancialField::TaxProvision => &mut self.tax_provision,
            FinancialField::PretaxIncome => &mut self.pretax_income,
            FinancialField::InvestedCapital => &mut self.invested_capital,
            FinancialField::DilutedEps => &mut self.diluted_eps,
            FinancialField::CurrentPrice => &mut self.current_price,
            FinancialField::MarketCap => &mut self.market_cap,
            FinancialField::TotalDebt => &mut self.total_debt,
            FinancialField::CashAndEquivalents => &mut self.cash_and_equivalents,
            FinancialField::FreeCashFlow => &mut self.free_cash_flow,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
