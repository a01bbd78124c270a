use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::financials::FinancialField;
use super::outcome::{RatioValue, UndefinedKind};
use crate::ValuationError;

/// The six valuation ratios the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatioName {
    #[serde(rename = "ROE")]
    Roe,
    #[serde(rename = "ROIC")]
    Roic,
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "EV_EBIT")]
    EvEbit,
    #[serde(rename = "EV_EBITDA")]
    EvEbitda,
    #[serde(rename = "EV_FCF")]
    EvFcf,
}

impl RatioName {
    pub const ALL: [RatioName; 6] = [
        RatioName::Roe,
        RatioName::Roic,
        RatioName::Per,
        RatioName::EvEbit,
        RatioName::EvEbitda,
        RatioName::EvFcf,
    ];

    /// Report key, e.g. `EV_EBITDA`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Roe => "ROE",
            Self::Roic => "ROIC",
            Self::Per => "PER",
            Self::EvEbit => "EV_EBIT",
            Self::EvEbitda => "EV_EBITDA",
            Self::EvFcf => "EV_FCF",
        }
    }

    /// The snapshot attribute the ratio divides by.
    pub fn denominator(&self) -> FinancialField {
        match self {
            Self::Roe => FinancialField::StockholdersEquity,
            Self::Roic => FinancialField::InvestedCapital,
            Self::Per => FinancialField::DilutedEps,
            Self::EvEbit => FinancialField::Ebit,
            Self::EvEbitda => FinancialField::Ebitda,
            Self::EvFcf => FinancialField::FreeCashFlow,
        }
    }
}

impl std::fmt::Display for RatioName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roe => write!(f, "ROE"),
            Self::Roic => write!(f, "ROIC"),
            Self::Per => write!(f, "P/E"),
            Self::EvEbit => write!(f, "EV/EBIT"),
            Self::EvEbitda => write!(f, "EV/EBITDA"),
            Self::EvFcf => write!(f, "EV/FCF"),
        }
    }
}

impl FromStr for RatioName {
    type Err = ValuationError;

    /// Accepts `roe`, `EV_EBIT`, `ev/ebit`, `ev-ebit`, `pe`, `p/e`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '/' | '-' | ' '))
            .flat_map(|c| c.to_lowercase())
            .collect();
        match normalized.as_str() {
            "roe" => Ok(Self::Roe),
            "roic" => Ok(Self::Roic),
            "per" | "pe" => Ok(Self::Per),
            "evebit" => Ok(Self::EvEbit),
            "evebitda" => Ok(Self::EvEbitda),
            "evfcf" => Ok(Self::EvFcf),
            _ => Err(ValuationError::InvalidInput {
                field: "ratio".into(),
                reason: format!(
                    "unknown ratio '{s}'; expected one of ROE, ROIC, PER, EV_EBIT, EV_EBITDA, EV_FCF"
                ),
            }),
        }
    }
}

/// Per-ratio results of one engine invocation.
///
/// Holds exactly one entry for every requested ratio, computed or not. Built
/// only by the engine; callers read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioReport {
    entries: BTreeMap<RatioName, RatioValue>,
}

impl RatioReport {
    pub(crate) fn from_entries(entries: BTreeMap<RatioName, RatioValue>) -> Self {
        Self { entries }
    }

    /// `None` only when the ratio was not requested.
    pub fn get(&self, name: RatioName) -> Option<&RatioValue> {
        self.entries.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioName, &RatioValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn computed_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_computed()).count()
    }

    /// Ratios that came back undefined, with the reason kind.
    pub fn undefined(&self) -> Vec<(RatioName, UndefinedKind)> {
        self.entries
            .iter()
            .filter_map(|(name, v)| v.undefined_kind().map(|k| (*name, k)))
            .collect()
    }
}
