use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::financials::FinancialField;

/// Why a ratio (or an intermediate such as enterprise value) has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedKind {
    /// A required snapshot attribute was absent.
    MissingInput,
    /// The denominator was exactly zero.
    DivisionByZero,
    /// An intermediate (enterprise value, effective tax rate) was itself undefined.
    DerivedValueUnavailable,
    /// The result does not fit in a 128-bit decimal.
    ArithmeticOverflow,
}

impl std::fmt::Display for UndefinedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingInput => "missing input",
            Self::DivisionByZero => "division by zero",
            Self::DerivedValueUnavailable => "derived value unavailable",
            Self::ArithmeticOverflow => "arithmetic overflow",
        };
        f.write_str(s)
    }
}

/// The undefined marker carried by a ratio that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct Undefined {
    pub kind: UndefinedKind,
    pub detail: String,
}

impl Undefined {
    pub fn missing(fields: &[FinancialField]) -> Self {
        let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
        Self {
            kind: UndefinedKind::MissingInput,
            detail: format!("absent: {}", names.join(", ")),
        }
    }

    pub fn division_by_zero(denominator: FinancialField) -> Self {
        Self {
            kind: UndefinedKind::DivisionByZero,
            detail: format!("{denominator} is zero"),
        }
    }

    /// Wrap the cause of an undefined intermediate.
    pub fn derived(quantity: &str, cause: &Undefined) -> Self {
        Self {
            kind: UndefinedKind::DerivedValueUnavailable,
            detail: format!("{quantity} undefined ({cause})"),
        }
    }

    pub fn overflow(context: &str) -> Self {
        Self {
            kind: UndefinedKind::ArithmeticOverflow,
            detail: format!("{context} exceeds decimal range"),
        }
    }
}

/// Result of a single ratio computation.
pub type Outcome = Result<Decimal, Undefined>;

/// Serialisable form of an [`Outcome`], one entry of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatioValue {
    Computed { value: Decimal },
    Undefined { kind: UndefinedKind, detail: String },
}

impl RatioValue {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Computed { value } => Some(*value),
            Self::Undefined { .. } => None,
        }
    }

    pub fn undefined_kind(&self) -> Option<UndefinedKind> {
        match self {
            Self::Computed { .. } => None,
            Self::Undefined { kind, .. } => Some(*kind),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }
}

impl From<Outcome> for RatioValue {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Ok(value) => Self::Computed { value },
            Err(Undefined { kind, detail }) => Self::Undefined { kind, detail },
        }
    }
}

impl From<RatioValue> for Outcome {
    fn from(value: RatioValue) -> Self {
        match value {
            RatioValue::Computed { value } => Ok(value),
            RatioValue::Undefined { kind, detail } => Err(Undefined { kind, detail }),
        }
    }
}

impl std::fmt::Display for RatioValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Computed { value } => write!(f, "{value}"),
            Self::Undefined { kind, .. } => write!(f, "undefined ({kind})"),
        }
    }
}
