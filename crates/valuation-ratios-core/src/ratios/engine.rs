//! Point-in-time valuation ratios.
//!
//! Every function is pure and total: any snapshot, including the empty one,
//! maps to either a value or an [`Undefined`] marker. Missing debt or cash is
//! never read as zero.
//!
//! When several causes apply to one ratio the first of these wins:
//! absent direct inputs, an undefined intermediate, a zero denominator.
//!
//! All arithmetic uses `rust_decimal::Decimal` with checked operations.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::financials::{CompanyFinancials, FinancialField};
use super::outcome::{Outcome, RatioValue, Undefined};
use super::report::{RatioName, RatioReport};
use crate::types::Money;

const ENTERPRISE_VALUE: &str = "enterprise value";
const EFFECTIVE_TAX_RATE: &str = "effective tax rate";

// ---------------------------------------------------------------------------
// Intermediates
// ---------------------------------------------------------------------------

/// Effective tax rate: `tax_provision / pretax_income`.
pub fn compute_effective_tax_rate(financials: &CompanyFinancials) -> Outcome {
    let [provision, pretax] = inputs(
        financials,
        [FinancialField::TaxProvision, FinancialField::PretaxIncome],
    )?;
    divide(provision, pretax, FinancialField::PretaxIncome)
}

/// Enterprise value: `market_cap + total_debt - cash_and_equivalents`.
pub fn compute_enterprise_value(financials: &CompanyFinancials) -> Outcome {
    let [market_cap, debt, cash] = inputs(
        financials,
        [
            FinancialField::MarketCap,
            FinancialField::TotalDebt,
            FinancialField::CashAndEquivalents,
        ],
    )?;
    market_cap
        .checked_add(debt)
        .and_then(|v| v.checked_sub(cash))
        .ok_or_else(|| Undefined::overflow(ENTERPRISE_VALUE))
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Return on equity: `net_income / stockholders_equity`.
pub fn compute_roe(financials: &CompanyFinancials) -> Outcome {
    let [net_income, equity] = inputs(
        financials,
        [FinancialField::NetIncome, FinancialField::StockholdersEquity],
    )?;
    divide(net_income, equity, FinancialField::StockholdersEquity)
}

/// Return on invested capital: `ebit * (1 - effective_tax_rate) / invested_capital`.
pub fn compute_roic(financials: &CompanyFinancials) -> Outcome {
    let [ebit, invested_capital] = inputs(
        financials,
        [FinancialField::Ebit, FinancialField::InvestedCapital],
    )?;
    let tax_rate = compute_effective_tax_rate(financials)
        .map_err(|cause| Undefined::derived(EFFECTIVE_TAX_RATE, &cause))?;
    if invested_capital.is_zero() {
        return Err(Undefined::division_by_zero(FinancialField::InvestedCapital));
    }

    let nopat = Decimal::ONE
        .checked_sub(tax_rate)
        .and_then(|retained| ebit.checked_mul(retained))
        .ok_or_else(|| Undefined::overflow("after-tax EBIT"))?;
    divide(nopat, invested_capital, FinancialField::InvestedCapital)
}

/// Price-to-earnings: `current_price / diluted_eps`.
///
/// A negative EPS gives a negative multiple; it is returned as computed.
pub fn compute_per(financials: &CompanyFinancials) -> Outcome {
    let [price, eps] = inputs(
        financials,
        [FinancialField::CurrentPrice, FinancialField::DilutedEps],
    )?;
    divide(price, eps, FinancialField::DilutedEps)
}

pub fn compute_ev_ebit(financials: &CompanyFinancials) -> Outcome {
    ev_multiple(
        &compute_enterprise_value(financials),
        financials,
        FinancialField::Ebit,
    )
}

pub fn compute_ev_ebitda(financials: &CompanyFinancials) -> Outcome {
    ev_multiple(
        &compute_enterprise_value(financials),
        financials,
        FinancialField::Ebitda,
    )
}

pub fn compute_ev_fcf(financials: &CompanyFinancials) -> Outcome {
    ev_multiple(
        &compute_enterprise_value(financials),
        financials,
        FinancialField::FreeCashFlow,
    )
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Compute all six ratios. Never fails as a whole.
pub fn compute_all(financials: &CompanyFinancials) -> RatioReport {
    compute_selected(financials, &RatioName::ALL)
}

/// Compute the requested ratios, one entry per distinct name.
///
/// Enterprise value is evaluated once per call and shared by the EV multiples.
pub fn compute_selected(financials: &CompanyFinancials, ratios: &[RatioName]) -> RatioReport {
    let mut enterprise_value: Option<Outcome> = None;
    let mut entries = BTreeMap::new();

    for &name in ratios {
        if entries.contains_key(&name) {
            continue;
        }
        let outcome = match name {
            RatioName::Roe => compute_roe(financials),
            RatioName::Roic => compute_roic(financials),
            RatioName::Per => compute_per(financials),
            RatioName::EvEbit | RatioName::EvEbitda | RatioName::EvFcf => {
                let ev = enterprise_value
                    .get_or_insert_with(|| compute_enterprise_value(financials));
                ev_multiple(ev, financials, name.denominator())
            }
        };
        entries.insert(name, RatioValue::from(outcome));
    }
    RatioReport::from_entries(entries)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Fetch every listed attribute, or report all of the absent ones at once.
fn inputs<const N: usize>(
    financials: &CompanyFinancials,
    fields: [FinancialField; N],
) -> Result<[Money; N], Undefined> {
    let mut values = [Decimal::ZERO; N];
    let mut missing = Vec::new();
    for (slot, field) in values.iter_mut().zip(fields) {
        match financials.get(field) {
            Some(v) => *slot = v,
            None => missing.push(field),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(Undefined::missing(&missing))
    }
}

fn divide(numerator: Decimal, denominator: Decimal, field: FinancialField) -> Outcome {
    if denominator.is_zero() {
        return Err(Undefined::division_by_zero(field));
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| Undefined::overflow(&format!("division by {field}")))
}

fn ev_multiple(
    enterprise_value: &Outcome,
    financials: &CompanyFinancials,
    denominator: FinancialField,
) -> Outcome {
    let [den] = inputs(financials, [denominator])?;
    let ev = enterprise_value
        .as_ref()
        .map_err(|cause| Undefined::derived(ENTERPRISE_VALUE, cause))?;
    divide(*ev, den, denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
