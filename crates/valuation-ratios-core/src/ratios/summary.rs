use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{compute_effective_tax_rate, compute_enterprise_value, compute_selected};
use super::financials::CompanyFinancials;
use super::outcome::RatioValue;
use super::report::{RatioName, RatioReport};
use crate::types::{with_metadata, ComputationOutput};

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Ratios of one snapshot together with the intermediates they were built on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub enterprise_value: RatioValue,
    pub effective_tax_rate: RatioValue,
    pub ratios: RatioReport,
    pub computed: usize,
    pub undefined: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the requested ratios and wrap them in the standard output envelope.
///
/// Warnings are informational only; no value in the report is altered.
pub fn analyze(
    financials: &CompanyFinancials,
    ratios: &[RatioName],
) -> ComputationOutput<ValuationSummary> {
    let start = Instant::now();

    let report = compute_selected(financials, ratios);
    let enterprise_value = RatioValue::from(compute_enterprise_value(financials));
    let effective_tax_rate = RatioValue::from(compute_effective_tax_rate(financials));

    let warnings = collect_warnings(financials, &enterprise_value, &effective_tax_rate, &report);

    let computed = report.computed_count();
    let summary = ValuationSummary {
        enterprise_value,
        effective_tax_rate,
        undefined: report.len() - computed,
        computed,
        ratios: report,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "enterprise_value": "market_cap + total_debt - cash_and_equivalents",
        "effective_tax_rate": "tax_provision / pretax_income",
        "roic": "ebit * (1 - effective_tax_rate) / invested_capital",
        "per_eps_basis": "diluted EPS as supplied",
        "missing_debt_or_cash": "never treated as zero",
    });

    with_metadata(
        "Point-in-time valuation ratios",
        &assumptions,
        warnings,
        elapsed,
        summary,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect_warnings(
    financials: &CompanyFinancials,
    enterprise_value: &RatioValue,
    effective_tax_rate: &RatioValue,
    report: &RatioReport,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if financials.diluted_eps.is_some_and(|eps| eps < Decimal::ZERO) {
        warnings.push("Diluted EPS is negative; P/E is not economically meaningful.".into());
    }
    if financials
        .stockholders_equity
        .is_some_and(|equity| equity < Decimal::ZERO)
    {
        warnings.push("Stockholders' equity is negative; ROE sign is inverted.".into());
    }
    if let Some(rate) = effective_tax_rate.value() {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            warnings.push(format!(
                "Effective tax rate {rate} is outside [0, 1]; ROIC may be distorted."
            ));
        }
    }
    if enterprise_value.value().is_some_and(|ev| ev <= Decimal::ZERO) {
        warnings.push("Enterprise value is non-positive; EV multiples may be meaningless.".into());
    }

    for (name, kind) in report.undefined() {
        warnings.push(format!("{name} undefined: {kind}."));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratios::financials::FinancialField;
    use rust_decimal_macros::dec;

    fn sample_financials() -> CompanyFinancials {
        CompanyFinancials::default()
            .with(FinancialField::NetIncome, dec!(100))
            .with(FinancialField::StockholdersEquity, dec!(500))
            .with(FinancialField::Ebit, dec!(300))
            .with(FinancialField::Ebitda, dec!(400))
            .with(FinancialField::TaxProvision, dec!(60))
            .with(FinancialField::PretaxIncome, dec!(240))
            .with(FinancialField::InvestedCapital, dec!(1000))
            .with(FinancialField::DilutedEps, dec!(5))
            .with(FinancialField::CurrentPrice, dec!(150))
            .with(FinancialField::MarketCap, dec!(1000))
            .with(FinancialField::TotalDebt, dec!(200))
            .with(FinancialField::CashAndEquivalents, dec!(100))
            .with(FinancialField::FreeCashFlow, dec!(220))
    }

    #[test]
    fn test_clean_snapshot_has_no_warnings() {
        let out = analyze(&sample_financials(), &RatioName::ALL);
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert_eq!(out.result.computed, 6);
        assert_eq!(out.result.undefined, 0);
        assert_eq!(out.result.enterprise_value.value(), Some(dec!(1100)));
        assert_eq!(out.result.effective_tax_rate.value(), Some(dec!(0.25)));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_negative_eps_warns_but_keeps_value() {
        let f = sample_financials().with(FinancialField::DilutedEps, dec!(-3));
        let out = analyze(&f, &RatioName::ALL);
        assert!(out.warnings.iter().any(|w| w.contains("EPS is negative")));
        assert_eq!(
            out.result.ratios.get(RatioName::Per).unwrap().value(),
            Some(dec!(-50))
        );
    }

    #[test]
    fn test_undefined_ratios_are_listed() {
        let out = analyze(&CompanyFinancials::default(), &RatioName::ALL);
        assert_eq!(out.result.undefined, 6);
        assert_eq!(
            out.warnings
                .iter()
                .filter(|w| w.contains("missing input"))
                .count(),
            6
        );
    }

    #[test]
    fn test_odd_tax_rate_warns() {
        let f = sample_financials()
            .with(FinancialField::TaxProvision, dec!(300))
            .with(FinancialField::PretaxIncome, dec!(200));
        let out = analyze(&f, &[RatioName::Roic]);
        assert!(out.warnings.iter().any(|w| w.contains("outside [0, 1]")));
        assert_eq!(out.result.ratios.len(), 1);
    }

    #[test]
    fn test_non_positive_enterprise_value_warns() {
        let f = sample_financials().with(FinancialField::CashAndEquivalents, dec!(5000));
        let out = analyze(&f, &RatioName::ALL);
        assert!(out.warnings.iter().any(|w| w.contains("non-positive")));
    }
}
