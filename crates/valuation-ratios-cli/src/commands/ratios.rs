use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use valuation_ratios_core::ratios::{
    self, CompanyFinancials, FinancialField, RatioName, RatioValue,
};

use crate::input;

/// Snapshot fields, settable individually when no JSON input is given
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SnapshotArgs {
    /// Path to JSON snapshot file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net income
    #[arg(long)]
    pub net_income: Option<Decimal>,

    /// Stockholders' equity
    #[arg(long, alias = "equity")]
    pub stockholders_equity: Option<Decimal>,

    /// EBIT
    #[arg(long)]
    pub ebit: Option<Decimal>,

    /// EBITDA
    #[arg(long)]
    pub ebitda: Option<Decimal>,

    /// Income tax provision
    #[arg(long)]
    pub tax_provision: Option<Decimal>,

    /// Pretax income
    #[arg(long)]
    pub pretax_income: Option<Decimal>,

    /// Invested capital
    #[arg(long)]
    pub invested_capital: Option<Decimal>,

    /// Diluted EPS
    #[arg(long, alias = "eps")]
    pub diluted_eps: Option<Decimal>,

    /// Current share price
    #[arg(long, alias = "price")]
    pub current_price: Option<Decimal>,

    /// Market capitalisation
    #[arg(long)]
    pub market_cap: Option<Decimal>,

    /// Total debt
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// Cash and cash equivalents
    #[arg(long, alias = "cash")]
    pub cash_and_equivalents: Option<Decimal>,

    /// Free cash flow
    #[arg(long, alias = "fcf")]
    pub free_cash_flow: Option<Decimal>,
}

/// Arguments for ratio computation
#[derive(Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Ratios to compute, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub ratios: Vec<RatioName>,
}

pub fn run_compute(args: ComputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let financials = read_snapshot(args.snapshot)?;
    let selected = if args.ratios.is_empty() {
        RatioName::ALL.to_vec()
    } else {
        args.ratios
    };

    let result = ratios::analyze(&financials, &selected);
    Ok(serde_json::to_value(result)?)
}

pub fn run_enterprise_value(args: SnapshotArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let financials = read_snapshot(args)?;
    let ev = RatioValue::from(ratios::compute_enterprise_value(&financials));
    Ok(json!({ "enterprise_value": ev }))
}

pub fn run_tax_rate(args: SnapshotArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let financials = read_snapshot(args)?;
    let rate = RatioValue::from(ratios::compute_effective_tax_rate(&financials));
    Ok(json!({ "effective_tax_rate": rate }))
}

/// Snapshot from `--input`, the individual flags, or piped stdin, in that
/// order. Stdin is only read when no field flag is set. Fields not given stay
/// absent; an entirely empty snapshot is still valid.
fn read_snapshot(args: SnapshotArgs) -> Result<CompanyFinancials, Box<dyn std::error::Error>> {
    snapshot_from(args, input::stdin::read_stdin)
}

fn snapshot_from(
    args: SnapshotArgs,
    read_stdin: impl FnOnce() -> Result<Option<Value>, Box<dyn std::error::Error>>,
) -> Result<CompanyFinancials, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let path = input::file::resolve_path(path)?;
        return input::file::read_json(&path);
    }

    let flags = args.flag_snapshot();
    if !flags.is_empty() {
        return Ok(flags);
    }
    match read_stdin()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Ok(flags),
    }
}

impl SnapshotArgs {
    fn flag_snapshot(&self) -> CompanyFinancials {
        let mut financials = CompanyFinancials::default();
        for (field, value) in [
            (FinancialField::NetIncome, self.net_income),
            (FinancialField::StockholdersEquity, self.stockholders_equity),
            (FinancialField::Ebit, self.ebit),
            (FinancialField::Ebitda, self.ebitda),
            (FinancialField::TaxProvision, self.tax_provision),
            (FinancialField::PretaxIncome, self.pretax_income),
            (FinancialField::InvestedCapital, self.invested_capital),
            (FinancialField::DilutedEps, self.diluted_eps),
            (FinancialField::CurrentPrice, self.current_price),
            (FinancialField::MarketCap, self.market_cap),
            (FinancialField::TotalDebt, self.total_debt),
            (FinancialField::CashAndEquivalents, self.cash_and_equivalents),
            (FinancialField::FreeCashFlow, self.free_cash_flow),
        ] {
            financials.set(field, value);
        }
        financials
    }
}
