pub mod engine;
pub mod financials;
pub mod outcome;
pub mod report;
pub mod summary;

pub use engine::{
    compute_all, compute_effective_tax_rate, compute_enterprise_value, compute_ev_ebit,
    compute_ev_ebitda, compute_ev_fcf, compute_per, compute_roe, compute_roic, compute_selected,
};
pub use financials::{CompanyFinancials, FinancialField};
pub use outcome::{Outcome, RatioValue, Undefined, UndefinedKind};
pub use report::{RatioName, RatioReport};
pub use summary::{analyze, ValuationSummary};
