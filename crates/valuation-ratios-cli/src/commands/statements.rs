use std::path::PathBuf;

use clap::Args;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use valuation_ratios_core::ingest::{PeriodSelection, PeriodSnapshot, SourceLayout};
use valuation_ratios_core::ratios::{self, RatioName, RatioValue};

use crate::input;

/// Arguments for dataset-directory analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Directory holding `{ticker}_{kind}.json` statement exports
    #[arg(long, default_value = "data/raw")]
    pub data_dir: PathBuf,

    /// Tickers to analyse, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// JSON or YAML file mapping dataset labels to snapshot fields
    #[arg(long)]
    pub layout: Option<String>,

    /// Reporting period: latest-complete, latest, or YYYY-MM-DD
    #[arg(long, default_value = "latest-complete")]
    pub period: PeriodSelection,

    /// Ratios to compute, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub ratios: Vec<RatioName>,
}

/// Arguments for per-period history
#[derive(Args)]
pub struct HistoryArgs {
    /// Directory holding `{ticker}_{kind}.json` statement exports
    #[arg(long, default_value = "data/raw")]
    pub data_dir: PathBuf,

    /// Ticker to analyse
    #[arg(long)]
    pub ticker: String,

    /// JSON or YAML file mapping dataset labels to snapshot fields
    #[arg(long)]
    pub layout: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let layout = input::dataset::load_layout(args.layout.as_deref())?;
    let selected = if args.ratios.is_empty() {
        RatioName::ALL.to_vec()
    } else {
        args.ratios
    };

    let tickers: Vec<String> = args
        .tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if tickers.is_empty() {
        return Err("--tickers must name at least one ticker".into());
    }

    let mut snapshots = Vec::new();
    let mut skipped = Vec::new();
    for ticker in &tickers {
        match snapshot_for(&args.data_dir, ticker, &layout, args.period) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                warn!(%ticker, error = %e, "skipping ticker");
                skipped.push(format!("{ticker}: {e}"));
            }
        }
    }

    if snapshots.is_empty() {
        return Err(format!("no usable data for {}", tickers.join(", ")).into());
    }
    info!(analysed = snapshots.len(), skipped = skipped.len(), "analysis complete");

    // A single ticker keeps the full envelope
    if tickers.len() == 1 {
        let snapshot = &snapshots[0];
        let output = ratios::analyze(&snapshot.financials, &selected)
            .for_subject(format!("{} {}", snapshot.ticker, snapshot.period));
        return Ok(serde_json::to_value(output)?);
    }

    let rows = snapshots
        .iter()
        .map(|s| summary_row(s, &selected, true))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({ "results": rows, "warnings": skipped }))
}

pub fn run_history(args: HistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let layout = input::dataset::load_layout(args.layout.as_deref())?;
    let ticker = args.ticker.trim().to_uppercase();
    let dataset = input::dataset::load_company(&args.data_dir, &ticker, &layout)?;

    let history = dataset.history(&layout);
    if history.is_empty() {
        return Err(format!("no reporting periods for {ticker}").into());
    }

    let rows = history
        .iter()
        .map(|s| summary_row(s, &[RatioName::Roe, RatioName::Roic], false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({ "results": rows }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn snapshot_for(
    dir: &std::path::Path,
    ticker: &str,
    layout: &SourceLayout,
    period: PeriodSelection,
) -> Result<PeriodSnapshot, Box<dyn std::error::Error>> {
    let dataset = input::dataset::load_company(dir, ticker, layout)?;
    Ok(dataset.snapshot(layout, period)?)
}

/// One flat row: ticker, period, optionally market cap and enterprise value,
/// then one column per ratio. Past periods carry no quote, so history rows
/// leave the market columns out.
fn summary_row(
    snapshot: &PeriodSnapshot,
    selected: &[RatioName],
    with_market_data: bool,
) -> Result<Value, serde_json::Error> {
    let financials = &snapshot.financials;
    let report = ratios::compute_selected(financials, selected);
    let mut row = Map::new();
    row.insert("ticker".into(), json!(snapshot.ticker));
    row.insert("period".into(), json!(snapshot.period.to_string()));
    if with_market_data {
        let enterprise_value = RatioValue::from(ratios::compute_enterprise_value(financials));
        row.insert("market_cap".into(), serde_json::to_value(financials.market_cap)?);
        row.insert("enterprise_value".into(), serde_json::to_value(enterprise_value)?);
    }
    for (name, value) in report.iter() {
        row.insert(name.key().into(), serde_json::to_value(value)?);
    }
    Ok(Value::Object(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::dataset::fixtures::write_company;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use valuation_ratios_core::ingest::DatasetKind;

    fn decimal(value: &Value) -> Decimal {
        Decimal::from_str(value.as_str().unwrap()).unwrap()
    }

    fn analyze_args(dir: &std::path::Path, tickers: &[&str]) -> AnalyzeArgs {
        AnalyzeArgs {
            data_dir: dir.to_path_buf(),
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            layout: None,
            period: PeriodSelection::LatestComplete,
            ratios: Vec::new(),
        }
    }

    #[test]
    fn test_analyze_skips_ticker_without_data() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &DatasetKind::ALL);

        let out = run_analyze(analyze_args(dir.path(), &["acme", "NODATA"])).unwrap();
        let rows = out["results"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ticker"], "ACME");
        assert_eq!(rows[0]["period"], "2024-12-31");

        let warnings = out["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].as_str().unwrap().starts_with("NODATA:"));
    }

    #[test]
    fn test_analyze_rows_carry_market_cap_and_enterprise_value() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &DatasetKind::ALL);
        write_company(dir.path(), "BETA", &DatasetKind::ALL);

        let out = run_analyze(analyze_args(dir.path(), &["ACME", "BETA"])).unwrap();
        let row = &out["results"][0];
        let columns: Vec<&str> = row.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(&columns[..4], &["ticker", "period", "market_cap", "enterprise_value"]);
        assert_eq!(row["market_cap"], "1000");
        // 1000 + 200 - 100
        assert_eq!(row["enterprise_value"]["status"], "computed");
        assert_eq!(decimal(&row["enterprise_value"]["value"]), Decimal::from(1100));
        assert_eq!(decimal(&row["EV_EBIT"]["value"]), Decimal::from(11));
    }

    #[test]
    fn test_analyze_fails_when_no_ticker_has_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_analyze(analyze_args(dir.path(), &["NONE1", "NONE2"])).unwrap_err();
        assert!(err.to_string().contains("no usable data"), "{err}");
    }

    #[test]
    fn test_single_ticker_keeps_envelope() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &DatasetKind::ALL);

        let out = run_analyze(analyze_args(dir.path(), &["ACME"])).unwrap();
        assert_eq!(out["subject"], "ACME 2024-12-31");
        assert_eq!(decimal(&out["result"]["enterprise_value"]["value"]), Decimal::from(1100));
        assert_eq!(out["result"]["computed"], 6);
    }

    #[test]
    fn test_history_rows_have_no_market_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &DatasetKind::ALL);

        let out = run_history(HistoryArgs {
            data_dir: dir.path().to_path_buf(),
            ticker: "acme".into(),
            layout: None,
        })
        .unwrap();
        let rows = out["results"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("market_cap").is_none());
        assert_eq!(decimal(&rows[0]["ROE"]["value"]), Decimal::new(2, 1));
    }
}
