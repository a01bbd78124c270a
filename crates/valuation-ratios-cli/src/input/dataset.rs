use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use valuation_ratios_core::ingest::{CompanyDataset, DatasetKind, SourceLayout};

use super::file;

/// Load every dataset of one company from `dir`. Missing files leave the
/// corresponding dataset empty; unreadable or malformed files are errors.
pub fn load_company(
    dir: &Path,
    ticker: &str,
    layout: &SourceLayout,
) -> Result<CompanyDataset, Box<dyn std::error::Error>> {
    let mut dataset = CompanyDataset::new(ticker);
    let mut found = 0usize;

    for kind in DatasetKind::ALL {
        let path = dir.join(layout.file_name(ticker, kind));
        if !path.is_file() {
            warn!(ticker, dataset = %kind, path = %path.display(), "dataset file not found");
            continue;
        }
        let value: Value = file::read_json(&path)?;
        dataset
            .load(kind, &value)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        debug!(ticker, dataset = %kind, path = %path.display(), "loaded dataset");
        found += 1;
    }

    if found == 0 {
        return Err(format!("no datasets for {} in {}", ticker, dir.display()).into());
    }
    Ok(dataset)
}

/// Layout from `--layout`, or the default export layout.
pub fn load_layout(path: Option<&str>) -> Result<SourceLayout, Box<dyn std::error::Error>> {
    let layout = match path {
        Some(p) => file::read_config::<SourceLayout>(p)?,
        None => SourceLayout::default(),
    };
    layout.validate()?;
    Ok(layout)
}


#[cfg(test)]
mod tests {
    use super::fixtures::write_company;
    use super::*;

    #[test]
    fn test_all_files_loaded() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &DatasetKind::ALL);

        let ds = load_company(dir.path(), "ACME", &SourceLayout::default()).unwrap();
        assert_eq!(ds.ticker, "ACME");
        assert_eq!(ds.cashflow.periods().count(), 1);
        assert!(ds.info.contains_key("marketCap"));
    }

    #[test]
    fn test_missing_file_leaves_dataset_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_company(
            dir.path(),
            "ACME",
            &[DatasetKind::Financials, DatasetKind::BalanceSheet, DatasetKind::Info],
        );

        let ds = load_company(dir.path(), "ACME", &SourceLayout::default()).unwrap();
        assert_eq!(ds.cashflow.periods().count(), 0);
        assert_eq!(ds.financials.periods().count(), 1);
    }

    #[test]
    fn test_no_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "OTHER", &DatasetKind::ALL);

        let err = load_company(dir.path(), "ACME", &SourceLayout::default()).unwrap_err();
        assert!(err.to_string().contains("no datasets for ACME"), "{err}");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_company(dir.path(), "ACME", &[DatasetKind::Info]);
        std::fs::write(dir.path().join("ACME_financials.json"), "{ not json").unwrap();

        assert!(load_company(dir.path(), "ACME", &SourceLayout::default()).is_err());
    }

    #[test]
    fn test_yaml_layout_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("layout.yaml");
        std::fs::write(&good, "file_pattern: \"{kind}/{ticker}.json\"\n").unwrap();
        let layout = load_layout(good.to_str()).unwrap();
        assert_eq!(layout.file_name("ACME", DatasetKind::Info), "info/ACME.json");

        let bad = dir.path().join("bad.yml");
        std::fs::write(&bad, "file_pattern: data.json\n").unwrap();
        assert!(load_layout(bad.to_str()).is_err());
    }
}
