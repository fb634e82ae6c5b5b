// src/storage/mod.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use crate::models::roster::{Market, RosterEntry};
use crate::utils::error::StorageError;

/// Roster CSV files live flat in one directory, one file per market and refresh date.
pub struct RosterStore {
    base_dir: PathBuf,
}

impl RosterStore {
    /// Creates a new RosterStore with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?; // Use map_err for cleaner conversion
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes `<prefix>_list.<YYYY-MM-DD>.csv`, replacing a file of the same day.
    pub fn save(&self, market: Market, date: NaiveDate, entries: &[RosterEntry]) -> Result<PathBuf, StorageError> {
        let filename = format!("{}_list.{}.csv", market.file_prefix(), date.format("%Y-%m-%d"));
        let file_path = self.base_dir.join(filename);

        // Header comes from RosterEntry's field order
        let mut writer = csv::Writer::from_path(&file_path)?;
        for entry in entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} {} companies to {}", entries.len(), market, file_path.display());

        Ok(file_path)
    }

    /// Reads every roster file of `market`, dropping duplicates across refreshes.
    /// Entries come back sorted by company name.
    pub fn load(&self, market: Market) -> Result<Vec<RosterEntry>, StorageError> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(market.file_prefix()) && name.ends_with(".csv"))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        let mut seen = HashSet::new();
        let mut corps = Vec::new();
        for path in files {
            tracing::info!("Load {} DB: {}", market, path.display());
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_path(&path)?;

            for (line, record) in reader.records().enumerate() {
                let record = record?;
                if record.len() < 4 {
                    tracing::warn!("Skipping short row {} in {}", line + 2, path.display());
                    continue;
                }
                let entry = RosterEntry {
                    corp_code: record[0].to_string(),
                    corp_name: record[1].to_string(),
                    stock_code: record[2].to_string(),
                    modify_date: record[3].to_string(),
                };
                if seen.insert(entry.clone()) {
                    corps.push(entry);
                }
            }
        }

        corps.sort_by(|a, b| {
            a.corp_name
                .cmp(&b.corp_name)
                .then_with(|| a.corp_code.cmp(&b.corp_code))
        });

        Ok(corps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(code: &str, name: &str, stock: &str, date: &str) -> RosterEntry {
        RosterEntry {
            corp_code: code.into(),
            corp_name: name.into(),
            stock_code: stock.into(),
            modify_date: date.into(),
        }
    }

    #[test]
    fn test_save_then_load_sorted_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let store = RosterStore::new(dir.path().join("db")).unwrap();

        let samsung = entry("00126380", "삼성전자", "005930", "20211119");
        let hanwha = entry("00162461", "한화솔루션", "009830", "20211201");
        let daejoo = entry("00177816", "대주전자재료", "078600", "20211001");

        let first = NaiveDate::from_ymd_opt(2021, 12, 12).unwrap();
        let second = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let path = store
            .save(Market::Kospi, first, &[samsung.clone(), hanwha.clone()])
            .unwrap();
        store
            .save(Market::Kospi, second, &[samsung.clone(), daejoo.clone()])
            .unwrap();
        store
            .save(Market::Kosdaq, second, &[entry("00000001", "가나다", "000001", "20220101")])
            .unwrap();

        assert!(path.ends_with("kospi_list.2021-12-12.csv"));
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("corp_code,corp_name,stock_code,modify_date"));

        let loaded = store.load(Market::Kospi).unwrap();
        assert_eq!(loaded, vec![daejoo, samsung, hanwha]);
    }

    #[test]
    fn test_load_skips_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("kospi_list.2021-12-12.csv"),
            "corp_code,corp_name,stock_code,modify_date\n00126380,삼성전자\n00162461, 한화솔루션 ,009830,20211201\n",
        )
        .unwrap();

        let store = RosterStore::new(dir.path()).unwrap();
        let loaded = store.load(Market::Kospi).unwrap();

        assert_eq!(loaded, vec![entry("00162461", "한화솔루션", "009830", "20211201")]);
    }

    #[test]
    fn test_empty_directory_gives_empty_roster() {
        let dir = tempfile::tempdir().unwrap();
        let store = RosterStore::new(dir.path()).unwrap();
        assert!(store.load(Market::Kospi).unwrap().is_empty());
    }
}
