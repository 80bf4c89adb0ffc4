//! Historical fan table: one row per player, one column per capture date.
//!
//! The table file is read, updated in memory and rewritten as a whole on
//! every run. Writes go to a temporary file in the same directory that then
//! replaces the table, so an interrupted write leaves the old file intact.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::csv::{parse_rows, write_row};
use crate::ocr::NameFanPair;

pub const NAME_HEADER: &str = "Player Name";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns true for `YYYY-MM-DD` calendar dates.
///
/// Any other header (stray labels, old derived columns) is not a date column.
pub fn is_date_label(label: &str) -> bool {
    label.len() == 10 && NaiveDate::parse_from_str(label, DATE_FORMAT).is_ok()
}

/// Keeps the first occurrence of every player name, in capture order.
pub fn dedupe_first(pairs: &[NameFanPair]) -> Vec<NameFanPair> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .filter(|pair| seen.insert(pair.name.as_str()))
        .cloned()
        .collect()
}

/// What a merge changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub date: String,
    /// False when the date column already existed and was overwritten
    pub new_column: bool,
    pub added_players: usize,
    pub updated_players: usize,
    pub total_players: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalTable {
    /// Date columns in file order, new dates appended at the end
    dates: Vec<String>,
    /// Player name to one value per date column; "" means no capture that day
    rows: BTreeMap<String, Vec<String>>,
}

impl HistoricalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the table. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read table {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Builds a table from CSV text.
    ///
    /// Header cells after the first that are not dates are dropped together
    /// with their values. A repeated date keeps its first column; a repeated
    /// name keeps its last row.
    pub fn parse(text: &str) -> Self {
        let mut rows = parse_rows(text).into_iter();
        let Some(header) = rows.next() else {
            return Self::new();
        };

        // (source column, date label)
        let mut columns: Vec<(usize, String)> = Vec::new();
        for (index, label) in header.iter().enumerate().skip(1) {
            let label = label.trim();
            if is_date_label(label) && !columns.iter().any(|(_, d)| d == label) {
                columns.push((index, label.to_string()));
            }
        }

        let mut table = Self {
            dates: columns.iter().map(|(_, d)| d.clone()).collect(),
            rows: BTreeMap::new(),
        };

        for row in rows {
            let Some(name) = row.first().map(|n| n.trim()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let values = columns
                .iter()
                .map(|(index, _)| row.get(*index).map(|v| v.trim().to_string()).unwrap_or_default())
                .collect();
            // A repeated name replaces the earlier row.
            table.rows.insert(name.to_string(), values);
        }

        table
    }

    /// Writes the day's fan counts into the `date` column.
    ///
    /// Pairs are deduplicated first (earliest wins). An existing column for
    /// the date is overwritten in place, otherwise one is appended. Players
    /// missing from the snapshot keep their other values and get a blank for
    /// a new column.
    pub fn merge_snapshot(&mut self, date: &str, pairs: &[NameFanPair]) -> Result<MergeSummary> {
        if !is_date_label(date) {
            return Err(anyhow!("'{}' is not a YYYY-MM-DD date", date));
        }

        let (column, new_column) = match self.dates.iter().position(|d| d == date) {
            Some(index) => (index, false),
            None => {
                self.dates.push(date.to_string());
                (self.dates.len() - 1, true)
            }
        };
        let width = self.dates.len();
        for values in self.rows.values_mut() {
            values.resize(width, String::new());
        }

        let mut added_players = 0;
        let mut updated_players = 0;
        for pair in dedupe_first(pairs) {
            let values = self.rows.entry(pair.name).or_insert_with(|| {
                added_players += 1;
                vec![String::new(); width]
            });
            if !values[column].is_empty() && values[column] != pair.fans {
                updated_players += 1;
            }
            values[column] = pair.fans;
        }

        Ok(MergeSummary {
            date: date.to_string(),
            new_column,
            added_players,
            updated_players,
            total_players: self.rows.len(),
        })
    }

    /// Renders the table: header first, then players by name.
    pub fn to_csv_string(&self) -> String {
        let mut buf: Vec<u8> = Vec::new();

        let mut header = Vec::with_capacity(self.dates.len() + 1);
        header.push(NAME_HEADER.to_string());
        header.extend(self.dates.iter().cloned());
        // Writing into a Vec cannot fail
        let _ = write_row(&mut buf, &header);

        for (name, values) in &self.rows {
            let mut row = Vec::with_capacity(self.dates.len() + 1);
            row.push(name.clone());
            row.extend(values.iter().cloned());
            row.resize(self.dates.len() + 1, String::new());
            let _ = write_row(&mut buf, &row);
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Replaces the table file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).context("Failed to create table directory")?;

        let mut temp = NamedTempFile::new_in(dir).context("Failed to create temporary table file")?;
        temp.write_all(self.to_csv_string().as_bytes())
            .context("Failed to write table")?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to replace {}: {}", path.display(), e.error))?;
        Ok(())
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Values of one player, aligned with `dates()`.
    pub fn row(&self, name: &str) -> Option<&[String]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    /// Recorded value, `None` when the player or date is unknown or blank.
    pub fn value(&self, name: &str, date: &str) -> Option<&str> {
        let column = self.dates.iter().position(|d| d == date)?;
        self.rows
            .get(name)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loads the table, merges the run's pairs under `date`, and saves it.
pub fn update_history(path: &Path, date: &str, pairs: &[NameFanPair]) -> Result<MergeSummary> {
    let mut table = HistoricalTable::load(path)?;
    let summary = table.merge_snapshot(date, pairs)?;
    table.save(path)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pairs(items: &[(&str, &str)]) -> Vec<NameFanPair> {
        items
            .iter()
            .map(|(name, fans)| NameFanPair::new(*name, *fans))
            .collect()
    }

    #[test]
    fn test_date_labels() {
        assert!(is_date_label("2024-01-01"));
        assert!(is_date_label("2024-02-29"));
        assert!(!is_date_label("2023-02-29"));
        assert!(!is_date_label("2024-1-1"));
        assert!(!is_date_label("Gain 01-02"));
        assert!(!is_date_label("Player Name"));
        assert!(!is_date_label("2024-01-01 "));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let unique = dedupe_first(&pairs(&[
            ("Kevin", "500"),
            ("Mia", "300"),
            ("Kevin", "999"),
        ]));
        assert_eq!(unique, pairs(&[("Kevin", "500"), ("Mia", "300")]));
    }

    #[test]
    fn test_two_day_scenario() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clubTracker.csv");

        update_history(&path, "2024-01-01", &pairs(&[("Mia", "300"), ("Kevin", "500")])).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Player Name,2024-01-01\nKevin,500\nMia,300\n"
        );

        let summary = update_history(&path, "2024-01-02", &pairs(&[("Kevin", "650")])).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Player Name,2024-01-01,2024-01-02\nKevin,500,650\nMia,300,\n"
        );
        assert!(summary.new_column);
        assert_eq!(summary.added_players, 0);
        assert_eq!(summary.total_players, 2);
    }

    #[test]
    fn test_same_day_merge_overwrites() {
        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-01-01", &pairs(&[("Kevin", "500"), ("Mia", "300")]))
            .unwrap();
        let once = table.clone();

        let summary = table
            .merge_snapshot("2024-01-01", &pairs(&[("Kevin", "500"), ("Mia", "300")]))
            .unwrap();
        assert_eq!(table, once);
        assert!(!summary.new_column);
        assert_eq!(summary.updated_players, 0);

        table
            .merge_snapshot("2024-01-01", &pairs(&[("Kevin", "520")]))
            .unwrap();
        assert_eq!(table.dates(), ["2024-01-01"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value("Kevin", "2024-01-01"), Some("520"));
        assert_eq!(table.value("Mia", "2024-01-01"), Some("300"));
    }

    #[test]
    fn test_merge_uses_first_occurrence() {
        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-01-01", &pairs(&[("Kevin", "500"), ("Kevin", "9")]))
            .unwrap();
        assert_eq!(table.value("Kevin", "2024-01-01"), Some("500"));
    }

    #[test]
    fn test_merge_rejects_bad_date() {
        let mut table = HistoricalTable::new();
        assert!(table.merge_snapshot("01/02/2024", &pairs(&[("Kevin", "1")])).is_err());
        assert!(table.dates().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");

        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-03-01", &pairs(&[("Zoe", "1,234"), ("Ann", "10")]))
            .unwrap();
        table
            .merge_snapshot("2024-03-02", &pairs(&[("Ann", "25"), ("Bo", "7")]))
            .unwrap();
        table.save(&path).unwrap();

        let loaded = HistoricalTable::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.value("Zoe", "2024-03-01"), Some("1,234"));
        assert_eq!(loaded.value("Zoe", "2024-03-02"), None);
        assert_eq!(loaded.players().collect::<Vec<_>>(), vec!["Ann", "Bo", "Zoe"]);
    }

    #[test]
    fn test_fan_counts_are_quoted() {
        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-01-01", &pairs(&[("Kevin", "1,234")]))
            .unwrap();
        assert_eq!(
            table.to_csv_string(),
            "Player Name,2024-01-01\nKevin,\"1,234\"\n"
        );
    }

    #[test]
    fn test_non_date_columns_dropped_and_aligned() {
        let text = "Player Name,2024-01-01,Gain,2024-01-02\n\
                    Kevin,500,+150,650\n\
                    Mia,300\n";
        let table = HistoricalTable::parse(text);

        assert_eq!(table.dates(), ["2024-01-01", "2024-01-02"]);
        assert_eq!(table.row("Kevin"), Some(&["500".to_string(), "650".to_string()][..]));
        assert_eq!(table.row("Mia"), Some(&["300".to_string(), String::new()][..]));
        assert_eq!(
            table.to_csv_string(),
            "Player Name,2024-01-01,2024-01-02\nKevin,500,650\nMia,300,\n"
        );
    }

    #[test]
    fn test_repeated_name_keeps_last_row() {
        let text = "Player Name,2024-01-01,2024-01-02\r\n\
                    Kevin,500,650\r\n\
                    Mia,300,310\r\n\
                    Kevin,510,660\r\n";
        let table = HistoricalTable::parse(text);

        assert_eq!(table.len(), 2);
        assert_eq!(table.row("Kevin"), Some(&["510".to_string(), "660".to_string()][..]));
        assert_eq!(
            table.to_csv_string(),
            "Player Name,2024-01-01,2024-01-02\nKevin,510,660\nMia,300,310\n"
        );
    }

    #[test]
    fn test_new_column_pads_short_rows() {
        let mut table = HistoricalTable::parse("Player Name,2024-01-01,2024-01-02\nMia\n");
        table
            .merge_snapshot("2024-01-03", &pairs(&[("Kevin", "5")]))
            .unwrap();
        assert_eq!(table.row("Mia").map(|r| r.len()), Some(3));
        assert_eq!(table.row("Kevin"), Some(&[String::new(), String::new(), "5".to_string()][..]));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let table = HistoricalTable::load(&dir.path().join("absent.csv")).unwrap();
        assert!(table.is_empty());
        assert!(table.dates().is_empty());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clubTracker.csv");
        fs::write(&path, "garbage that is not a table").unwrap();

        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-05-05", &pairs(&[("Kevin", "1")]))
            .unwrap();
        table.save(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Player Name,2024-05-05\nKevin,1\n"
        );
        // Only the table itself remains in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
