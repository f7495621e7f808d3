//! Seller and order file loading.
//!
//! A record file is either a `.json` document holding an array of records or
//! a `.jsonl` file with one record per line. Orders may also be given as a
//! directory, in which case every record file beneath it is loaded.
//!
//! A JSONL line that cannot be decoded does not abort the load. It is
//! returned as an [`UnparsedLine`] so the caller can apply its malformed
//! record policy and report it.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use billing_core::error::{BillingError, Result};
use billing_core::models::{Order, Seller};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// A JSONL line that could not be decoded into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedLine {
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl UnparsedLine {
    pub fn to_error(&self) -> BillingError {
        BillingError::UnparsableRecord {
            path: self.path.clone(),
            line: self.line,
            message: self.message.clone(),
        }
    }
}

/// Records read from one or more files, plus the lines that failed to decode.
#[derive(Debug, Clone)]
pub struct LoadedRecords<T> {
    pub records: Vec<T>,
    pub unparsed: Vec<UnparsedLine>,
}

impl<T> LoadedRecords<T> {
    /// Records read, whether or not they decoded.
    pub fn total(&self) -> usize {
        self.records.len() + self.unparsed.len()
    }

    fn extend(&mut self, other: LoadedRecords<T>) {
        self.records.extend(other.records);
        self.unparsed.extend(other.unparsed);
    }
}

impl<T> Default for LoadedRecords<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            unparsed: Vec::new(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` and `.jsonl` files recursively under `dir`, sorted by path.
pub fn find_record_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_record_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load records of type `T` from a record file or a directory of them.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<LoadedRecords<T>> {
    if !path.is_dir() {
        return read_record_file(path);
    }

    let files = find_record_files(path);
    if files.is_empty() {
        warn!("No record files found in {}", path.display());
    }

    let mut loaded = LoadedRecords::default();
    for file in &files {
        loaded.extend(read_record_file::<T>(file)?);
    }

    debug!(
        "Loaded {} records ({} unparsed lines) from {} files under {}",
        loaded.records.len(),
        loaded.unparsed.len(),
        files.len(),
        path.display()
    );
    Ok(loaded)
}

/// Load sellers from `path`.
pub fn load_sellers(path: &Path) -> Result<LoadedRecords<Seller>> {
    load_records(path)
}

/// Load orders from `path` (file or directory).
pub fn load_orders(path: &Path) -> Result<LoadedRecords<Order>> {
    load_records(path)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "json" || ext == "jsonl")
        .unwrap_or(false)
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().map(|ext| ext == "jsonl").unwrap_or(false)
}

/// Read one record file. JSON arrays must parse as a whole; JSONL lines that
/// fail to parse are collected as [`UnparsedLine`]s.
fn read_record_file<T: DeserializeOwned>(path: &Path) -> Result<LoadedRecords<T>> {
    let file = std::fs::File::open(path).map_err(|source| BillingError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    if !is_jsonl(path) {
        let records: Vec<T> = serde_json::from_reader(reader)?;
        debug!("Read {} records from {}", records.len(), path.display());
        return Ok(LoadedRecords {
            records,
            unparsed: Vec::new(),
        });
    }

    let mut loaded = LoadedRecords::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| BillingError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!(
                    "Cannot parse line {} of {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                );
                loaded.unparsed.push(UnparsedLine {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Read {} records from {}",
        loaded.records.len(),
        path.display()
    );
    Ok(loaded)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SELLERS_JSON: &str = r#"[
        {"id": "s1", "name": "Acme", "ratePerCubicMeter": 1.0,
         "rateUnderThree": 2.0, "rateOverThree": 3.0, "minimumOrderCount": 5},
        {"id": "s2", "name": "Globex", "ratePerCubicMeter": 0.5,
         "rateUnderThree": 1.0, "rateOverThree": 4.0, "minimumOrderCount": 0}
    ]"#;

    fn order_line(id: &str, seller: &str, month: &str) -> String {
        format!(
            r#"{{"id":"{id}","sellerId":"{seller}","month":"{month}","quantityUnderThree":1,"quantityOverThree":2,"volume":0.5}}"#
        )
    }

    #[test]
    fn test_load_sellers_from_json_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sellers.json");
        fs::write(&path, SELLERS_JSON).unwrap();

        let sellers = load_sellers(&path).unwrap().records;
        assert_eq!(sellers.len(), 2);
        assert_eq!(sellers[0].id, "s1");
        assert_eq!(sellers[1].name, "Globex");
        assert_eq!(sellers[0].minimum_order_count, 5);
    }

    #[test]
    fn test_load_orders_from_jsonl_collects_bad_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("orders.jsonl");
        let content = format!(
            "{}\n\nnot json\n{}\n",
            order_line("o1", "s1", "2024-01"),
            order_line("o2", "s2", "2024-02")
        );
        fs::write(&path, content).unwrap();

        let loaded = load_orders(&path).unwrap();
        assert_eq!(loaded.total(), 3);
        let orders = &loaded.records;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, "o1");
        assert_eq!(orders[1].seller_id, "s2");
        assert_eq!(orders[1].quantity_over_three, 2);

        assert_eq!(loaded.unparsed.len(), 1);
        assert_eq!(loaded.unparsed[0].line, 3);
        assert_eq!(loaded.unparsed[0].path, path);
    }

    #[test]
    fn test_fractional_quantity_line_is_unparsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("orders.jsonl");
        let bad = r#"{"id":"o2","sellerId":"s1","month":"2024-01","quantityUnderThree":1.5,"quantityOverThree":0,"volume":0.0}"#;
        fs::write(&path, format!("{}\n{bad}\n", order_line("o1", "s1", "2024-01"))).unwrap();

        let loaded = load_orders(&path).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.unparsed.len(), 1);

        let err = loaded.unparsed[0].to_error();
        assert!(matches!(err, BillingError::UnparsableRecord { line: 2, .. }));
        assert!(err.to_string().contains("orders.jsonl:2"));
    }

    #[test]
    fn test_jsonl_line_missing_field_is_unparsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("orders.jsonl");
        fs::write(
            &path,
            r#"{"id":"o1","sellerId":"s1","month":"2024-01","quantityUnderThree":1,"quantityOverThree":0}"#,
        )
        .unwrap();

        let loaded = load_orders(&path).unwrap();
        assert!(loaded.records.is_empty());
        assert!(loaded.unparsed[0].message.contains("volume"));
    }

    #[test]
    fn test_load_orders_from_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("2024");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            tmp.path().join("a.jsonl"),
            order_line("o1", "s1", "2024-01"),
        )
        .unwrap();
        fs::write(
            nested.join("b.json"),
            format!("[{}]", order_line("o2", "s1", "2024-02")),
        )
        .unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let orders = load_orders(tmp.path()).unwrap().records;
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o1"]);
    }

    #[test]
    fn test_find_record_files_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.json"), "[]").unwrap();
        fs::write(tmp.path().join("a.jsonl"), "").unwrap();
        fs::write(tmp.path().join("c.csv"), "").unwrap();

        let files = find_record_files(tmp.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jsonl", "b.json"]);
    }

    #[test]
    fn test_find_record_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(find_record_files(&tmp.path().join("absent")).is_empty());
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_sellers(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BillingError::FileRead { .. }));
    }

    #[test]
    fn test_invalid_json_array_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sellers.json");
        fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let err = load_sellers(&path).unwrap_err();
        assert!(matches!(err, BillingError::JsonParse(_)));
    }
}
