//! Source snapshot loaders
//!
//! Each source is a folder of three snapshot files: `books.yaml` (catalog),
//! `customers.csv` (roster), `orders.jsonl` (order log). Loading is
//! restartable: re-reading the same files yields the same row sequence.
//!
//! Structurally malformed rows are skipped and counted, never fatal. A
//! missing or unreadable folder/file is `SourceUnavailable` and aborts the
//! run for that trigger.

use crate::types::{RawRow, Source};
use once_cell::sync::Lazy;
use regex::Regex;
use salesdash_common::{Error, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// One source's raw rows plus the count of rows dropped during the read
#[derive(Debug)]
pub struct LoadedSource {
    pub source: Source,
    pub books: Vec<RawRow>,
    pub customers: Vec<RawRow>,
    pub orders: Vec<RawRow>,
    pub skipped_rows: u64,
}

/// Ruby-style symbol keys (`:title:`) appear in some catalog exports;
/// rewrite them to plain keys before the YAML parse.
static SYMBOL_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\w+):").unwrap());

/// Load all three snapshot files for one source
pub fn load_source(data_root: &Path, source: Source) -> Result<LoadedSource> {
    let folder = data_root.join(source.as_str());
    if !folder.is_dir() {
        return Err(Error::source_unavailable(
            source.as_str(),
            format!("snapshot folder missing: {}", folder.display()),
        ));
    }

    let mut skipped = 0u64;
    let books = load_books(&folder.join("books.yaml"), source, &mut skipped)?;
    let customers = load_customers(&folder.join("customers.csv"), source, &mut skipped)?;
    let orders = load_orders(&folder.join("orders.jsonl"), source, &mut skipped)?;

    debug!(
        source = %source,
        books = books.len(),
        customers = customers.len(),
        orders = orders.len(),
        skipped,
        "Loaded source snapshots"
    );

    Ok(LoadedSource {
        source,
        books,
        customers,
        orders,
        skipped_rows: skipped,
    })
}

fn unavailable(source: Source, path: &Path, detail: impl std::fmt::Display) -> Error {
    Error::source_unavailable(source.as_str(), format!("{}: {}", path.display(), detail))
}

/// Parse the YAML book catalog into raw rows
fn load_books(path: &Path, source: Source, skipped: &mut u64) -> Result<Vec<RawRow>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| unavailable(source, path, e))?;
    let content = SYMBOL_KEY_RE.replace_all(&content, "$1:");

    let doc: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| unavailable(source, path, e))?;
    let seq = match doc {
        serde_yaml::Value::Sequence(seq) => seq,
        serde_yaml::Value::Null => Vec::new(),
        _ => {
            return Err(unavailable(source, path, "expected a sequence of book entries"));
        }
    };

    let mut rows = Vec::with_capacity(seq.len());
    for entry in seq {
        let serde_yaml::Value::Mapping(mapping) = entry else {
            *skipped += 1;
            warn!(source = %source, "Skipping non-mapping book entry");
            continue;
        };
        let mut row = RawRow::new(source);
        for (key, value) in &mapping {
            let Some(name) = key.as_str() else { continue };
            row.fields.push((name.to_string(), yaml_to_json(value)));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse the headered CSV customer roster into raw rows
fn load_customers(path: &Path, source: Source, skipped: &mut u64) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unavailable(source, path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| unavailable(source, path, e))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                if record.len() != headers.len() {
                    *skipped += 1;
                    warn!(
                        source = %source,
                        fields = record.len(),
                        expected = headers.len(),
                        "Skipping customer row with wrong field count"
                    );
                    continue;
                }
                let mut row = RawRow::new(source);
                for (name, value) in headers.iter().zip(record.iter()) {
                    row.fields
                        .push((name.to_string(), Value::String(value.to_string())));
                }
                rows.push(row);
            }
            Err(e) => {
                *skipped += 1;
                warn!(source = %source, error = %e, "Skipping malformed customer row");
            }
        }
    }
    Ok(rows)
}

/// Parse the JSON-lines order log into raw rows
fn load_orders(path: &Path, source: Source, skipped: &mut u64) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|e| unavailable(source, path, e))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| unavailable(source, path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Map<String, Value>>(trimmed) {
            Ok(object) => {
                let mut row = RawRow::new(source);
                for (key, value) in object {
                    row.fields.push((key, value));
                }
                rows.push(row);
            }
            Err(e) => {
                *skipped += 1;
                warn!(
                    source = %source,
                    line = index + 1,
                    error = %e,
                    "Skipping malformed order row"
                );
            }
        }
    }
    Ok(rows)
}

fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (key, value) in map {
                if let Some(name) = key.as_str() {
                    object.insert(name.to_string(), yaml_to_json(value));
                }
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
