//! Configuration loading and resolution
//!
//! Resolution follows the product's priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SALESDASH_CONFIG` environment variable
//! 3. Platform config file (`<config dir>/salesdash/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! The per-source field layouts are enumerated configuration, not
//! auto-detection: each source names its own columns and the maps here
//! translate them to the canonical field names the normalizer consumes.

use crate::source::Source;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder containing the DATA1/DATA2/DATA3 snapshot folders
    pub data_root: PathBuf,
    /// SQLite database location for the reference metrics store
    pub database_path: PathBuf,
    /// Identity-resolution matching policy
    pub match_policy: MatchPolicy,
    /// Per-source `file field → canonical field` layouts
    pub field_maps: BTreeMap<Source, SourceFieldMap>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("DATAs"),
            database_path: default_database_path(),
            match_policy: MatchPolicy::default(),
            field_maps: default_field_maps(),
        }
    }
}

impl Config {
    /// Resolve configuration following the priority order above
    pub fn resolve(cli_path: Option<&Path>) -> Result<Config> {
        // Priority 1: explicit command-line path (must exist)
        if let Some(path) = cli_path {
            return Self::load_file(path);
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var("SALESDASH_CONFIG") {
            return Self::load_file(Path::new(&path));
        }

        // Priority 3: platform config file
        if let Some(dir) = dirs::config_dir() {
            let path = dir.join("salesdash").join("config.toml");
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        // Priority 4: compiled defaults
        Ok(Config::default())
    }

    /// Load and parse a TOML config file
    pub fn load_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed: {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed: {}: {}", path.display(), e)))
    }

    /// Field layout for a source, falling back to the compiled default
    /// when a partial config file omits it
    pub fn layout(&self, source: Source) -> SourceFieldMap {
        self.field_maps
            .get(&source)
            .cloned()
            .unwrap_or_else(|| default_layout(source))
    }
}

/// Identity-resolution matching policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Ordered corroborating fields for the strong composite rule
    /// (name + corroborator). Deployments with unreliable address data can
    /// restrict this to `["phone"]`.
    pub corroborating_fields: Vec<CorroboratingField>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            corroborating_fields: vec![CorroboratingField::Address, CorroboratingField::Phone],
        }
    }
}

/// A field that can corroborate a same-name customer match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorroboratingField {
    Address,
    Phone,
}

/// One source's `file field → canonical field` maps, per snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFieldMap {
    pub books: HashMap<String, String>,
    pub customers: HashMap<String, String>,
    pub orders: HashMap<String, String>,
}

impl SourceFieldMap {
    /// File-level field name that maps to `canonical` in the books layout
    pub fn book_field(&self, canonical: &str) -> Option<&str> {
        reverse_lookup(&self.books, canonical)
    }

    /// File-level field name that maps to `canonical` in the customers layout
    pub fn customer_field(&self, canonical: &str) -> Option<&str> {
        reverse_lookup(&self.customers, canonical)
    }

    /// File-level field name that maps to `canonical` in the orders layout
    pub fn order_field(&self, canonical: &str) -> Option<&str> {
        reverse_lookup(&self.orders, canonical)
    }
}

fn reverse_lookup<'a>(map: &'a HashMap<String, String>, canonical: &str) -> Option<&'a str> {
    map.iter()
        .find(|(_, v)| v.as_str() == canonical)
        .map(|(k, _)| k.as_str())
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("salesdash").join("salesdash.db"))
        .unwrap_or_else(|| PathBuf::from("salesdash.db"))
}

fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Compiled field layout for one of the three known sources
pub fn default_layout(source: Source) -> SourceFieldMap {
    match source {
        Source::Data1 => SourceFieldMap {
            books: pairs(&[
                ("id", "id"),
                ("title", "title"),
                ("author", "author"),
                ("genre", "genre"),
                ("publisher", "publisher"),
                ("year", "year"),
            ]),
            customers: pairs(&[
                ("id", "id"),
                ("name", "name"),
                ("address", "address"),
                ("phone", "phone"),
                ("email", "email"),
            ]),
            orders: pairs(&[
                ("order_id", "id"),
                ("user_id", "customer"),
                ("book_id", "book"),
                ("quantity", "quantity"),
                ("unit_price", "unit_price"),
                ("timestamp", "timestamp"),
            ]),
        },
        Source::Data2 => SourceFieldMap {
            books: pairs(&[
                ("book_id", "id"),
                ("book_title", "title"),
                ("authors", "author"),
                ("category", "genre"),
                ("publishing_house", "publisher"),
                ("published", "year"),
            ]),
            customers: pairs(&[
                ("customer_id", "id"),
                ("full_name", "name"),
                ("delivery_address", "address"),
                ("phone_number", "phone"),
                ("email_address", "email"),
            ]),
            orders: pairs(&[
                ("txn_id", "id"),
                ("customer_id", "customer"),
                ("item_id", "book"),
                ("qty", "quantity"),
                ("price", "unit_price"),
                ("ordered_at", "timestamp"),
            ]),
        },
        Source::Data3 => SourceFieldMap {
            books: pairs(&[
                ("bid", "id"),
                ("book_name", "title"),
                ("writer", "author"),
                ("genre", "genre"),
                ("publisher", "publisher"),
                ("yr", "year"),
            ]),
            customers: pairs(&[
                ("uid", "id"),
                ("customer", "name"),
                ("addr", "address"),
                ("tel", "phone"),
                ("mail", "email"),
            ]),
            // DATA3 orders carry no order id; the loader keys them by
            // line ordinal instead
            orders: pairs(&[
                ("uid", "customer"),
                ("bid", "book"),
                ("count", "quantity"),
                ("amount", "unit_price"),
                ("ts", "timestamp"),
            ]),
        },
    }
}

fn default_field_maps() -> BTreeMap<Source, SourceFieldMap> {
    Source::ALL
        .into_iter()
        .map(|source| (source, default_layout(source)))
        .collect()
}
