//! Source enumeration and source-local identifiers
//!
//! The three data sources deliver the same business entities under
//! incompatible layouts. Every record keeps its `SourceId` through
//! normalization and resolution so merged entities stay auditable back to
//! the raw snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three raw data origins.
///
/// The derived `Ord` doubles as the profile-selection priority:
/// `Data1 < Data2 < Data3`, lower wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "DATA1")]
    Data1,
    #[serde(rename = "DATA2")]
    Data2,
    #[serde(rename = "DATA3")]
    Data3,
}

impl Source {
    /// All sources, in priority order
    pub const ALL: [Source; 3] = [Source::Data1, Source::Data2, Source::Data3];

    /// Canonical tag, also the snapshot folder name under the data root
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Data1 => "DATA1",
            Source::Data2 => "DATA2",
            Source::Data3 => "DATA3",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DATA1" => Ok(Source::Data1),
            "DATA2" => Ok(Source::Data2),
            "DATA3" => Ok(Source::Data3),
            other => Err(format!("unknown source tag: {}", other)),
        }
    }
}

/// A source-local identifier: the originating source plus the record key
/// the source itself uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId {
    pub source: Source,
    pub key: String,
}

impl SourceId {
    pub fn new(source: Source, key: impl Into<String>) -> Self {
        Self {
            source,
            key: key.into(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ordering_matches_priority() {
        assert!(Source::Data1 < Source::Data2);
        assert!(Source::Data2 < Source::Data3);
    }

    #[test]
    fn source_round_trips_through_str() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
    }

    #[test]
    fn source_id_display() {
        let id = SourceId::new(Source::Data2, "cust-42");
        assert_eq!(id.to_string(), "DATA2/cust-42");
    }

    #[test]
    fn source_id_ordering_is_source_first() {
        let a = SourceId::new(Source::Data1, "z");
        let b = SourceId::new(Source::Data2, "a");
        assert!(a < b);
    }
}
