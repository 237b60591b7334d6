//! Input-set fingerprinting
//!
//! SHA-256 over the sorted (relative path, size, mtime) of every snapshot
//! file under the three source folders. Any added, removed, grown, or
//! touched file changes the fingerprint and forces a fresh run; an
//! unchanged fingerprint lets a trigger reuse the stored snapshot.

use salesdash_common::{Error, Result, Source};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Fingerprint the current input source set
pub fn compute_fingerprint(data_root: &Path) -> Result<String> {
    let mut entries: Vec<String> = Vec::new();

    for source in Source::ALL {
        let folder = data_root.join(source.as_str());
        if !folder.is_dir() {
            return Err(Error::source_unavailable(
                source.as_str(),
                format!("snapshot folder missing: {}", folder.display()),
            ));
        }
        for entry in WalkDir::new(&folder).follow_links(false) {
            let entry =
                entry.map_err(|e| Error::source_unavailable(source.as_str(), e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|e| Error::source_unavailable(source.as_str(), e.to_string()))?;
            let modified = metadata
                .modified()
                .map_err(|e| Error::source_unavailable(source.as_str(), e.to_string()))?;
            let mtime = modified.duration_since(UNIX_EPOCH).unwrap_or_default();

            let relative = entry.path().strip_prefix(data_root).unwrap_or(entry.path());
            entries.push(format!(
                "{}|{}|{}.{:09}",
                relative.display(),
                metadata.len(),
                mtime.as_secs(),
                mtime.subsec_nanos()
            ));
        }
    }

    entries.sort();
    let mut hasher = Sha256::new();
    for line in &entries {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_sources(dir: &TempDir) {
        for source in Source::ALL {
            let folder = dir.path().join(source.as_str());
            fs::create_dir_all(&folder).unwrap();
            fs::write(folder.join("books.yaml"), "- id: 1\n").unwrap();
            fs::write(folder.join("customers.csv"), "id,name\n").unwrap();
            fs::write(folder.join("orders.jsonl"), "").unwrap();
        }
    }

    #[test]
    fn unchanged_tree_fingerprints_identically() {
        let dir = TempDir::new().unwrap();
        seed_sources(&dir);

        let first = compute_fingerprint(dir.path()).unwrap();
        let second = compute_fingerprint(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn added_file_changes_the_fingerprint() {
        let dir = TempDir::new().unwrap();
        seed_sources(&dir);

        let before = compute_fingerprint(dir.path()).unwrap();
        fs::write(
            dir.path().join("DATA2").join("extra.jsonl"),
            "{\"x\": 1}\n",
        )
        .unwrap();
        let after = compute_fingerprint(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn grown_file_changes_the_fingerprint() {
        let dir = TempDir::new().unwrap();
        seed_sources(&dir);

        let before = compute_fingerprint(dir.path()).unwrap();
        fs::write(
            dir.path().join("DATA1").join("orders.jsonl"),
            "{\"order_id\": \"o1\"}\n",
        )
        .unwrap();
        let after = compute_fingerprint(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn missing_source_folder_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        seed_sources(&dir);
        fs::remove_dir_all(dir.path().join("DATA3")).unwrap();

        let err = compute_fingerprint(dir.path()).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
