//! Result document persistence.

use crate::model::ResultDocument;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Timestamped default location for a run's results.
#[must_use]
pub fn default_output_path(results_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    results_dir.join(format!("flaky_results_{stamp}.json"))
}

/// Companion insights file for a results file: same directory, same
/// stem with an `_insights` suffix.
#[must_use]
pub fn insights_path(results_file: &Path) -> PathBuf {
    let stem = results_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    results_file.with_file_name(format!("{stem}_insights.json"))
}

/// Serialize the document as pretty JSON, creating parent directories
/// as needed.
pub fn write_document(document: &ResultDocument, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load a previously persisted document.
pub fn read_document(path: &Path) -> anyhow::Result<ResultDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse results document {}", path.display()))?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RunMetadata, SuiteSummary};
    use std::collections::BTreeMap;

    #[test]
    fn default_output_path_uses_timestamped_name() {
        let path = default_output_path(Path::new("results"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("flaky_results_"));
        assert!(name.ends_with(".json"));
        assert_eq!(path.parent(), Some(Path::new("results")));
    }

    #[test]
    fn insights_path_appends_suffix_to_stem() {
        let path = insights_path(Path::new("out/flaky_results_20240101_120000.json"));
        assert_eq!(
            path,
            Path::new("out/flaky_results_20240101_120000_insights.json")
        );
    }

    #[test]
    fn write_document_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("run.json");
        let document = ResultDocument {
            metadata: RunMetadata {
                timestamp: "2024-01-01T00:00:00Z".into(),
                iterations: 5,
                test_path: "tests/".into(),
                output_file: nested.display().to_string(),
            },
            tests: BTreeMap::new(),
            summary: SuiteSummary::default(),
        };

        write_document(&document, &nested).unwrap();
        let loaded = read_document(&nested).unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn read_document_reports_missing_file() {
        let err = read_document(Path::new("no/such/file.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
