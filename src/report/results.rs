//! Persisted per-fixture results
//!
//! `test_results.json` maps each fixture name (sorted) to a flat record, pretty-printed so it diffs well between
//! runs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::runner::ExecutionStatus;

use super::FixtureResult;

#[derive(Debug, Serialize)]
pub struct FixtureRecord<'a> {
    pub success: bool,
    pub status: ExecutionStatus,
    pub output: &'a str,
    pub error: Option<&'a str>,
    pub nix_valid: bool,
    pub nix_issues: Vec<String>,
    pub path: String,
}

impl<'a> FixtureRecord<'a> {
    pub fn from_result(result: &'a FixtureResult) -> Self {
        Self {
            success: result.execution.success(),
            status: result.execution.status,
            output: &result.execution.stdout,
            error: result.execution.error.as_deref(),
            nix_valid: result.validation.valid(),
            nix_issues: result.validation.messages(),
            path: result.path.display().to_string(),
        }
    }
}

pub fn results_document(results: &[FixtureResult]) -> BTreeMap<&str, FixtureRecord<'_>> {
    results.iter().map(|r| (r.name(), FixtureRecord::from_result(r))).collect()
}

/// Write the results document to `path`, replacing any previous file.
pub fn write_results(path: &Path, results: &[FixtureResult]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &results_document(results))?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactIssue, ValidationOutcome};
    use crate::runner::ExecutionOutcome;
    use std::path::PathBuf;

    fn timed_out(name: &str) -> FixtureResult {
        FixtureResult {
            path: PathBuf::from("/suite").join(name),
            execution: ExecutionOutcome {
                fixture: name.to_string(),
                status: ExecutionStatus::TimedOut,
                stdout: String::new(),
                error: Some("Generator timed out after 60 seconds".to_string()),
            },
            validation: ValidationOutcome {
                fixture: name.to_string(),
                artifact: None,
                issues: vec![ArtifactIssue::Missing {
                    descriptor: "default.nix".to_string(),
                }],
            },
        }
    }

    #[test]
    fn test_record_fields() {
        let result = timed_out("test_b");
        let value = serde_json::to_value(FixtureRecord::from_result(&result)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "status": "timed_out",
                "output": "",
                "error": "Generator timed out after 60 seconds",
                "nix_valid": false,
                "nix_issues": ["No default.nix generated (artifact missing)"],
                "path": "/suite/test_b",
            })
        );
    }

    #[test]
    fn test_document_is_keyed_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_results.json");
        write_results(&path, &[timed_out("test_z"), timed_out("test_a")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["test_a", "test_z"]);
        assert!(text.starts_with("{\n  \"test_a\": {"));
    }
}
