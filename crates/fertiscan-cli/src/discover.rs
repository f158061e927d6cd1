//! Test-case discovery under a labels directory.
//!
//! A test case is a `label_*` sub-directory holding both the expected and the
//! actual JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value as Json;
use tracing::warn;

const CASE_PREFIX: &str = "label_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFiles {
    /// Directory name, e.g. `label_003`.
    pub id: String,
    pub expected: PathBuf,
    pub actual: PathBuf,
}

/// Find every complete test case under `root`, sorted by directory name.
///
/// Incomplete directories are skipped with a warning; finding none at all is
/// an error.
pub fn find_cases(root: &Path, expected_name: &str, actual_name: &str) -> Result<Vec<CaseFiles>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("reading labels directory {root:?}"))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {root:?}"))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(CASE_PREFIX) && entry.path().is_dir() {
            dirs.push((name, entry.path()));
        }
    }
    dirs.sort();

    let mut cases = Vec::new();
    for (id, dir) in dirs {
        let expected = dir.join(expected_name);
        let actual = dir.join(actual_name);
        if !expected.is_file() {
            warn!(case = %id, file = expected_name, "skipping test case without expected output");
            continue;
        }
        if !actual.is_file() {
            warn!(case = %id, file = actual_name, "skipping test case without actual output");
            continue;
        }
        cases.push(CaseFiles {
            id,
            expected,
            actual,
        });
    }

    if cases.is_empty() {
        bail!("no complete test cases found in {root:?}");
    }
    Ok(cases)
}

pub fn read_json(path: &Path) -> Result<Json> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {path:?}"))
}
