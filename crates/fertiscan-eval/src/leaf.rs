//! Leaf-level accuracy on raw JSON documents.
//!
//! Both documents are flattened to `a.b` / `a[0].c` paths and every expected
//! leaf is compared as text, on a 0–100 scale.

use serde::Serialize;
use serde_json::Value as Json;

use crate::aggregate::Threshold;
use crate::score::{FieldScore, RecordScore};

/// Every scalar leaf of `value` with its dotted path. Object members come out
/// in key order and array items in index order.
///
/// Empty objects and arrays have no leaves.
pub fn flatten_leaves(value: &Json) -> Vec<(String, Json)> {
    let mut leaves = Vec::new();
    collect(value, String::new(), &mut leaves);
    leaves
}

fn collect(value: &Json, path: String, leaves: &mut Vec<(String, Json)>) {
    match value {
        Json::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect(child, child_path, leaves);
            }
        }
        Json::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, format!("{path}[{index}]"), leaves);
            }
        }
        scalar => leaves.push((path, scalar.clone())),
    }
}

/// Levenshtein similarity as a percentage; two empty strings are identical.
pub fn levenshtein_percent(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Text form of a leaf. Null reads as "None", so an unknown leaf never
/// matches an empty string.
fn leaf_text(value: &Json) -> String {
    match value {
        Json::Null => "None".to_string(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafResult {
    pub path: String,
    /// 0–100.
    pub score: f64,
    pub expected: Json,
    /// `None` when the path does not exist in the actual document.
    pub actual: Option<Json>,
    pub passed: bool,
}

/// Score every expected leaf against the leaf at the same path in `actual`.
pub fn leaf_accuracy(expected: &Json, actual: &Json, threshold: Threshold) -> Vec<LeafResult> {
    let actual_leaves = flatten_leaves(actual);

    flatten_leaves(expected)
        .into_iter()
        .map(|(path, expected)| {
            let actual = actual_leaves
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(_, v)| v.clone());
            let score = match &actual {
                Some(actual) => levenshtein_percent(&leaf_text(&expected), &leaf_text(actual)),
                None => 0.0,
            };
            LeafResult {
                passed: threshold.passes(score / 100.0),
                path,
                score,
                expected,
                actual,
            }
        })
        .collect()
}

/// Leaf results as a percent-scale record, one field per path.
pub fn leaf_record_score(results: &[LeafResult]) -> RecordScore {
    RecordScore {
        fields: results
            .iter()
            .map(|r| {
                let score = FieldScore {
                    score: r.score,
                    missing: r.actual.is_none(),
                };
                (r.path.clone(), score)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_paths() {
        let doc = json!({
            "npk": "10-5-20",
            "organizations": [{ "name": "Acme", "phone_number": null }],
            "weight": [{ "value": 10, "unit": "kg" }],
            "cautions_en": ["Keep dry", "Wear gloves"],
            "empty": []
        });
        let paths: Vec<String> = flatten_leaves(&doc).into_iter().map(|(p, _)| p).collect();
        assert!(paths.contains(&"npk".to_string()));
        assert!(paths.contains(&"organizations[0].name".to_string()));
        assert!(paths.contains(&"organizations[0].phone_number".to_string()));
        assert!(paths.contains(&"weight[0].value".to_string()));
        assert!(paths.contains(&"cautions_en[1]".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("empty")));
    }

    #[test]
    fn top_level_array_paths() {
        let leaves = flatten_leaves(&json!(["a", ["b"]]));
        assert_eq!(leaves[0].0, "[0]");
        assert_eq!(leaves[1].0, "[1][0]");
    }

    #[test]
    fn percent_similarity() {
        assert_eq!(levenshtein_percent("", ""), 100.0);
        assert_eq!(levenshtein_percent("abc", "abc"), 100.0);
        assert_eq!(levenshtein_percent("abc", ""), 0.0);
        assert!((levenshtein_percent("kitten", "sitting") - (1.0 - 3.0 / 7.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn scores_expected_leaves() {
        let expected = json!({ "npk": "10-5-20", "lot_number": "L1", "weight": [{ "value": 10 }] });
        let actual = json!({ "npk": "10-5-20", "weight": [{ "value": 10.5 }] });
        let results = leaf_accuracy(&expected, &actual, Threshold::default());
        assert_eq!(results.len(), 3);

        let npk = results.iter().find(|r| r.path == "npk").unwrap();
        assert_eq!(npk.score, 100.0);
        assert!(npk.passed);

        let lot = results.iter().find(|r| r.path == "lot_number").unwrap();
        assert_eq!(lot.score, 0.0);
        assert!(lot.actual.is_none());
        assert!(!lot.passed);

        let weight = results.iter().find(|r| r.path == "weight[0].value").unwrap();
        assert!((weight.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn null_leaves_match_each_other() {
        let results = leaf_accuracy(&json!({ "a": null }), &json!({ "a": null }), Threshold::default());
        assert_eq!(results[0].score, 100.0);
    }

    #[test]
    fn null_leaf_differs_from_empty_string() {
        let results = leaf_accuracy(&json!({ "a": null }), &json!({ "a": "" }), Threshold::default());
        assert_eq!(results[0].score, 0.0);
        assert!(!results[0].passed);

        let results = leaf_accuracy(&json!({ "a": "" }), &json!({ "a": null }), Threshold::default());
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn leaves_come_out_in_key_order() {
        let doc = json!({ "zeta": 1, "alpha": 2, "mid": [3, 4] });
        let paths: Vec<String> = flatten_leaves(&doc).into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["alpha", "mid[0]", "mid[1]", "zeta"]);
    }

    #[test]
    fn record_score_marks_missing_paths() {
        let results = leaf_accuracy(&json!({ "a": "x", "b": "y" }), &json!({ "a": "x" }), Threshold::default());
        let record = leaf_record_score(&results);
        assert_eq!(record.get("a").unwrap().score, 100.0);
        assert!(record.get("b").unwrap().missing);
    }
}
