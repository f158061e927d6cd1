//! Scalar and entity comparators.
//!
//! Every comparator returns a score in `[0, 1]`. Two absent values are a
//! perfect match; one absent and one present never match.

use fertiscan_core::{
    GuaranteedAnalysis, NutrientValue, Organization, RegistrationNumber, Value, normalize_website,
};

use crate::align::align;

/// Shared absence rule: `Err(score)` when at least one side is absent.
fn absence<T>(expected: Option<T>, actual: Option<T>) -> Result<(T, T), f64> {
    match (expected, actual) {
        (Some(e), Some(a)) => Ok((e, a)),
        (None, None) => Err(1.0),
        _ => Err(0.0),
    }
}

fn indicator(matched: bool) -> f64 {
    if matched { 1.0 } else { 0.0 }
}

pub(crate) fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

// ── Scalars ──

/// Codes, identifiers and lot numbers: equal after trimming or nothing.
pub fn exact(expected: Option<&str>, actual: Option<&str>) -> f64 {
    match absence(expected, actual) {
        Ok((e, a)) => indicator(e.trim() == a.trim()),
        Err(score) => score,
    }
}

/// Names and addresses: normalized Levenshtein similarity after case folding
/// and punctuation stripping.
pub fn text(expected: Option<&str>, actual: Option<&str>) -> f64 {
    match absence(expected, actual) {
        Ok((e, a)) => strsim::normalized_levenshtein(&fold_text(e), &fold_text(a)),
        Err(score) => score,
    }
}

/// Lowercase, drop punctuation, collapse whitespace.
pub fn fold_text(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Numeric value and unit each count for half.
pub fn quantity(expected: Option<&Value>, actual: Option<&Value>) -> f64 {
    match absence(
        expected.filter(|v| v.is_populated()),
        actual.filter(|v| v.is_populated()),
    ) {
        Ok((e, a)) => {
            let value = indicator(numbers_equal(e.value, a.value));
            let unit = indicator(units_equal(e.unit.as_deref(), a.unit.as_deref()));
            (value + unit) / 2.0
        }
        Err(score) => score,
    }
}

fn numbers_equal(expected: Option<f64>, actual: Option<f64>) -> bool {
    match (expected, actual) {
        (Some(e), Some(a)) => (e - a).abs() < 1e-9,
        (None, None) => true,
        _ => false,
    }
}

fn units_equal(expected: Option<&str>, actual: Option<&str>) -> bool {
    match (expected, actual) {
        (Some(e), Some(a)) => e.trim().to_lowercase() == a.trim().to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}

/// Phone numbers are stored in E.164, so equality of the canonical form.
pub fn phone(expected: Option<&str>, actual: Option<&str>) -> f64 {
    exact(expected, actual)
}

/// Websites compare on their host form, ignoring scheme and `www.`.
pub fn website(expected: Option<&str>, actual: Option<&str>) -> f64 {
    let expected = expected.and_then(normalize_website);
    let actual = actual.and_then(normalize_website);
    exact(expected.as_deref(), actual.as_deref())
}

// ── Entities ──

pub fn organization(expected: &Organization, actual: &Organization) -> f64 {
    mean(&[
        text(expected.name.as_deref(), actual.name.as_deref()),
        text(expected.address.as_deref(), actual.address.as_deref()),
        website(expected.website.as_deref(), actual.website.as_deref()),
        phone(expected.phone_number.as_deref(), actual.phone_number.as_deref()),
    ])
}

/// Only the same nutrient earns credit; its value and unit are then compared
/// as a quantity. A different nutrient sharing a value scores 0.
pub fn nutrient(expected: &NutrientValue, actual: &NutrientValue) -> f64 {
    let same_nutrient = match (expected.nutrient.as_deref(), actual.nutrient.as_deref()) {
        (Some(e), Some(a)) => fold_text(e) == fold_text(a),
        (None, None) => true,
        _ => false,
    };
    if !same_nutrient {
        return 0.0;
    }
    quantity(Some(&expected.quantity()), Some(&actual.quantity()))
}

pub fn registration_number(expected: &RegistrationNumber, actual: &RegistrationNumber) -> f64 {
    mean(&[
        exact(expected.identifier.as_deref(), actual.identifier.as_deref()),
        exact(
            expected.kind.map(|k| k.as_str()),
            actual.kind.map(|k| k.as_str()),
        ),
    ])
}

/// Title similarity, agreement on `is_minimal`, and the aligned nutrient table.
pub fn guaranteed_analysis(
    expected: Option<&GuaranteedAnalysis>,
    actual: Option<&GuaranteedAnalysis>,
) -> f64 {
    match absence(
        expected.filter(|g| g.is_populated()),
        actual.filter(|g| g.is_populated()),
    ) {
        Ok((e, a)) => mean(&[
            text(e.title(), a.title()),
            indicator(e.is_minimal() == a.is_minimal()),
            align(e.nutrients(), a.nutrients(), nutrient),
        ]),
        Err(score) => score,
    }
}
