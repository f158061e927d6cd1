//! Greedy best-match alignment of unordered collections.
//!
//! Each expected element is paired with its best-scoring actual element. The
//! actual pool is not consumed, so one actual element may be the best match
//! for several expected ones. Surplus actual elements each add a zero to the
//! score list before averaging.

use fertiscan_core::{NutrientValue, Organization, RegistrationNumber, Value};

use crate::compare::mean;

/// Elements that can be told apart from an all-absent placeholder.
pub trait Alignable {
    /// At least one sub-field is known.
    fn is_populated(&self) -> bool;
}

impl Alignable for Organization {
    fn is_populated(&self) -> bool {
        Organization::is_populated(self)
    }
}

impl Alignable for NutrientValue {
    fn is_populated(&self) -> bool {
        NutrientValue::is_populated(self)
    }
}

impl Alignable for RegistrationNumber {
    fn is_populated(&self) -> bool {
        RegistrationNumber::is_populated(self)
    }
}

impl Alignable for Value {
    fn is_populated(&self) -> bool {
        Value::is_populated(self)
    }
}

impl Alignable for String {
    fn is_populated(&self) -> bool {
        !self.trim().is_empty()
    }
}

/// Per-element outcome of an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// For each populated expected element (in input order): the index of its
    /// best actual match in the original `actual` slice, and the match score.
    pub matches: Vec<(usize, usize, f64)>,
    /// Actual elements beyond the number of expected ones.
    pub surplus: usize,
    pub score: f64,
}

/// Score two unordered collections.
///
/// Both empty is a perfect 1.0 and exactly one empty is 0.0, after dropping
/// elements with no populated sub-field on both sides.
pub fn align<T: Alignable>(expected: &[T], actual: &[T], similarity: impl Fn(&T, &T) -> f64) -> f64 {
    align_detailed(expected, actual, similarity).score
}

/// Like [`align`], but keeps the chosen pairs.
pub fn align_detailed<T: Alignable>(
    expected: &[T],
    actual: &[T],
    similarity: impl Fn(&T, &T) -> f64,
) -> Alignment {
    let expected: Vec<(usize, &T)> = populated(expected);
    let actual: Vec<(usize, &T)> = populated(actual);

    if expected.is_empty() || actual.is_empty() {
        let score = if expected.is_empty() && actual.is_empty() { 1.0 } else { 0.0 };
        return Alignment {
            matches: Vec::new(),
            surplus: actual.len().saturating_sub(expected.len()),
            score,
        };
    }

    let mut matches = Vec::with_capacity(expected.len());
    for &(ei, e) in &expected {
        let mut best: Option<(usize, f64)> = None;
        for &(ai, a) in &actual {
            let sim = similarity(e, a);
            if best.is_none_or(|(_, b)| sim > b) {
                best = Some((ai, sim));
            }
        }
        if let Some((ai, sim)) = best {
            matches.push((ei, ai, sim));
        }
    }

    let surplus = actual.len().saturating_sub(expected.len());
    let mut scores: Vec<f64> = matches.iter().map(|&(_, _, s)| s).collect();
    scores.extend(std::iter::repeat_n(0.0, surplus));

    Alignment {
        matches,
        surplus,
        score: mean(&scores),
    }
}

fn populated<T: Alignable>(items: &[T]) -> Vec<(usize, &T)> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_populated())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare;

    fn org(name: &str) -> Organization {
        Organization {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn quantity(value: f64, unit: &str) -> Value {
        Value {
            value: Some(value),
            unit: Some(unit.into()),
        }
    }

    fn nutrient(name: &str, value: f64, unit: &str) -> NutrientValue {
        NutrientValue {
            nutrient: Some(name.into()),
            value: Some(value),
            unit: Some(unit.into()),
        }
    }

    fn ingredients() -> Vec<NutrientValue> {
        vec![
            nutrient("Protein", 10.0, "g"),
            nutrient("Carbohydrate", 20.0, "g"),
            nutrient("Fat", 5.0, "g"),
        ]
    }

    #[test]
    fn both_empty_is_perfect() {
        let none: Vec<Organization> = Vec::new();
        assert_eq!(align(&none, &none, compare::organization), 1.0);
    }

    #[test]
    fn one_empty_is_zero() {
        let none: Vec<Organization> = Vec::new();
        assert_eq!(align(&none, &[org("Acme")], compare::organization), 0.0);
        assert_eq!(align(&[org("Acme")], &none, compare::organization), 0.0);
    }

    #[test]
    fn unpopulated_elements_are_dropped() {
        let placeholder = vec![Organization::default()];
        assert_eq!(align(&placeholder, &placeholder, compare::organization), 1.0);
        assert_eq!(align(&placeholder, &[org("Acme")], compare::organization), 0.0);

        let detailed = align_detailed(
            &[Organization::default(), org("Acme")],
            &[org("Acme")],
            compare::organization,
        );
        assert_eq!(detailed.matches, vec![(1, 0, 1.0)]);
        assert_eq!(detailed.score, 1.0);
    }

    #[test]
    fn unit_mismatch_halves_weight_score() {
        let score = align(
            &[quantity(10.0, "kg")],
            &[quantity(10.0, "lb")],
            |e, a| compare::quantity(Some(e), Some(a)),
        );
        assert_eq!(score, 0.5);
    }

    #[test]
    fn surplus_actual_elements_are_penalised() {
        let detailed = align_detailed(
            &[org("Acme")],
            &[org("Acme"), org("Globex"), org("Initech")],
            compare::organization,
        );
        assert_eq!(detailed.surplus, 2);
        assert!((detailed.score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn greedy_reuses_actual_elements() {
        // Both expected organizations pick the single actual one.
        let detailed = align_detailed(
            &[org("Acme"), org("Acme Corp")],
            &[org("Acme")],
            compare::organization,
        );
        assert_eq!(detailed.matches.len(), 2);
        assert!(detailed.matches.iter().all(|&(_, ai, _)| ai == 0));
        assert_eq!(detailed.surplus, 0);
    }

    #[test]
    fn order_independent() {
        let expected = vec![org("Acme"), org("Globex"), org("Initech")];
        let actual = vec![org("Initech Ltd"), org("Acme"), org("Globe")];
        let base = align(&expected, &actual, compare::organization);

        let mut expected_rev = expected.clone();
        expected_rev.reverse();
        let mut actual_rot = actual.clone();
        actual_rot.rotate_left(1);

        assert!((align(&expected_rev, &actual, compare::organization) - base).abs() < 1e-12);
        assert!((align(&expected, &actual_rot, compare::organization) - base).abs() < 1e-12);
        assert!((align(&expected_rev, &actual_rot, compare::organization) - base).abs() < 1e-12);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let expected = vec!["Keep dry.".to_string(), "Wear gloves.".to_string()];
        let actual = vec!["keep dry".to_string(), "x".to_string(), "y".to_string()];
        let score = align(&expected, &actual, |e, a| compare::text(Some(e), Some(a)));
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn ingredients_exact_and_reordered() {
        assert_eq!(align(&ingredients(), &ingredients(), compare::nutrient), 1.0);

        let mut reordered = ingredients();
        reordered.reverse();
        assert_eq!(align(&ingredients(), &reordered, compare::nutrient), 1.0);
    }

    #[test]
    fn ingredients_partial_missing_extra() {
        let partial = vec![nutrient("Protein", 10.0, "g"), nutrient("Carbohydrate", 15.0, "g")];
        let score = align(&ingredients(), &partial, compare::nutrient);
        assert!((score - 0.5).abs() < 1e-12, "got {score}");

        let missing = vec![nutrient("Protein", 10.0, "g")];
        let score = align(&ingredients(), &missing, compare::nutrient);
        assert!((score - 1.0 / 3.0).abs() < 1e-12, "got {score}");

        let mut extra = ingredients();
        extra.push(nutrient("Fiber", 8.0, "g"));
        let score = align(&ingredients(), &extra, compare::nutrient);
        assert!((score - 0.75).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn ingredients_empty_sides() {
        let none: Vec<NutrientValue> = Vec::new();
        assert_eq!(align(&none, &none, compare::nutrient), 1.0);
        assert_eq!(align(&ingredients(), &none, compare::nutrient), 0.0);
        assert_eq!(align(&none, &ingredients(), compare::nutrient), 0.0);
    }

    #[test]
    fn ingredients_with_other_names_score_zero() {
        let other = vec![nutrient("Vitamin C", 10.0, "mg"), nutrient("Calcium", 20.0, "mg")];
        assert_eq!(align(&ingredients(), &other, compare::nutrient), 0.0);
    }
}
