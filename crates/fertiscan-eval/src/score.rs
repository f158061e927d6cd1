//! Record scoring: every field of an inspection is compared with the
//! comparator for its category, and a record's overall score is the mean.

use fertiscan_core::{FieldRef, Inspection};
use serde::Serialize;
use tracing::debug;

use crate::align::align;
use crate::compare::{self, mean};
use crate::error::ScoreError;

/// Score of one field in one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScore {
    pub score: f64,
    /// Expected had something and actual had nothing at all.
    pub missing: bool,
}

/// Per-field scores of one record, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordScore {
    pub fields: Vec<(String, FieldScore)>,
}

impl RecordScore {
    /// Unweighted mean over all field scores; 0.0 when nothing was scored.
    pub fn overall(&self) -> f64 {
        let scores: Vec<f64> = self.fields.iter().map(|(_, f)| f.score).collect();
        mean(&scores)
    }

    pub fn get(&self, field: &str) -> Option<FieldScore> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, score)| *score)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Compare one field, dispatching on its category.
///
/// Both sides must be of the same category; anything else is a caller error.
pub fn score_field(
    name: &str,
    expected: FieldRef<'_>,
    actual: FieldRef<'_>,
) -> Result<FieldScore, ScoreError> {
    let score = match (expected, actual) {
        (FieldRef::Text(e), FieldRef::Text(a)) => compare::text(e, a),
        (FieldRef::Code(e), FieldRef::Code(a)) => compare::exact(e, a),
        (FieldRef::Quantity(e), FieldRef::Quantity(a)) => compare::quantity(e, a),
        (FieldRef::Quantities(e), FieldRef::Quantities(a)) => {
            align(e, a, |x, y| compare::quantity(Some(x), Some(y)))
        }
        (FieldRef::Texts(e), FieldRef::Texts(a)) => {
            align(e, a, |x, y| compare::text(Some(x), Some(y)))
        }
        (FieldRef::Organizations(e), FieldRef::Organizations(a)) => {
            align(e, a, compare::organization)
        }
        (FieldRef::RegistrationNumbers(e), FieldRef::RegistrationNumbers(a)) => {
            align(e, a, compare::registration_number)
        }
        (FieldRef::Nutrients(e), FieldRef::Nutrients(a)) => align(e, a, compare::nutrient),
        (FieldRef::Analysis(e), FieldRef::Analysis(a)) => compare::guaranteed_analysis(e, a),
        (e, a) => {
            return Err(ScoreError::CategoryMismatch {
                field: name.to_string(),
                expected: e.kind(),
                actual: a.kind(),
            });
        }
    };

    Ok(FieldScore {
        score,
        missing: !expected.is_absent() && actual.is_absent(),
    })
}

/// Score every declared field of `actual` against `expected`.
pub fn score_inspection(
    expected: &Inspection,
    actual: &Inspection,
) -> Result<RecordScore, ScoreError> {
    let mut fields = Vec::new();
    for ((name, e), (_, a)) in expected.fields().into_iter().zip(actual.fields()) {
        let score = score_field(name, e, a)?;
        fields.push((name.to_string(), score));
    }

    let record = RecordScore { fields };
    debug!(
        fields = record.fields.len(),
        overall = record.overall(),
        "scored inspection"
    );
    Ok(record)
}
