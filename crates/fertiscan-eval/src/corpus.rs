//! Parallel scoring of a labelled corpus.
//!
//! Each rayon worker fills its own [`Aggregator`]; the partial aggregators
//! are merged at the end, so there is no shared lock on the hot path.

use fertiscan_core::Inspection;
use rayon::prelude::*;
use serde_json::Value as Json;
use tracing::info;

use crate::aggregate::{Aggregator, ScoreScale, Threshold};
use crate::error::ScoreError;
use crate::leaf::{leaf_accuracy, leaf_record_score};
use crate::score::score_inspection;

/// One test case: the ground truth and what the pipeline produced.
#[derive(Debug, Clone)]
pub struct LabelCase {
    pub id: String,
    pub expected: Inspection,
    pub actual: Inspection,
}

/// The same pair before normalization, for leaf-level accuracy.
#[derive(Debug, Clone)]
pub struct RawLabelCase {
    pub id: String,
    pub expected: Json,
    pub actual: Json,
}

/// Score every case with the record scorer (unit scale).
pub fn score_corpus(cases: &[LabelCase], threshold: Threshold) -> Result<Aggregator, ScoreError> {
    let aggregator = cases
        .par_iter()
        .try_fold(
            || Aggregator::new(ScoreScale::Unit, threshold),
            |mut agg, case| {
                let record = score_inspection(&case.expected, &case.actual)?;
                agg.record(case.id.clone(), &record);
                Ok::<_, ScoreError>(agg)
            },
        )
        .try_reduce(
            || Aggregator::new(ScoreScale::Unit, threshold),
            |mut left, right| {
                left.merge(right);
                Ok(left)
            },
        )?;

    info!(records = aggregator.record_count(), "scored corpus");
    Ok(aggregator)
}

/// Score every case leaf by leaf (percent scale).
pub fn score_corpus_leaves(cases: &[RawLabelCase], threshold: Threshold) -> Aggregator {
    let aggregator = cases
        .par_iter()
        .fold(
            || Aggregator::new(ScoreScale::Percent, threshold),
            |mut agg, case| {
                let results = leaf_accuracy(&case.expected, &case.actual, threshold);
                agg.record(case.id.clone(), &leaf_record_score(&results));
                agg
            },
        )
        .reduce(
            || Aggregator::new(ScoreScale::Percent, threshold),
            |mut left, right| {
                left.merge(right);
                left
            },
        );

    info!(records = aggregator.record_count(), "scored corpus leaves");
    aggregator
}
