//! Corpus-level accumulation of record scores.
//!
//! An [`Aggregator`] only ever appends. Parallel callers give each worker its
//! own aggregator and [`merge`](Aggregator::merge) them afterwards.

use serde::Serialize;

use crate::score::RecordScore;

const EPSILON: f64 = 1e-9;

/// How incoming scores are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScale {
    /// `[0, 1]`, as produced by the record scorer.
    #[default]
    Unit,
    /// `[0, 100]`, as produced by leaf accuracy.
    Percent,
}

impl ScoreScale {
    fn factor(self) -> f64 {
        match self {
            Self::Unit => 1.0,
            Self::Percent => 100.0,
        }
    }

    pub fn to_unit(self, score: f64) -> f64 {
        score / self.factor()
    }

    /// Inverse of [`to_unit`](Self::to_unit).
    pub fn express(self, score: f64) -> f64 {
        score * self.factor()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Percent => "percent",
        }
    }
}

/// Pass threshold, held on the unit scale.
///
/// Accepts either scale: anything above 1 is read as a percentage, so both
/// `80.0` and `0.8` mean the same threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(raw: f64) -> Self {
        let unit = if raw > 1.0 { raw / 100.0 } else { raw };
        Self(unit.clamp(0.0, 1.0))
    }

    pub fn unit(self) -> f64 {
        self.0
    }

    /// Does a unit-scale score reach the threshold?
    pub fn passes(self, unit_score: f64) -> bool {
        unit_score + EPSILON >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.8)
    }
}

#[derive(Debug, Clone)]
struct FieldHistory {
    name: String,
    scores: Vec<f64>,
    missing: Vec<bool>,
}

#[derive(Debug, Clone)]
struct RecordHistory {
    id: String,
    scores: Vec<f64>,
}

/// Append-only score history for a whole corpus.
#[derive(Debug, Clone)]
pub struct Aggregator {
    scale: ScoreScale,
    threshold: Threshold,
    fields: Vec<FieldHistory>,
    records: Vec<RecordHistory>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(ScoreScale::Unit, Threshold::default())
    }
}

impl Aggregator {
    pub fn new(scale: ScoreScale, threshold: Threshold) -> Self {
        Self {
            scale,
            threshold,
            fields: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn scale(&self) -> ScoreScale {
        self.scale
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Append one record's field scores, expressed in this aggregator's scale.
    pub fn record(&mut self, id: impl Into<String>, record: &RecordScore) {
        let mut scores = Vec::with_capacity(record.fields.len());
        for (name, field) in &record.fields {
            let history = self.field_mut(name);
            history.scores.push(field.score);
            history.missing.push(field.missing);
            scores.push(field.score);
        }
        self.records.push(RecordHistory {
            id: id.into(),
            scores,
        });
    }

    /// Append everything `other` has seen, converting its scale if needed.
    pub fn merge(&mut self, other: Aggregator) {
        let (from, to) = (other.scale, self.scale);
        let convert = move |score: f64| to.express(from.to_unit(score));

        for incoming in other.fields {
            let scores: Vec<f64> = incoming.scores.iter().map(|&s| convert(s)).collect();
            let history = self.field_mut(&incoming.name);
            history.scores.extend(scores);
            history.missing.extend(incoming.missing);
        }
        for record in other.records {
            let scores = record.scores.iter().map(|&s| convert(s)).collect();
            self.records.push(RecordHistory {
                id: record.id,
                scores,
            });
        }
    }

    fn field_mut(&mut self, name: &str) -> &mut FieldHistory {
        let index = match self.fields.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(FieldHistory {
                    name: name.to_string(),
                    scores: Vec::new(),
                    missing: Vec::new(),
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    fn pass_rate(&self, scores: &[f64]) -> Option<f64> {
        if scores.is_empty() {
            return None;
        }
        let passed = scores
            .iter()
            .filter(|&&s| self.threshold.passes(self.scale.to_unit(s)))
            .count();
        Some(passed as f64 / scores.len() as f64)
    }

    pub fn report(&self) -> CorpusReport {
        let fields = self
            .fields
            .iter()
            .map(|f| FieldStats {
                name: f.name.clone(),
                count: f.scores.len(),
                mean: mean(&f.scores),
                pass_rate: self.pass_rate(&f.scores),
                missing_rate: rate(&f.missing),
            })
            .collect();

        let mut records: Vec<RecordStats> = self
            .records
            .iter()
            .map(|r| RecordStats {
                id: r.id.clone(),
                count: r.scores.len(),
                mean: mean(&r.scores),
                pass_rate: self.pass_rate(&r.scores),
            })
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let all: Vec<f64> = self
            .records
            .iter()
            .flat_map(|r| r.scores.iter().copied())
            .collect();

        CorpusReport {
            scale: self.scale,
            threshold: self.scale.express(self.threshold.unit()),
            fields,
            records,
            overall_pass_rate: self.pass_rate(&all),
            overall_mean: mean(&all),
            record_count: self.records.len(),
        }
    }
}

fn mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

fn rate(flags: &[bool]) -> Option<f64> {
    if flags.is_empty() {
        return None;
    }
    Some(flags.iter().filter(|&&f| f).count() as f64 / flags.len() as f64)
}

// ── Report ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub pass_rate: Option<f64>,
    pub missing_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStats {
    pub id: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub pass_rate: Option<f64>,
}

/// Field table, record table and corpus totals. `None` means no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    pub scale: ScoreScale,
    /// In the report's scale.
    pub threshold: f64,
    pub fields: Vec<FieldStats>,
    /// Sorted by id.
    pub records: Vec<RecordStats>,
    pub overall_pass_rate: Option<f64>,
    pub overall_mean: Option<f64>,
    pub record_count: usize,
}

impl CorpusReport {
    pub fn field(&self, name: &str) -> Option<&FieldStats> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::FieldScore;

    fn record(fields: &[(&str, f64, bool)]) -> RecordScore {
        RecordScore {
            fields: fields
                .iter()
                .map(|&(name, score, missing)| (name.to_string(), FieldScore { score, missing }))
                .collect(),
        }
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn threshold_accepts_either_scale() {
        assert_eq!(Threshold::new(80.0), Threshold::new(0.8));
        assert!((Threshold::new(80.0).unit() - 0.8).abs() < 1e-12);
        assert_eq!(Threshold::default(), Threshold::new(0.8));
        assert!(Threshold::new(80.0).passes(0.8));
        assert!(!Threshold::new(80.0).passes(0.79));
    }

    #[test]
    fn percent_scale_npk() {
        let mut agg = Aggregator::new(ScoreScale::Percent, Threshold::new(80.0));
        agg.record("1", &record(&[("npk", 100.0, false)]));
        agg.record("2", &record(&[("npk", 0.0, true)]));
        agg.record("3", &record(&[("npk", 80.0, false)]));

        let report = agg.report();
        let npk = report.field("npk").unwrap();
        assert_eq!(npk.count, 3);
        assert!(close(npk.pass_rate, 2.0 / 3.0));
        assert!(close(npk.mean, 60.0));
        assert!(close(npk.missing_rate, 1.0 / 3.0));
        assert_eq!(report.record_count, 3);
        assert!((report.threshold - 80.0).abs() < 1e-9);
    }

    #[test]
    fn unit_scale_with_percentage_threshold() {
        let mut agg = Aggregator::new(ScoreScale::Unit, Threshold::new(80.0));
        agg.record("1", &record(&[("npk", 1.0, false)]));
        agg.record("2", &record(&[("npk", 0.0, false)]));
        agg.record("3", &record(&[("npk", 0.8, false)]));

        let npk = agg.report().field("npk").cloned().unwrap();
        assert!(close(npk.pass_rate, 2.0 / 3.0));
        assert!(close(npk.mean, 0.6));
    }

    #[test]
    fn empty_corpus_has_no_data() {
        let report = Aggregator::default().report();
        assert_eq!(report.record_count, 0);
        assert!(report.fields.is_empty());
        assert!(report.records.is_empty());
        assert_eq!(report.overall_mean, None);
        assert_eq!(report.overall_pass_rate, None);
    }

    #[test]
    fn record_without_fields_has_no_data() {
        let mut agg = Aggregator::default();
        agg.record("empty", &RecordScore::default());
        let report = agg.report();
        assert_eq!(report.record_count, 1);
        assert_eq!(report.records[0].mean, None);
        assert_eq!(report.records[0].pass_rate, None);
    }

    #[test]
    fn record_table() {
        let mut agg = Aggregator::default();
        agg.record("b", &record(&[("npk", 1.0, false), ("lot_number", 0.5, false)]));
        agg.record("a", &record(&[("npk", 0.9, false), ("lot_number", 0.9, false)]));

        let report = agg.report();
        assert_eq!(report.records[0].id, "a");
        assert!(close(report.records[0].pass_rate, 1.0));
        assert!(close(report.records[1].pass_rate, 0.5));
        assert!(close(report.records[1].mean, 0.75));
        assert!(close(report.overall_pass_rate, 0.75));
        assert!(close(report.overall_mean, 0.825));
    }

    #[test]
    fn merge_matches_sequential() {
        let records = [
            record(&[("npk", 1.0, false), ("weight", 0.5, false)]),
            record(&[("npk", 0.0, true), ("weight", 1.0, false)]),
            record(&[("npk", 0.8, false), ("weight", 0.2, true)]),
        ];

        let mut sequential = Aggregator::default();
        for (i, r) in records.iter().enumerate() {
            sequential.record(i.to_string(), r);
        }

        let mut left = Aggregator::default();
        left.record("0", &records[0]);
        let mut right = Aggregator::default();
        right.record("1", &records[1]);
        right.record("2", &records[2]);
        right.merge(left);

        let a = sequential.report();
        let b = right.report();
        assert_eq!(a.records, b.records);
        for field in &a.fields {
            let other = b.field(&field.name).unwrap();
            assert_eq!(field.count, other.count);
            assert!(close(other.mean, field.mean.unwrap()));
            assert_eq!(field.pass_rate, other.pass_rate);
            assert_eq!(field.missing_rate, other.missing_rate);
        }
    }

    #[test]
    fn merge_converts_scale() {
        let mut unit = Aggregator::new(ScoreScale::Unit, Threshold::default());
        let mut percent = Aggregator::new(ScoreScale::Percent, Threshold::default());
        percent.record("1", &record(&[("npk", 50.0, false)]));
        unit.merge(percent);
        assert!(close(unit.report().field("npk").unwrap().mean, 0.5));
    }
}
