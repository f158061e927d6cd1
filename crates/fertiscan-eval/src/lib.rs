pub mod aggregate;
pub mod align;
pub mod compare;
pub mod corpus;
pub mod error;
pub mod leaf;
pub mod score;

pub use aggregate::{Aggregator, CorpusReport, FieldStats, RecordStats, ScoreScale, Threshold};
pub use align::{Alignable, Alignment, align, align_detailed};
pub use corpus::{LabelCase, RawLabelCase, score_corpus, score_corpus_leaves};
pub use error::ScoreError;
pub use leaf::{LeafResult, flatten_leaves, leaf_accuracy, leaf_record_score, levenshtein_percent};
pub use score::{FieldScore, RecordScore, score_field, score_inspection};
