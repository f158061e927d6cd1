//! Plain-text tables for record scores and corpus reports.

use fertiscan_eval::{CorpusReport, RecordScore, ScoreScale};

const MAX_RECORD_ROWS: usize = 50;

// ── Public API ──

/// Print one record's per-field scores and its overall score.
pub fn print_record_score(record: &RecordScore) {
    println!("{:<26} {:>8}  {}", "field", "score", "missing");
    for (name, field) in &record.fields {
        println!(
            "  {:<24} {:>8}  {}",
            name,
            format_score(Some(field.score), ScoreScale::Unit),
            if field.missing { "yes" } else { "" }
        );
    }
    println!();
    println!("  {:<24} {:>8}", "overall", format_score(Some(record.overall()), ScoreScale::Unit));
}

/// Print the field table, the record table and the corpus totals.
pub fn print_report(report: &CorpusReport) {
    print_field_table(report);
    print_record_table(report);
    print_totals(report);
}

// ── Sections ──

fn print_field_table(report: &CorpusReport) {
    println!("Fields");
    println!(
        "  {:<40} {:>8} {:>8} {:>8} {:>6}",
        "field", "mean", "pass", "missing", "count"
    );
    for field in &report.fields {
        println!(
            "  {:<40} {:>8} {:>8} {:>8} {:>6}",
            truncate(&field.name, 40),
            format_score(field.mean, report.scale),
            format_rate(field.pass_rate),
            format_rate(field.missing_rate),
            field.count
        );
    }
    println!();
}

fn print_record_table(report: &CorpusReport) {
    println!("Records");
    println!("  {:<26} {:>8} {:>8}", "record", "mean", "pass");
    for record in report.records.iter().take(MAX_RECORD_ROWS) {
        println!(
            "  {:<26} {:>8} {:>8}",
            record.id,
            format_score(record.mean, report.scale),
            format_rate(record.pass_rate)
        );
    }
    if report.records.len() > MAX_RECORD_ROWS {
        println!("  ... and {} more", report.records.len() - MAX_RECORD_ROWS);
    }
    println!();
}

fn print_totals(report: &CorpusReport) {
    println!("Totals");
    println!("  {:<26} {}", "records", report.record_count);
    println!(
        "  {:<26} {}",
        "threshold",
        format_score(Some(report.threshold), report.scale)
    );
    println!("  {:<26} {}", "overall mean", format_score(report.overall_mean, report.scale));
    println!("  {:<26} {}", "overall pass rate", format_rate(report.overall_pass_rate));
}

// ── Helpers ──

fn format_score(score: Option<f64>, scale: ScoreScale) -> String {
    match (score, scale) {
        (None, _) => "n/a".to_string(),
        (Some(s), ScoreScale::Unit) => format!("{s:.3}"),
        (Some(s), ScoreScale::Percent) => format!("{s:.1}"),
    }
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width - 3).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_follow_scale() {
        assert_eq!(format_score(Some(0.8), ScoreScale::Unit), "0.800");
        assert_eq!(format_score(Some(60.0), ScoreScale::Percent), "60.0");
        assert_eq!(format_score(None, ScoreScale::Unit), "n/a");
    }

    #[test]
    fn rates_are_percentages() {
        assert_eq!(format_rate(Some(2.0 / 3.0)), "66.7%");
        assert_eq!(format_rate(None), "n/a");
    }

    #[test]
    fn long_leaf_paths_are_truncated() {
        let path = "guaranteed_analysis_en.nutrients[12].nutrient.extra";
        let shown = truncate(path, 40);
        assert_eq!(shown.chars().count(), 40);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate("npk", 40), "npk");
    }
}
