mod discover;
mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use fertiscan_core::{Inspection, NormalizeOptions, normalize, parse_region};
use fertiscan_eval::{LabelCase, RawLabelCase, Threshold, score_corpus, score_corpus_leaves};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fertiscan")]
#[command(about = "Normalize fertilizer label inspections and score them against ground truth")]
#[command(version)]
struct Cli {
    /// Region for phone numbers written without a country code (ISO 3166 alpha-2)
    #[arg(long, global = true, env = "FERTISCAN_PHONE_REGION", default_value = "CA")]
    region: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized form of a raw inspection
    Normalize {
        /// Raw inspection JSON file
        file: PathBuf,
    },
    /// Score one inspection against its ground truth
    Score {
        /// Ground-truth inspection JSON file
        expected: PathBuf,
        /// Extracted inspection JSON file
        actual: PathBuf,
        /// Print the scores as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score every `label_*` test case under a directory
    Evaluate {
        /// Directory holding the `label_*` test cases
        dir: PathBuf,
        /// Compare raw documents leaf by leaf instead of field by field
        #[arg(long)]
        leaf: bool,
        /// Pass threshold, on a 0-1 or 0-100 scale
        #[arg(long, env = "FERTISCAN_PASS_THRESHOLD", default_value_t = 80.0)]
        threshold: f64,
        /// File name of the ground truth inside each test case
        #[arg(long, default_value = "expected_output.json")]
        expected_name: String,
        /// File name of the extracted output inside each test case
        #[arg(long, default_value = "actual_output.json")]
        actual_name: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = NormalizeOptions {
        region: parse_region(&cli.region)
            .ok_or_else(|| anyhow!("unknown phone region {:?}", cli.region))?,
        ..Default::default()
    };

    match cli.command {
        Commands::Normalize { file } => {
            let inspection = load_inspection(&file, &options)?;
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
        Commands::Score {
            expected,
            actual,
            json,
        } => {
            let expected = load_inspection(&expected, &options)?;
            let actual = load_inspection(&actual, &options)?;
            let record = fertiscan_eval::score_inspection(&expected, &actual)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                display::print_record_score(&record);
            }
        }
        Commands::Evaluate {
            dir,
            leaf,
            threshold,
            expected_name,
            actual_name,
            json,
        } => {
            let threshold = Threshold::new(threshold);
            let files = discover::find_cases(&dir, &expected_name, &actual_name)?;
            info!(cases = files.len(), leaf, "evaluating test cases");

            let aggregator = if leaf {
                let cases = files
                    .into_iter()
                    .map(|f| -> Result<RawLabelCase> {
                        Ok(RawLabelCase {
                            expected: discover::read_json(&f.expected)?,
                            actual: discover::read_json(&f.actual)?,
                            id: f.id,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                score_corpus_leaves(&cases, threshold)
            } else {
                let cases = files
                    .into_iter()
                    .map(|f| -> Result<LabelCase> {
                        Ok(LabelCase {
                            expected: load_inspection(&f.expected, &options)?,
                            actual: load_inspection(&f.actual, &options)?,
                            id: f.id,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                score_corpus(&cases, threshold)?
            };

            let report = aggregator.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report);
            }
        }
    }

    Ok(())
}

fn load_inspection(path: &Path, options: &NormalizeOptions) -> Result<Inspection> {
    let raw = discover::read_json(path)?;
    normalize(&raw, options).with_context(|| format!("normalizing {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn evaluate_defaults() {
        let cli = Cli::try_parse_from(["fertiscan", "evaluate", "labels"]).unwrap();
        match cli.command {
            Commands::Evaluate {
                dir,
                leaf,
                expected_name,
                actual_name,
                ..
            } => {
                assert_eq!(dir, PathBuf::from("labels"));
                assert!(!leaf);
                assert_eq!(expected_name, "expected_output.json");
                assert_eq!(actual_name, "actual_output.json");
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn load_inspection_uses_region() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("raw.json");
        std::fs::write(
            &path,
            r#"{"organizations": [{"name": "Acme", "phone_number": "020 7946 0958"}]}"#,
        )
        .unwrap();

        let options = NormalizeOptions {
            region: parse_region("GB").unwrap(),
            ..Default::default()
        };
        let inspection = load_inspection(&path, &options).unwrap();
        assert_eq!(
            inspection.organizations[0].phone_number.as_deref(),
            Some("+442079460958")
        );
    }
}
