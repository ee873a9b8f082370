//! Output formatting for CLI commands.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::args::{CandorArgs, OutputFormat};
use crate::error::Result;
use crate::ml::label::Label;
use crate::ml::metrics::EvaluationReport;
use crate::scoring::{ErrorResponse, ReviewVerdict};
use crate::trainer::TrainingReport;

/// Results that know how to describe themselves to a person.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

/// One line of `candor batch` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchLine {
    /// 1-based input line number.
    pub line: usize,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Verdict(ReviewVerdict),
    Error(ErrorResponse),
}

/// Summary of `candor batch`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub genuine: usize,
    pub fake: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Metadata of an artifact pair, as shown by `candor inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub directory: String,
    pub fingerprint: Uuid,
    pub created_at: DateTime<Utc>,
    pub crate_version: String,
    pub format_version: u32,
    pub vocabulary_size: usize,
    pub documents_fitted: usize,
    pub ngram_range: (usize, usize),
    pub max_features: Option<usize>,
    pub classifier: String,
    pub regularization_c: f64,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
    pub train_size: usize,
    pub test_size: usize,
    pub class_counts: [usize; 2],
    pub evaluation: EvaluationReport,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &CandorArgs,
) -> Result<()> {
    print!("{}", render_result(message, result, args)?);
    Ok(())
}

/// Render a result the way [`output_result`] prints it.
pub fn render_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &CandorArgs,
) -> Result<String> {
    match args.output_format {
        OutputFormat::Human => {
            let mut out = String::new();
            if args.verbosity() > 1 {
                out.push_str(message);
                out.push_str("\n\n");
            }
            out.push_str(&result.render_human());
            Ok(out)
        }
        OutputFormat::Json => Ok(format!("{}\n", render_json(result, args.pretty)?)),
    }
}

/// Serialize to JSON, pretty-printed on request.
pub fn render_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

impl HumanOutput for ReviewVerdict {
    fn render_human(&self) -> String {
        match self.confidence_percent {
            Some(percent) => format!("{} ({percent}% confidence)\n", self.prediction),
            None => format!("{}\n", self.prediction),
        }
    }
}

impl HumanOutput for BatchLine {
    fn render_human(&self) -> String {
        match &self.outcome {
            BatchOutcome::Verdict(verdict) => {
                format!("{:>6}: {}", self.line, verdict.render_human())
            }
            BatchOutcome::Error(error) => format!("{:>6}: error: {}\n", self.line, error.error),
        }
    }
}

impl HumanOutput for BatchSummary {
    fn render_human(&self) -> String {
        format!(
            "Scored {} reviews in {}ms: {} genuine, {} fake, {} failed\n",
            self.total, self.duration_ms, self.genuine, self.fake, self.failed
        )
    }
}

impl HumanOutput for TrainingReport {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Training Summary:");
        let _ = writeln!(out, "═════════════════");
        let _ = writeln!(out, "Fingerprint: {}", self.fingerprint);
        let _ = writeln!(
            out,
            "Dataset rows: {} ({} genuine, {} fake, {} skipped)",
            self.dataset_rows,
            self.class_counts[Label::Genuine.code() as usize],
            self.class_counts[Label::Fake.code() as usize],
            self.skipped_rows
        );
        let _ = writeln!(
            out,
            "Split: {} train / {} test",
            self.train_size, self.test_size
        );
        let _ = writeln!(out, "Vocabulary size: {}", self.vocabulary_size);
        let _ = writeln!(
            out,
            "Optimizer: {} iterations ({})",
            self.iterations,
            if self.converged { "converged" } else { "not converged" }
        );
        let _ = writeln!(out);
        let _ = write!(out, "{}", self.evaluation);
        if let Some(sample) = &self.sample {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Sample: {:?} -> {}{}",
                sample.review,
                sample.prediction.label.display_name(),
                sample
                    .prediction
                    .confidence
                    .map(|c| format!(" ({:.1}%)", c * 100.0))
                    .unwrap_or_default()
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Vectorizer: {}", self.artifacts.vectorizer.display());
        let _ = writeln!(out, "Model: {}", self.artifacts.model.display());
        let _ = writeln!(out, "Training time: {}ms", self.elapsed_ms);
        out
    }
}

impl HumanOutput for ArtifactInfo {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Artifacts: {}", self.directory);
        let _ = writeln!(out, "═══════════");
        let _ = writeln!(out, "Fingerprint: {}", self.fingerprint);
        let _ = writeln!(out, "Created: {}", self.created_at.to_rfc3339());
        let _ = writeln!(
            out,
            "Written by: candor {} (format v{})",
            self.crate_version, self.format_version
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Vectorizer:");
        let _ = writeln!(out, "  Vocabulary size: {}", self.vocabulary_size);
        let _ = writeln!(out, "  Documents fitted: {}", self.documents_fitted);
        let _ = writeln!(
            out,
            "  N-gram range: {}-{}",
            self.ngram_range.0, self.ngram_range.1
        );
        match self.max_features {
            Some(max) => {
                let _ = writeln!(out, "  Max features: {max}");
            }
            None => {
                let _ = writeln!(out, "  Max features: unlimited");
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Classifier: {}", self.classifier);
        let _ = writeln!(out, "  C: {}", self.regularization_c);
        let _ = writeln!(out, "  Intercept: {:.6}", self.intercept);
        let _ = writeln!(
            out,
            "  Iterations: {} ({})",
            self.iterations,
            if self.converged { "converged" } else { "not converged" }
        );
        let _ = writeln!(
            out,
            "  Trained on: {} rows ({} genuine, {} fake)",
            self.train_size,
            self.class_counts[Label::Genuine.code() as usize],
            self.class_counts[Label::Fake.code() as usize]
        );
        let _ = writeln!(out);
        let _ = write!(out, "{}", self.evaluation);
        out
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::ml::classifier::Prediction;

    fn verdict() -> ReviewVerdict {
        ReviewVerdict::new(
            "Love it",
            Prediction {
                label: Label::Genuine,
                confidence: Some(0.914),
            },
        )
    }

    #[test]
    fn test_human_verdict() {
        let args = CandorArgs::try_parse_from(["candor", "check", "x"]).unwrap();
        let text = render_result("Review checked", &verdict(), &args).unwrap();
        assert_eq!(text, "Genuine Review (91% confidence)\n");
    }

    #[test]
    fn test_json_verdict() {
        let args = CandorArgs::try_parse_from(["candor", "-f", "json", "check", "x"]).unwrap();
        let text = render_result("Review checked", &verdict(), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["review"], "Love it");
        assert_eq!(value["prediction"], "Genuine Review");
        assert_eq!(value["label"], "genuine");
        assert_eq!(value["confidence"], 0.91);
        assert_eq!(value["confidence_percent"], 91);
    }

    #[test]
    fn test_batch_line_json_is_flat() {
        let line = BatchLine {
            line: 3,
            outcome: BatchOutcome::Error(ErrorResponse {
                error: "No review text provided".to_string(),
            }),
        };
        assert_eq!(
            render_json(&line, false).unwrap(),
            r#"{"line":3,"error":"No review text provided"}"#
        );

        let ok = BatchLine {
            line: 1,
            outcome: BatchOutcome::Verdict(verdict()),
        };
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&ok, false).unwrap()).unwrap();
        assert_eq!(value["line"], 1);
        assert_eq!(value["confidence_percent"], 91);
    }
}
