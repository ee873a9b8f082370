//! Command implementations for the candor CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::artifact::{self, FORMAT_VERSION};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{CandorError, Result};
use crate::ml::classifier::Classifier;
use crate::ml::label::Label;
use crate::scoring::{Scorer, ScoringService};
use crate::trainer::{Trainer, TrainerConfig};

/// Execute a CLI command.
pub fn execute_command(args: CandorArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Check(check_args) => check(check_args.clone(), &args),
        Command::Batch(batch_args) => batch(batch_args.clone(), &args),
        Command::Inspect(inspect_args) => inspect(inspect_args.clone(), &args),
    }
}

/// Build the training configuration: the JSON file if given, else the
/// defaults, with every flag that was set applied on top.
pub fn build_trainer_config(args: &TrainArgs) -> Result<TrainerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading training configuration from {}", path.display());
            TrainerConfig::from_json_file(path)?
        }
        None => TrainerConfig::default(),
    };

    if let Some(dataset) = &args.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(column) = &args.text_column {
        config.dataset.text_column = column.clone();
    }
    if let Some(column) = &args.label_column {
        config.dataset.label_column = column.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.dataset.delimiter = delimiter;
    }
    if let Some(max_features) = args.max_features {
        config.vectorizer.max_features = Some(max_features);
    }
    if let Some(test_size) = args.test_size {
        config.split.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
    }
    if args.no_stratify {
        config.split.stratify = false;
    }
    if let Some(c) = args.c {
        config.classifier.c = c;
    }
    if let Some(max_iter) = args.max_iter {
        config.classifier.max_iter = max_iter;
    }
    if args.no_sample {
        config.sample_review = None;
    }

    config.validate()?;
    Ok(config)
}

/// Train a model and write its artifacts.
fn train(args: TrainArgs, cli_args: &CandorArgs) -> Result<()> {
    let config = build_trainer_config(&args)?;
    log::info!(
        "training on {} into {}",
        config.dataset.path.display(),
        config.output_dir.display()
    );

    let report = Trainer::new(config)?.train()?;
    output_result("Training complete", &report, cli_args)
}

/// Classify one review.
fn check(args: CheckArgs, cli_args: &CandorArgs) -> Result<()> {
    let service = ScoringService::new(Scorer::load(&args.artifacts)?);
    let verdict = service.check_review(&args.review)?;
    output_result("Review checked", &verdict, cli_args)
}

/// Classify one review per input line in parallel.
fn batch(args: BatchArgs, cli_args: &CandorArgs) -> Result<()> {
    let reviews = read_reviews(&args.input)?;
    let service = ScoringService::new(Scorer::load(&args.artifacts)?);
    let start_time = Instant::now();

    let results = match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| CandorError::internal(format!("cannot start thread pool: {e}")))?;
            pool.install(|| service.check_all(&reviews))
        }
        None => service.check_all(&reviews),
    };

    let mut summary = BatchSummary {
        total: results.len(),
        genuine: 0,
        fake: 0,
        failed: 0,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };

    for (i, result) in results.into_iter().enumerate() {
        let outcome = match result {
            Ok(verdict) => {
                match verdict.label {
                    Label::Genuine => summary.genuine += 1,
                    Label::Fake => summary.fake += 1,
                }
                BatchOutcome::Verdict(verdict)
            }
            Err(e) => {
                summary.failed += 1;
                BatchOutcome::Error(e.response())
            }
        };
        let line = BatchLine {
            line: i + 1,
            outcome,
        };
        match cli_args.output_format {
            // One object per line regardless of --pretty.
            OutputFormat::Json => println!("{}", render_json(&line, false)?),
            OutputFormat::Human => print!("{}", line.render_human()),
        }
    }

    match cli_args.output_format {
        OutputFormat::Human if cli_args.verbosity() > 0 => print!("{}", summary.render_human()),
        _ => log::info!("{}", summary.render_human().trim_end()),
    }
    Ok(())
}

/// Show the metadata of an artifact pair.
fn inspect(args: InspectArgs, cli_args: &CandorArgs) -> Result<()> {
    let loaded = artifact::read_pair(&args.artifacts)?;
    let classifier = &loaded.model.classifier;
    let summary = classifier.summary();

    let info = ArtifactInfo {
        directory: args.artifacts.display().to_string(),
        fingerprint: loaded.fingerprint(),
        created_at: loaded.model_header.created_at,
        crate_version: loaded.model_header.crate_version.clone(),
        format_version: FORMAT_VERSION,
        vocabulary_size: loaded.vectorizer.terms.len(),
        documents_fitted: loaded.vectorizer.n_documents,
        ngram_range: loaded.vectorizer.config.ngram_range,
        max_features: loaded.vectorizer.config.max_features,
        classifier: classifier.name().to_string(),
        regularization_c: classifier.config().c,
        intercept: classifier.intercept(),
        iterations: summary.iterations,
        converged: summary.converged,
        train_size: loaded.model.train_size,
        test_size: loaded.model.test_size,
        class_counts: loaded.model.class_counts,
        evaluation: loaded.model.evaluation.clone(),
    };
    output_result("Artifact pair is valid", &info, cli_args)
}

/// Read one review per line from a file, or from stdin for `-`.
fn read_reviews(input: &Path) -> Result<Vec<String>> {
    let lines: io::Result<Vec<String>> = if input == Path::new("-") {
        io::stdin().lock().lines().collect()
    } else {
        if !input.is_file() {
            return Err(CandorError::invalid_argument(format!(
                "input file not found: {}",
                input.display()
            )));
        }
        BufReader::new(File::open(input)?).lines().collect()
    };
    Ok(lines?)
}
