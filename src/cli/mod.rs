// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to a use case.
// All business logic is delegated to Layer 2 (application);
// this layer only prints.

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{ClassifyArgs, Commands, ServeArgs, TrainArgs};

use crate::application::analyze_use_case::{Analysis, AnalysisSettings, AnalyzeUseCase};
use crate::domain::review::sample_review;

#[derive(Parser, Debug)]
#[command(
    name = "imdb-sentiment",
    version,
    about = "Classify IMDB movie reviews with a recurrent network and explain the prediction."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Classify(args) => run_classify(args),
            Commands::Serve(args)    => run_serve(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on reviews in: {}", args.data_dir);
    let history = TrainUseCase::new(args.into()).execute()?;

    if let Some(best) = history
        .iter()
        .filter(|m| !m.val_loss.is_nan())
        .min_by(|a, b| a.val_loss.total_cmp(&b.val_loss))
    {
        println!(
            "Training complete. Best epoch {} (val_loss={:.4}, val_acc={:.1}%).",
            best.epoch, best.val_loss, best.val_acc * 100.0
        );
    } else {
        println!("Training complete. Checkpoint saved.");
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    let text = match (&args.text, args.example) {
        (Some(t), _)    => t.clone(),
        (None, Some(n)) => sample_review(n as usize)
            .with_context(|| format!("No example {n}"))?
            .to_string(),
        (None, None)    => anyhow::bail!("pass --text or --example"),
    };
    let settings = AnalysisSettings::new(args.maxlen, args.threshold)?;

    let use_case = AnalyzeUseCase::from_artifacts(
        &args.model.artifact_dir,
        args.model.word_index.as_deref(),
        args.model.backend.into(),
    )?;
    let analysis = use_case.classify(&text, settings);
    print_analysis(&analysis);

    if let Some(path) = &args.report {
        std::fs::write(path, analysis.report.to_json_pretty()?)
            .with_context(|| format!("Cannot write report to '{path}'"))?;
        println!("\nReport written to {path}");
    }
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
    runtime.block_on(crate::web::serve(args))
}

fn print_analysis(a: &Analysis) {
    for e in &a.errors {
        eprintln!("error: {e}");
    }

    println!("\nSentiment: {}  ({:.4})", a.sentiment, a.prediction);
    let filled = (a.probabilities.positive * 40.0).round() as usize;
    println!(
        "Positive  [{}{}] {:.1}%",
        "#".repeat(filled.min(40)),
        " ".repeat(40 - filled.min(40)),
        a.probabilities.positive * 100.0
    );

    println!("\nDecoded tokens:\n  {}", if a.decoded.is_empty() { "(none)" } else { &a.decoded });

    if a.importances.is_empty() {
        println!("\nEnter text to compute token importances.");
    } else {
        println!("\nToken-level contribution (leave-one-out, top {}):", a.importances.len());
        println!("  {:<20} {:>10}  effect", "word", "delta");
        for row in &a.importances {
            println!("  {:<20} {:>10.4}  {}", row.word, row.delta, row.effect);
        }
    }

    println!("\nToken count: {}", a.diagnostics.token_count);
    if !a.diagnostics.tokens.is_empty() {
        println!("Tokens: {:?}", a.diagnostics.tokens);
    }
    tracing::debug!("Analysis took {} ms", a.elapsed_ms);
}
