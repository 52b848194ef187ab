use anyhow::{Context, Result};
use clap::Parser;
use homevalue::application::ml::evaluation::{EvaluationReport, evaluate};
use homevalue::application::ml::forest::ForestParameters;
use homevalue::application::ml::model::TrainedModel;
use homevalue::application::ml::synthetic::SyntheticDataGenerator;
use homevalue::domain::valuation::feature_registry::FEATURE_NAMES;
use homevalue::domain::valuation::types::TrainingSample;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train and evaluate the property valuation model offline", long_about = None)]
struct Args {
    /// Number of synthetic training samples
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees (fully grown when omitted)
    #[arg(long)]
    max_depth: Option<u16>,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 2)]
    min_split: usize,

    /// Seed for the training set and the bootstrap draws
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Size of the held-out evaluation set (0 disables evaluation)
    #[arg(long, default_value_t = 200)]
    holdout: usize,

    /// Write the training set to this CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

fn export_csv(path: &Path, samples: &[TrainingSample]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push("price");
    writer.write_record(&header)?;

    for sample in samples {
        let mut record: Vec<String> = sample
            .features
            .values()
            .iter()
            .map(|v| v.to_string())
            .collect();
        record.push(sample.price.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Prints the hold-out metrics
fn print_evaluation(report: &EvaluationReport) {
    println!("\n══════════════════════════════════════════════════════");
    println!("  HOLD-OUT EVALUATION (n={})", report.samples);
    println!("══════════════════════════════════════════════════════");
    println!("    R²:                   {:.4}", report.r2);
    println!("    MAE:                  ${:.2}", report.mae);
    println!("    RMSE:                 ${:.2}", report.rmse);
    println!(
        "    95% band coverage:    {:.1}%",
        report.interval_coverage * 100.0
    );
    println!("    Mean band width:      ${:.2}", report.mean_interval_width);
    println!("    Mean confidence:      {:.2}", report.mean_confidence_score);
    if report.interval_coverage < 0.80 {
        println!("\n  NOTE: band is a tree-spread heuristic, not a calibrated interval.");
    }
    println!("══════════════════════════════════════════════════════\n");
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "Generating {} synthetic samples (seed {})...",
        args.samples, args.seed
    );
    let samples = SyntheticDataGenerator::new(args.seed).generate(args.samples);
    if samples.len() < 2 {
        anyhow::bail!("Need at least 2 samples to train, got {}", samples.len());
    }

    if let Some(path) = &args.export_csv {
        export_csv(path, &samples)?;
        println!("Training set written to {:?}", path);
    }

    let n = samples.len() as f64;
    let mean_price = samples.iter().map(|s| s.price).sum::<f64>() / n;
    let floored = samples.iter().filter(|s| s.price <= 50_000.0).count();
    println!("\nTarget Distribution (price):");
    println!("  Total:    {}", samples.len());
    println!("  Mean:     ${:.2}", mean_price);
    println!(
        "  Floored:  {} ({:.1}%)",
        floored,
        floored as f64 / n * 100.0
    );
    println!();

    let params = ForestParameters {
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        min_samples_split: args.min_split,
        seed: args.seed,
    };
    println!(
        "Training forest (Trees: {}, Depth: {}, MinSplit: {})...",
        params.n_trees,
        params
            .max_depth
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unbounded".to_string()),
        params.min_samples_split
    );

    let started = Instant::now();
    let model = TrainedModel::fit(&samples, &params).context("Training error")?;
    println!(
        "Model trained with R² score: {:.3} ({} ms)",
        model.training_r2(),
        started.elapsed().as_millis()
    );

    if args.holdout > 0 {
        let holdout =
            SyntheticDataGenerator::new(args.seed.wrapping_add(1)).generate(args.holdout);
        let report = evaluate(&model, &holdout).context("Evaluation error")?;
        print_evaluation(&report);
    }

    println!("Done.");
    Ok(())
}
