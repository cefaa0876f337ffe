//! Train the churn classifier and export its artifacts.

use std::path::PathBuf;

use churnguard::{config, logging, training};

fn main() {
    if let Err(err) = run() {
        tracing::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init("churnguard-train") {
        logging::init_stderr();
        tracing::warn!("File logging unavailable: {err}");
    }

    let config = match &options.config_path {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    let settings = config.training;
    tracing::info!(
        "Training from {} into {}",
        settings.dataset_path.display(),
        settings.artifact_dir.display()
    );

    let manifest = training::run(&settings).map_err(|err| err.to_string())?;
    let eval = &manifest.evaluation;
    println!("rows: {} train / {} test", manifest.rows_train, manifest.rows_test);
    println!("features: {}", manifest.n_features);
    println!("test accuracy: {:.4}", eval.accuracy);
    println!(
        "churn precision={:.3}  recall={:.3}  f1={:.3}",
        eval.precision, eval.recall, eval.f1
    );
    if let Some(auc) = eval.roc_auc {
        println!("roc auc: {auc:.4}");
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for row in eval.confusion {
        println!("{:6}{:6}", row[0], row[1]);
    }
    println!("Artifacts saved to {}", settings.artifact_dir.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "churnguard-train",
        "",
        "Trains the churn classifier from a CSV export and writes model.json,",
        "preprocessing.json, feature_columns.txt, encoding.json and manifest.json.",
        "",
        "Usage:",
        "  churnguard-train [--config <file>]",
        "",
        "Options:",
        "  --config <file>  TOML config (default: .churnguard/config.toml; built-in defaults if absent).",
    ]
    .join("\n")
}
