//! Score one customer record read as JSON from a file or stdin.

use std::io::Read;
use std::path::PathBuf;

use churnguard::{config, inference, logging};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    // stdout carries the prediction, so logs go to stderr only.
    logging::init_stderr();

    let artifact_dir = match options.artifact_dir {
        Some(dir) => dir,
        None => {
            let config = match &options.config_path {
                Some(path) => config::load_from(path),
                None => config::load_or_default(),
            }
            .map_err(|err| err.to_string())?;
            config.inference.artifact_dir
        }
    };

    let text = match &options.record_path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            buf
        }
    };

    let message = match serde_json::from_str(&text) {
        Ok(record) => inference::predict_message(&artifact_dir, &record),
        Err(err) => inference::render(Err(inference::InferenceError::InvalidInput(format!(
            "record is not valid JSON: {err}"
        )))),
    };
    println!("{message}");
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    artifact_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    record_path: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--artifacts" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--artifacts requires a value".to_string())?;
                options.artifact_dir = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown argument: {flag}\n\n{}", help_text()));
            }
            path => {
                if options.record_path.is_some() {
                    return Err(format!("Unexpected extra argument: {path}"));
                }
                options.record_path = Some(PathBuf::from(path));
            }
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "churnguard-predict",
        "",
        "Prints the churn risk message for one JSON record (or an [inference error] line).",
        "",
        "Usage:",
        "  churnguard-predict [--artifacts <dir>] [--config <file>] [record.json]",
        "",
        "Options:",
        "  --artifacts <dir>  Artifact directory (overrides the config).",
        "  --config <file>    TOML config (default: .churnguard/config.toml).",
        "",
        "Reads the record from stdin when no file is given.",
    ]
    .join("\n")
}
