//! Offline training job: CSV in, artifact directory out.

use ndarray::Axis;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::artifacts::{ArtifactBundle, ArtifactError, ArtifactPaths, TrainingManifest, save_bundle};
use crate::config::TrainingSettings;
use crate::dataset::{DatasetError, LabelMapping, RawTable, clean, load_csv, train_test_split};
use crate::encoding::{EncodingError, LabelRule, encode_table, fit_schema};
use crate::ml::logreg::{TrainOptions, train_logreg};
use crate::ml::metrics::BinaryReport;
use crate::ml::scaler::StandardScaler;
use crate::ml::{Classifier, ModelError};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Model fitting failed: {0}")]
    Model(#[from] ModelError),
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Failed to format manifest timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Result of fitting on an in-memory table, before anything touches disk.
#[derive(Debug, Clone)]
pub struct FittedArtifacts {
    pub bundle: ArtifactBundle,
    pub evaluation: BinaryReport,
    pub rows_raw: usize,
    pub rows_clean: usize,
    pub rows_train: usize,
    pub rows_test: usize,
}

/// Run the whole job described by `settings` and persist its artifacts.
pub fn run(settings: &TrainingSettings) -> Result<TrainingManifest, TrainingError> {
    let loaded = load_csv(&settings.dataset_path)?;
    let fitted = fit_table(loaded.table, settings)?;
    let manifest = TrainingManifest {
        created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        crate_version: env!("CARGO_PKG_VERSION").to_string(),
        dataset_path: settings.dataset_path.clone(),
        dataset_sha256: loaded.sha256,
        rows_raw: fitted.rows_raw,
        rows_clean: fitted.rows_clean,
        rows_train: fitted.rows_train,
        rows_test: fitted.rows_test,
        n_features: fitted.bundle.feature_names.len(),
        seed: settings.seed,
        test_fraction: settings.test_fraction,
        max_iter: settings.max_iter,
        c: settings.c,
        iterations: fitted.bundle.model.iterations,
        converged: fitted.bundle.model.converged,
        evaluation: fitted.evaluation,
    };
    save_bundle(
        &ArtifactPaths::new(&settings.artifact_dir),
        &fitted.bundle,
        &manifest,
    )?;
    Ok(manifest)
}

/// Clean, encode, split, scale, fit and evaluate `table`.
pub fn fit_table(
    table: RawTable,
    settings: &TrainingSettings,
) -> Result<FittedArtifacts, TrainingError> {
    let rows_raw = table.rows.len();
    let label = LabelMapping {
        column: settings.label_column.clone(),
        positive: settings.positive_label.clone(),
        negative: settings.negative_label.clone(),
    };
    let cleaned = clean(table, &label, &settings.id_columns)?;
    let rows_clean = cleaned.rows.len();

    let schema = fit_schema(
        &cleaned,
        LabelRule {
            column: label.column,
            positive: label.positive,
            negative: label.negative,
        },
        settings.id_columns.clone(),
    )?;
    let feature_names = schema.feature_names();
    tracing::info!(
        "Encoded {} source columns into {} features",
        schema.columns.len(),
        feature_names.len()
    );
    let x = encode_table(&schema, &cleaned);

    let split = train_test_split(rows_clean, settings.test_fraction, settings.seed)?;
    let x_train = x.select(Axis(0), &split.train);
    let x_test = x.select(Axis(0), &split.test);
    let y_train: Vec<u8> = split.train.iter().map(|&idx| cleaned.labels[idx]).collect();
    let y_test: Vec<u8> = split.test.iter().map(|&idx| cleaned.labels[idx]).collect();
    tracing::info!(
        "Split {rows_clean} rows into {} train / {} test (seed {})",
        y_train.len(),
        y_test.len(),
        settings.seed
    );

    let scaler = StandardScaler::fit(x_train.view())?;
    let x_train_scaled = scaler.transform(x_train.view())?;
    let options = TrainOptions {
        max_iter: settings.max_iter,
        tolerance: settings.tolerance,
        learning_rate: settings.learning_rate,
        c: settings.c,
    };
    let model = train_logreg(x_train_scaled.view(), &y_train, &options)?;
    tracing::info!(
        "Fitted logistic regression in {} iterations (converged: {})",
        model.iterations,
        model.converged
    );

    let x_test_scaled = scaler.transform(x_test.view())?;
    let probabilities: Vec<f64> = x_test_scaled
        .rows()
        .into_iter()
        .map(|row| {
            let row = row.to_vec();
            model
                .predict_proba(&row)
                .unwrap_or_else(|| f64::from(model.predict_label(&row)))
        })
        .collect();
    let evaluation = BinaryReport::evaluate(&probabilities, &y_test);
    tracing::info!(
        "Held-out accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}, roc_auc {}",
        evaluation.accuracy,
        evaluation.precision,
        evaluation.recall,
        evaluation.f1,
        evaluation
            .roc_auc
            .map(|auc| format!("{auc:.4}"))
            .unwrap_or_else(|| "n/a".to_string())
    );

    Ok(FittedArtifacts {
        bundle: ArtifactBundle {
            model,
            scaler,
            feature_names,
            schema,
        },
        evaluation,
        rows_raw,
        rows_clean,
        rows_train: split.train.len(),
        rows_test: split.test.len(),
    })
}
