use std::fmt::Write as _;
use std::hint::black_box;

use churnguard::config::TrainingSettings;
use churnguard::encoding::RawRecord;
use churnguard::inference::ChurnPredictor;
use churnguard::training;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use tempfile::tempdir;

const ROW_COUNT: usize = 2_000;
const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const INTERNET: [&str; 3] = ["DSL", "Fiber optic", "No"];

fn synthetic_csv() -> String {
    let mut out = String::from("customerID,gender,tenure,InternetService,Contract,MonthlyCharges,Churn\n");
    for i in 0..ROW_COUNT {
        let tenure = (i * 7) % 72;
        let contract = CONTRACTS[i % 3];
        let internet = INTERNET[(i / 3) % 3];
        let churn = if contract == "Month-to-month" && tenure < 24 && i % 5 != 0 {
            "Yes"
        } else if i % 11 == 0 {
            "Yes"
        } else {
            "No"
        };
        let monthly = 20.0 + (i % 97) as f64;
        let gender = if i % 2 == 0 { "Male" } else { "Female" };
        let _ = writeln!(
            out,
            "{i:05},{gender},{tenure},{internet},{contract},{monthly:.2},{churn}"
        );
    }
    out
}

fn setup_predictor() -> ChurnPredictor {
    let dir = tempdir().expect("tempdir");
    let dataset_path = dir.path().join("telco.csv");
    std::fs::write(&dataset_path, synthetic_csv()).expect("write dataset");
    let settings = TrainingSettings {
        dataset_path,
        artifact_dir: dir.path().join("artifacts"),
        ..TrainingSettings::default()
    };
    training::run(&settings).expect("train");
    ChurnPredictor::open(&settings.artifact_dir).expect("open predictor")
}

fn customer() -> RawRecord {
    match json!({
        "gender": "Female",
        "tenure": 3,
        "InternetService": "Fiber optic",
        "Contract": "Month-to-month",
        "MonthlyCharges": 89.1,
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn bench_predict(c: &mut Criterion) {
    let predictor = setup_predictor();
    let record = customer();
    c.bench_with_input(
        BenchmarkId::new("predict", predictor.feature_names().len()),
        &record,
        |b, record| {
            b.iter(|| predictor.predict(black_box(record)).expect("predict"));
        },
    );
}

fn bench_align(c: &mut Criterion) {
    let predictor = setup_predictor();
    let record = customer();
    c.bench_function("feature_vector", |b| {
        b.iter(|| predictor.feature_vector(black_box(&record)));
    });
}

criterion_group!(benches, bench_predict, bench_align);
criterion_main!(benches);
