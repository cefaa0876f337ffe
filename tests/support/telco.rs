use std::fmt::Write as _;
use std::path::Path;

use churnguard::config::TrainingSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,\
InternetService,OnlineSecurity,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges,Churn";

const INTERNET: &[&str] = &["DSL", "Fiber optic", "No"];
const CONTRACTS: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENT: &[&str] = &[
    "Bank transfer (automatic)",
    "Credit card (automatic)",
    "Electronic check",
    "Mailed check",
];

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

fn yes_no(rng: &mut StdRng, p_yes: f64) -> &'static str {
    if rng.random::<f64>() < p_yes { "Yes" } else { "No" }
}

/// Deterministic Telco-shaped CSV where short month-to-month fiber customers churn most.
pub fn telco_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from(HEADER);
    out.push('\n');
    for idx in 0..rows {
        let gender = if rng.random::<bool>() { "Female" } else { "Male" };
        let senior = u8::from(rng.random::<f64>() < 0.16);
        let partner = yes_no(&mut rng, 0.48);
        let dependents = yes_no(&mut rng, 0.3);
        let tenure: u32 = rng.random_range(0..72);
        let phone = yes_no(&mut rng, 0.9);
        let internet = pick(&mut rng, INTERNET);
        let security = if internet == "No" {
            "No internet service"
        } else {
            yes_no(&mut rng, 0.35)
        };
        let contract = pick(&mut rng, CONTRACTS);
        let paperless = yes_no(&mut rng, 0.6);
        let payment = pick(&mut rng, PAYMENT);
        let monthly = match internet {
            "Fiber optic" => 70.0 + rng.random::<f64>() * 45.0,
            "DSL" => 40.0 + rng.random::<f64>() * 30.0,
            _ => 18.0 + rng.random::<f64>() * 10.0,
        };
        // Blank TotalCharges for brand-new accounts, as in the public export.
        let total = if tenure == 0 {
            " ".to_string()
        } else {
            format!("{:.2}", monthly * f64::from(tenure))
        };

        let mut logit = -1.0;
        logit += match contract {
            "Month-to-month" => 1.6,
            "One year" => -0.4,
            _ => -1.8,
        };
        logit += if internet == "Fiber optic" { 0.8 } else { -0.3 };
        logit -= f64::from(tenure) / 24.0;
        logit += if payment == "Electronic check" { 0.5 } else { 0.0 };
        logit += if security == "Yes" { -0.5 } else { 0.0 };
        let p = 1.0 / (1.0 + (-logit).exp());
        let churn = yes_no(&mut rng, p);

        let _ = writeln!(
            out,
            "{:04}-CUST,{gender},{senior},{partner},{dependents},{tenure},{phone},{internet},\
             {security},{contract},{paperless},\"{payment}\",{monthly:.2},{total},{churn}",
            idx
        );
    }
    out
}

/// Write a dataset into `dir` and return settings that train from it.
pub fn write_dataset(dir: &Path, rows: usize, seed: u64) -> TrainingSettings {
    let dataset_path = dir.join("data").join("raw").join("telco.csv");
    std::fs::create_dir_all(dataset_path.parent().unwrap()).unwrap();
    std::fs::write(&dataset_path, telco_csv(rows, seed)).unwrap();
    TrainingSettings {
        dataset_path,
        artifact_dir: dir.join("artifacts").join("v1_0"),
        ..TrainingSettings::default()
    }
}
