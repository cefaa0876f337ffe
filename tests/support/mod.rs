pub mod telco;
