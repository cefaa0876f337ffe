use std::fmt;

/// Lower probability bound of [`RiskTier::High`].
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Lower probability bound of [`RiskTier::Moderate`].
pub const MODERATE_RISK_THRESHOLD: f64 = 0.5;
/// Lower probability bound of [`RiskTier::Low`].
pub const LOW_RISK_THRESHOLD: f64 = 0.3;

/// Discretized churn probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            Self::Moderate
        } else if probability >= LOW_RISK_THRESHOLD {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    /// Tier for a model that only yields hard labels.
    pub fn from_label(label: u8) -> Self {
        if label == 1 { Self::High } else { Self::Low }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::High => "🚨 HIGH CHURN RISK",
            Self::Moderate => "⚠️ MODERATE CHURN RISK",
            Self::Low => "🟡 LOW CHURN RISK",
            Self::VeryLow => "✅ VERY LOW CHURN RISK",
        }
    }
}

/// What the classifier produced for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Class-1 probability in `[0, 1]`.
    Probability(f64),
    /// Hard label from a model without probability estimates.
    Label(u8),
}

/// A prediction with its risk tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub prediction: Prediction,
    pub tier: RiskTier,
}

impl RiskAssessment {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            prediction: Prediction::Probability(probability),
            tier: RiskTier::from_probability(probability),
        }
    }

    pub fn from_label(label: u8) -> Self {
        Self {
            prediction: Prediction::Label(label),
            tier: RiskTier::from_label(label),
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self.prediction {
            Prediction::Probability(p) => Some(p),
            Prediction::Label(_) => None,
        }
    }

    /// Human-readable message for display.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headline = self.tier.headline();
        match self.prediction {
            Prediction::Probability(p) => {
                let pct = p * 100.0;
                match self.tier {
                    RiskTier::High => write!(
                        f,
                        "{headline}\nCustomer is likely to churn with {pct:.1}% probability"
                    ),
                    RiskTier::Moderate => write!(
                        f,
                        "{headline}\nCustomer may churn with {pct:.1}% probability"
                    ),
                    RiskTier::Low => write!(
                        f,
                        "{headline}\nCustomer is unlikely to churn ({pct:.1}% probability)"
                    ),
                    RiskTier::VeryLow => write!(
                        f,
                        "{headline}\nCustomer is very unlikely to churn ({pct:.1}% probability)"
                    ),
                }
            }
            Prediction::Label(1) => write!(f, "{headline}\nCustomer is predicted to churn"),
            Prediction::Label(_) => write!(f, "{headline}\nCustomer is predicted to stay"),
        }
    }
}
