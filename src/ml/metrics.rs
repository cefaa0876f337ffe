//! Evaluation metrics for the held-out split.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| u64::from(v)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

impl PerClassStats {
    pub fn f1(&self) -> f64 {
        if self.precision + self.recall == 0.0 {
            0.0
        } else {
            2.0 * self.precision * self.recall / (self.precision + self.recall)
        }
    }
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = f64::from(cm.get(class_idx, class_idx));
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += f64::from(v);
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += f64::from(cm.get(i, class_idx));
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let correct: u64 = (0..cm.n_classes)
        .map(|class_idx| u64::from(cm.get(class_idx, class_idx)))
        .sum();
    let total = cm.total();
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

/// Area under the ROC curve for class 1 via the rank-sum statistic.
///
/// Tied scores share their average rank. Returns `None` when either class is
/// absent.
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&label| label == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 || scores.len() != labels.len() {
        return None;
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut pos_rank_sum = 0.0f64;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group covers ranks start+1..=end.
        let avg_rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            if labels[idx] == 1 {
                pos_rank_sum += avg_rank;
            }
        }
        start = end;
    }
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Some(u / (n_pos * n_neg as f64))
}

/// Held-out evaluation summary stored in the training manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryReport {
    pub support: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when the evaluation split holds a single class.
    pub roc_auc: Option<f64>,
    /// `[[tn, fp], [fn, tp]]`.
    pub confusion: [[u32; 2]; 2],
}

impl BinaryReport {
    /// Score class-1 probabilities against true labels at a 0.5 threshold.
    pub fn evaluate(probabilities: &[f64], labels: &[u8]) -> Self {
        let mut cm = ConfusionMatrix::new(2);
        for (&p, &truth) in probabilities.iter().zip(labels) {
            cm.add(usize::from(truth), usize::from(p >= 0.5));
        }
        let positive = precision_recall_by_class(&cm)[1];
        Self {
            support: labels.len(),
            accuracy: accuracy(&cm),
            precision: positive.precision,
            recall: positive.recall,
            f1: positive.f1(),
            roc_auc: roc_auc(probabilities, labels),
            confusion: [[cm.get(0, 0), cm.get(0, 1)], [cm.get(1, 0), cm.get(1, 1)]],
        }
    }
}
