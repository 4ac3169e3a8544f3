use serde::{Deserialize, Serialize};

/// Held-out evaluation of one trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierReport {
    pub name: String,
    pub train_samples: usize,
    pub test_samples: usize,
    pub n_classes: usize,
    pub holdout_accuracy: Option<f32>,
}

impl std::fmt::Display for ClassifierReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: train={} test={} classes={}",
            self.name, self.train_samples, self.test_samples, self.n_classes
        )?;
        match self.holdout_accuracy {
            Some(accuracy) => write!(f, " accuracy={:.3}", accuracy),
            None => write!(f, " accuracy=n/a"),
        }
    }
}

pub fn accuracy(predicted: &[usize], actual: &[usize]) -> f32 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    correct as f32 / actual.len() as f32
}

/// Mean accuracy over the reports that have one.
pub fn mean_accuracy(reports: &[ClassifierReport]) -> Option<f32> {
    let scored: Vec<f32> = reports.iter().filter_map(|r| r.holdout_accuracy).collect();
    if scored.is_empty() {
        None
    } else {
        Some(scored.iter().sum::<f32>() / scored.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert!((accuracy(&[1, 2, 3, 4], &[1, 2, 0, 4]) - 0.75).abs() < 1e-6);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_mean_accuracy_skips_unscored() {
        let report = |name: &str, accuracy: Option<f32>| ClassifierReport {
            name: name.to_string(),
            train_samples: 8,
            test_samples: 2,
            n_classes: 3,
            holdout_accuracy: accuracy,
        };
        let reports = vec![report("Tops", Some(1.0)), report("Dresses", Some(0.5)), report("Bags", None)];
        assert!((mean_accuracy(&reports).unwrap() - 0.75).abs() < 1e-6);
        assert_eq!(mean_accuracy(&[]), None);
        assert_eq!(
            reports[2].to_string(),
            "Bags: train=8 test=2 classes=3 accuracy=n/a"
        );
    }
}
