use healthkey_core::{VitalStatus, VitalThresholds};

use crate::Classifier;

/// Classifier over nested normal/elevated/critical intervals.
///
/// Critical intervals are checked first, then elevated; anything else is normal.
#[derive(Debug, Clone, Default)]
pub struct IntervalClassifier {
    thresholds: VitalThresholds,
}

impl IntervalClassifier {
    pub fn new(thresholds: VitalThresholds) -> Self {
        Self { thresholds }
    }
}

impl Classifier for IntervalClassifier {
    fn classify(&self, metric: &str, value: f64) -> VitalStatus {
        let Some(thresholds) = self.thresholds.get(metric) else {
            tracing::warn!(metric, "no thresholds configured, reporting normal");
            return VitalStatus::Normal;
        };

        if !value.is_finite() {
            tracing::debug!(metric, "non-finite reading, reporting normal");
            return VitalStatus::Normal;
        }

        if thresholds.is_critical(value) {
            VitalStatus::Critical
        } else if thresholds.is_elevated(value) {
            VitalStatus::Elevated
        } else {
            VitalStatus::Normal
        }
    }
}
