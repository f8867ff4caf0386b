//! Vital-sign classification, advisory messages and the aggregate health score.
//!
//! Two classifiers exist side by side: [`IntervalClassifier`] works from the
//! nested severity table, [`DeviationClassifier`] from the legacy `[min, max]`
//! ranges. Nothing picks one implicitly; every caller passes the classifier it
//! wants.

use healthkey_core::{VitalMetric, VitalStatus};

mod alert;
mod deviation;
mod interval;
mod message;
mod report;
mod score;
mod store;

pub use alert::{
    critical_alerts, dispatch_critical, AlertError, AlertTransport, CaregiverAlert,
    TracingTransport,
};
pub use deviation::DeviationClassifier;
pub use interval::IntervalClassifier;
pub use message::{format_value, message, NORMAL_MESSAGE};
pub use report::{any_critical, ReadingReport, VitalEntry};
pub use score::{
    adherence_score, check_in_score, completeness_score, health_score, health_score_with_penalty,
    HealthScore, HealthScoreInputs, ADHERENCE_WEIGHT, CHECK_IN_WEIGHT, COMPLETENESS_WEIGHT,
    CRITICAL_VITAL_PENALTY,
};
pub use store::{ReadingLog, ReadingLogError};

/// Maps a single reading to a severity level.
pub trait Classifier {
    /// Classify one value against the table entry named `metric`.
    ///
    /// Unknown metrics resolve to [`VitalStatus::Normal`].
    fn classify(&self, metric: &str, value: f64) -> VitalStatus;

    /// Worst of the systolic and diastolic statuses.
    fn classify_blood_pressure(&self, systolic: f64, diastolic: f64) -> VitalStatus {
        let systolic = self.classify(VitalMetric::Systolic.key(), systolic);
        let diastolic = self.classify(VitalMetric::Diastolic.key(), diastolic);
        systolic.worst(diastolic)
    }

    /// Typed entry point. `companion` is the diastolic value when `metric` is
    /// [`VitalMetric::BloodPressure`], and ignored otherwise.
    fn classify_metric(
        &self,
        metric: VitalMetric,
        value: f64,
        companion: Option<f64>,
    ) -> VitalStatus {
        match (metric, companion) {
            (VitalMetric::BloodPressure, Some(diastolic)) => {
                self.classify_blood_pressure(value, diastolic)
            }
            (VitalMetric::BloodPressure, None) => self.classify(VitalMetric::Systolic.key(), value),
            _ => self.classify(metric.key(), value),
        }
    }
}
