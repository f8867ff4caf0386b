use chrono::{DateTime, Utc};
use healthkey_core::{VitalMetric, VitalSigns, VitalStatus};
use serde::Serialize;

use crate::{format_value, message, Classifier};

/// Classified view of one metric in a reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalEntry {
    pub metric: VitalMetric,
    pub value: f64,
    /// Diastolic value for the combined blood pressure entry.
    pub companion: Option<f64>,
    pub display_value: String,
    pub unit: String,
    pub status: VitalStatus,
    pub color: String,
    pub message: String,
}

/// Per-metric statuses for a reading. Absent fields produce no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingReport {
    pub reading_id: String,
    pub recorded_at: Option<DateTime<Utc>>,
    pub entries: Vec<VitalEntry>,
}

impl ReadingReport {
    pub fn classify(reading: &VitalSigns, classifier: &dyn Classifier) -> Self {
        let mut entries = Vec::new();

        match (reading.systolic, reading.diastolic) {
            (Some(systolic), Some(diastolic)) => {
                let status = classifier.classify_blood_pressure(systolic, diastolic);
                entries.push(build_entry(
                    VitalMetric::BloodPressure,
                    systolic,
                    Some(diastolic),
                    status,
                ));
            }
            (Some(systolic), None) => {
                entries.push(single(classifier, VitalMetric::Systolic, systolic))
            }
            (None, Some(diastolic)) => {
                entries.push(single(classifier, VitalMetric::Diastolic, diastolic))
            }
            (None, None) => {}
        }

        let singles = VitalMetric::ALL.into_iter().filter(|metric| {
            metric.is_classified()
                && !matches!(
                    metric,
                    VitalMetric::Systolic | VitalMetric::Diastolic | VitalMetric::BloodPressure
                )
        });
        for metric in singles {
            if let Some(value) = reading.value(metric) {
                entries.push(single(classifier, metric, value));
            }
        }

        Self {
            reading_id: reading.id.clone(),
            recorded_at: reading.recorded_at,
            entries,
        }
    }

    /// Most severe status, or `None` when nothing was classified.
    pub fn worst(&self) -> Option<VitalStatus> {
        self.entries.iter().map(|entry| entry.status).max()
    }

    pub fn has_critical(&self) -> bool {
        self.entries.iter().any(|entry| entry.status.is_critical())
    }

    pub fn entry(&self, metric: VitalMetric) -> Option<&VitalEntry> {
        self.entries.iter().find(|entry| entry.metric == metric)
    }
}

/// Whether any of `readings` has a critical entry. This is the source of
/// `HealthScoreInputs::has_critical_vital`.
pub fn any_critical<'a>(
    readings: impl IntoIterator<Item = &'a VitalSigns>,
    classifier: &dyn Classifier,
) -> bool {
    readings
        .into_iter()
        .any(|reading| ReadingReport::classify(reading, classifier).has_critical())
}

fn single(classifier: &dyn Classifier, metric: VitalMetric, value: f64) -> VitalEntry {
    let status = classifier.classify(metric.key(), value);
    build_entry(metric, value, None, status)
}

fn build_entry(
    metric: VitalMetric,
    value: f64,
    companion: Option<f64>,
    status: VitalStatus,
) -> VitalEntry {
    let display_value = match companion {
        Some(diastolic) => format!("{}/{}", format_value(value), format_value(diastolic)),
        None => format_value(value),
    };

    VitalEntry {
        metric,
        value,
        companion,
        display_value,
        unit: metric.default_unit().to_string(),
        status,
        color: status.color().to_string(),
        message: message(metric, value, status),
    }
}
