use chrono::{DateTime, Utc};
use healthkey_core::{VitalMetric, VitalStatus};
use serde::Serialize;

use crate::ReadingReport;

/// Record handed to the caregiver alert transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverAlert {
    pub reading_id: String,
    pub metric: VitalMetric,
    pub display_value: String,
    pub unit: String,
    pub status: VitalStatus,
    pub message: String,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Delivers alerts over an external channel (SMS, push, email...).
pub trait AlertTransport {
    fn deliver(&self, alert: &CaregiverAlert) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Unavailable(String),
    #[error("alert rejected: {0}")]
    Rejected(String),
}

/// One alert per critical entry of the report.
pub fn critical_alerts(report: &ReadingReport) -> Vec<CaregiverAlert> {
    report
        .entries
        .iter()
        .filter(|entry| entry.status.is_critical())
        .map(|entry| CaregiverAlert {
            reading_id: report.reading_id.clone(),
            metric: entry.metric,
            display_value: entry.display_value.clone(),
            unit: entry.unit.clone(),
            status: entry.status,
            message: entry.message.clone(),
            recorded_at: report.recorded_at,
        })
        .collect()
}

/// Deliver every critical alert; failures are logged and skipped. Returns the
/// number delivered.
pub fn dispatch_critical(report: &ReadingReport, transport: &dyn AlertTransport) -> usize {
    critical_alerts(report)
        .iter()
        .filter(|alert| match transport.deliver(alert) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    reading_id = %alert.reading_id,
                    metric = %alert.metric,
                    error = %err,
                    "caregiver alert delivery failed"
                );
                false
            }
        })
        .count()
}

/// Transport that only emits a log event. Used where no real channel is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTransport;

impl AlertTransport for TracingTransport {
    fn deliver(&self, alert: &CaregiverAlert) -> Result<(), AlertError> {
        tracing::warn!(
            reading_id = %alert.reading_id,
            metric = %alert.metric,
            value = %alert.display_value,
            message = %alert.message,
            "critical vital reading"
        );
        Ok(())
    }
}
