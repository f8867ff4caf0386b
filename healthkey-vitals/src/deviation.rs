use healthkey_core::{HealthKeyConfig, VitalRanges, VitalStatus};

use crate::Classifier;

/// Classifier over the legacy `[min, max]` ranges.
///
/// Outside the band, the relative deviation from the nearest bound decides:
/// above `critical_ratio` is critical, anything else is a warning
/// ([`VitalStatus::Elevated`]).
#[derive(Debug, Clone)]
pub struct DeviationClassifier {
    ranges: VitalRanges,
    critical_ratio: f64,
}

impl Default for DeviationClassifier {
    fn default() -> Self {
        Self::new(VitalRanges::default())
    }
}

impl DeviationClassifier {
    pub const DEFAULT_CRITICAL_RATIO: f64 = 0.3;

    pub fn new(ranges: VitalRanges) -> Self {
        Self {
            ranges,
            critical_ratio: Self::DEFAULT_CRITICAL_RATIO,
        }
    }

    pub fn from_config(ranges: VitalRanges, config: &HealthKeyConfig) -> Self {
        Self::new(ranges).with_critical_ratio(config.deviation_critical_ratio)
    }

    pub fn with_critical_ratio(mut self, ratio: f64) -> Self {
        self.critical_ratio = ratio;
        self
    }

    /// Relative distance outside the band; `Some(0.0)` inside it, `None` for
    /// unknown metrics or non-finite values.
    pub fn deviation(&self, metric: &str, value: f64) -> Option<f64> {
        let range = self.ranges.get(metric)?;
        if !value.is_finite() {
            return None;
        }

        let deviation = if value < range.min {
            (range.min - value) / range.min.abs()
        } else if value > range.max {
            (value - range.max) / range.max.abs()
        } else {
            0.0
        };
        Some(deviation)
    }
}

impl Classifier for DeviationClassifier {
    fn classify(&self, metric: &str, value: f64) -> VitalStatus {
        let Some(range) = self.ranges.get(metric) else {
            tracing::warn!(metric, "no range configured, reporting normal");
            return VitalStatus::Normal;
        };
        if !value.is_finite() || range.contains(value) {
            return VitalStatus::Normal;
        }

        match self.deviation(metric, value) {
            Some(deviation) if deviation > self.critical_ratio => VitalStatus::Critical,
            _ => VitalStatus::Elevated,
        }
    }
}
