//! Bảng ngưỡng chỉ số sống: bảng khoảng nhiều mức và bảng range cũ.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{HealthKeyError, VitalMetric};

/// Khoảng `[min, max]`, có thể kèm cận trên mở `below` (giá trị phải `< below`).
/// Thiếu một đầu nghĩa là khoảng một phía.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Interval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
}

impl Interval {
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            below: None,
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
            below: None,
        }
    }

    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
            below: None,
        }
    }

    /// Mọi giá trị nhỏ hơn hẳn `limit`.
    pub const fn below(limit: f64) -> Self {
        Self {
            min: None,
            max: None,
            below: Some(limit),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.min.map_or(true, |min| value >= min)
            && self.max.map_or(true, |max| value <= max)
            && self.below.map_or(true, |limit| value < limit)
    }
}

/// Các mức ngưỡng của một chỉ số.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricThresholds {
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<Interval>,
    #[serde(default, alias = "warning", skip_serializing_if = "Option::is_none")]
    pub elevated: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_high: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_low: Option<Interval>,
}

impl MetricThresholds {
    fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            ..Self::default()
        }
    }

    fn normal(mut self, interval: Interval) -> Self {
        self.normal = Some(interval);
        self
    }

    fn elevated(mut self, interval: Interval) -> Self {
        self.elevated = Some(interval);
        self
    }

    fn critical_high(mut self, interval: Interval) -> Self {
        self.critical_high = Some(interval);
        self
    }

    fn critical_low(mut self, interval: Interval) -> Self {
        self.critical_low = Some(interval);
        self
    }

    /// Giá trị nằm trong bất kỳ khoảng nguy kịch nào.
    pub fn is_critical(&self, value: f64) -> bool {
        [self.critical, self.critical_high, self.critical_low]
            .iter()
            .flatten()
            .any(|interval| interval.contains(value))
    }

    pub fn is_elevated(&self, value: f64) -> bool {
        self.elevated.map_or(false, |interval| interval.contains(value))
    }
}

/// Bảng ngưỡng nhiều mức theo tên chỉ số. Có thể ghi đè từng chỉ số qua JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct VitalThresholds {
    metrics: BTreeMap<String, MetricThresholds>,
}

impl Default for VitalThresholds {
    fn default() -> Self {
        let mut metrics = BTreeMap::new();
        let mut put = |metric: VitalMetric, thresholds: MetricThresholds| {
            metrics.insert(metric.key().to_string(), thresholds);
        };

        // Bậc nguy kịch được xét trước, nên mức tăng chỉ cần cận dưới. Cận thấp
        // nguy kịch dùng `below` để giá trị lẻ như 49.5 không rơi vào khe hở.
        put(
            VitalMetric::HeartRate,
            MetricThresholds::new("bpm")
                .normal(Interval::between(60.0, 100.0))
                .elevated(Interval::at_least(101.0))
                .critical_high(Interval::at_least(111.0))
                .critical_low(Interval::below(50.0)),
        );
        put(
            VitalMetric::Systolic,
            MetricThresholds::new("mmHg")
                .normal(Interval::at_most(119.0))
                .elevated(Interval::at_least(120.0))
                .critical_high(Interval::at_least(140.0))
                .critical_low(Interval::below(90.0)),
        );
        put(
            VitalMetric::Diastolic,
            MetricThresholds::new("mmHg")
                .normal(Interval::at_most(79.0))
                .elevated(Interval::at_least(80.0))
                .critical_high(Interval::at_least(90.0))
                .critical_low(Interval::below(50.0)),
        );
        put(
            VitalMetric::Temperature,
            MetricThresholds::new("°F")
                .normal(Interval::between(97.0, 99.0))
                .elevated(Interval::at_least(99.1))
                .critical_high(Interval::at_least(100.4))
                .critical_low(Interval::at_most(95.0)),
        );
        put(
            VitalMetric::OxygenSaturation,
            MetricThresholds::new("%")
                .normal(Interval::between(95.0, 100.0))
                .elevated(Interval::at_most(94.0))
                .critical_low(Interval::at_most(90.0)),
        );
        put(
            VitalMetric::RespiratoryRate,
            MetricThresholds::new("breaths/min")
                .normal(Interval::between(12.0, 20.0))
                .elevated(Interval::at_least(21.0))
                .critical_high(Interval::at_least(25.0))
                .critical_low(Interval::below(9.0)),
        );
        put(
            VitalMetric::Glucose,
            MetricThresholds::new("mg/dL")
                .normal(Interval::between(70.0, 99.0))
                .elevated(Interval::at_least(100.0))
                .critical_high(Interval::at_least(126.0))
                .critical_low(Interval::below(55.0)),
        );

        Self { metrics }
    }
}

impl VitalThresholds {
    /// Bảng rỗng, dùng khi muốn tự dựng toàn bộ ngưỡng.
    pub fn empty() -> Self {
        Self {
            metrics: BTreeMap::new(),
        }
    }

    /// Đọc JSON và ghép lên bảng mặc định: chỉ số có trong JSON thay thế bản mặc định.
    pub fn from_json_str(input: &str) -> Result<Self, HealthKeyError> {
        let overrides: Self =
            serde_json::from_str(input).map_err(|err| HealthKeyError::Config(err.to_string()))?;
        let mut table = Self::default();
        table.merge(overrides);
        Ok(table)
    }

    pub fn merge(&mut self, other: Self) {
        self.metrics.extend(other.metrics);
    }

    pub fn get(&self, metric: &str) -> Option<&MetricThresholds> {
        self.metrics.get(metric)
    }

    pub fn insert(&mut self, metric: impl Into<String>, thresholds: MetricThresholds) {
        self.metrics.insert(metric.into(), thresholds);
    }
}

/// Một dải bình thường `[min, max]` của bảng range cũ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: String,
}

impl VitalRange {
    pub fn new(min: f64, max: f64, unit: &str) -> Self {
        Self {
            min,
            max,
            unit: unit.to_string(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Bảng range cũ dùng cho bộ phân loại theo độ lệch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct VitalRanges {
    ranges: BTreeMap<String, VitalRange>,
}

impl Default for VitalRanges {
    fn default() -> Self {
        let ranges = [
            (VitalMetric::HeartRate, VitalRange::new(60.0, 100.0, "bpm")),
            (VitalMetric::Systolic, VitalRange::new(90.0, 140.0, "mmHg")),
            (VitalMetric::Diastolic, VitalRange::new(60.0, 90.0, "mmHg")),
            (VitalMetric::Temperature, VitalRange::new(97.0, 99.0, "°F")),
            (
                VitalMetric::OxygenSaturation,
                VitalRange::new(95.0, 100.0, "%"),
            ),
            (
                VitalMetric::RespiratoryRate,
                VitalRange::new(12.0, 20.0, "breaths/min"),
            ),
            (VitalMetric::Glucose, VitalRange::new(70.0, 140.0, "mg/dL")),
        ]
        .into_iter()
        .map(|(metric, range)| (metric.key().to_string(), range))
        .collect();

        Self { ranges }
    }
}

impl VitalRanges {
    pub fn empty() -> Self {
        Self {
            ranges: BTreeMap::new(),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, HealthKeyError> {
        let overrides: Self =
            serde_json::from_str(input).map_err(|err| HealthKeyError::Config(err.to_string()))?;
        let mut table = Self::default();
        table.merge(overrides);
        Ok(table)
    }

    pub fn merge(&mut self, other: Self) {
        self.ranges.extend(other.ranges);
    }

    pub fn get(&self, metric: &str) -> Option<&VitalRange> {
        self.ranges.get(metric)
    }

    pub fn insert(&mut self, metric: impl Into<String>, range: VitalRange) {
        self.ranges.insert(metric.into(), range);
    }
}
