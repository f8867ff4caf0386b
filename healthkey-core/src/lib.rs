//! Mô hình dữ liệu lõi cho thẻ sức khỏe khẩn cấp và phân loại chỉ số sống.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

mod thresholds;

pub use thresholds::{Interval, MetricThresholds, VitalRange, VitalRanges, VitalThresholds};

/// Cấu hình dùng chung cho codec, bộ phân loại và điểm sức khỏe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthKeyConfig {
    /// Trang xem thẻ khẩn cấp (không cần đăng nhập).
    pub viewer_url: String,
    /// Kích thước ảnh QR (pixel, hình vuông).
    pub qr_size: u32,
    /// Số ngày tính tần suất check-in.
    pub check_in_window_days: u32,
    /// Ngưỡng độ lệch tương đối coi là nguy kịch (bảng range cũ).
    pub deviation_critical_ratio: f64,
    /// Điểm trừ cố định khi có chỉ số nguy kịch.
    pub critical_penalty: u32,
}

impl Default for HealthKeyConfig {
    fn default() -> Self {
        Self {
            viewer_url: "https://healthkey.app/emergency".to_string(),
            qr_size: 300,
            check_in_window_days: 7,
            deviation_critical_ratio: 0.3,
            critical_penalty: 20,
        }
    }
}

impl HealthKeyConfig {
    /// Đọc cấu hình JSON; trường thiếu giữ giá trị mặc định.
    pub fn from_json_str(input: &str) -> Result<Self, HealthKeyError> {
        serde_json::from_str(input).map_err(|err| HealthKeyError::Config(err.to_string()))
    }
}

/// Mức độ của một chỉ số sống. Thứ tự: `Normal < Elevated < Critical`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VitalStatus {
    Normal,
    #[serde(alias = "warning")]
    Elevated,
    Critical,
}

impl VitalStatus {
    /// Mức nặng hơn trong hai mức.
    pub fn worst(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn is_critical(self) -> bool {
        self == Self::Critical
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::Critical => "Critical",
        }
    }

    /// Mã màu hiển thị trên dashboard.
    pub fn color(self) -> &'static str {
        match self {
            Self::Normal => "green",
            Self::Elevated => "amber",
            Self::Critical => "red",
        }
    }
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Các chỉ số sống được theo dõi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum VitalMetric {
    HeartRate,
    #[serde(rename = "bloodPressureSystolic")]
    Systolic,
    #[serde(rename = "bloodPressureDiastolic")]
    Diastolic,
    /// Chỉ số ghép: tâm thu + tâm trương.
    BloodPressure,
    Temperature,
    OxygenSaturation,
    RespiratoryRate,
    Glucose,
    Weight,
    Height,
}

impl VitalMetric {
    pub const ALL: [VitalMetric; 10] = [
        VitalMetric::HeartRate,
        VitalMetric::Systolic,
        VitalMetric::Diastolic,
        VitalMetric::BloodPressure,
        VitalMetric::Temperature,
        VitalMetric::OxygenSaturation,
        VitalMetric::RespiratoryRate,
        VitalMetric::Glucose,
        VitalMetric::Weight,
        VitalMetric::Height,
    ];

    /// Khóa ổn định dùng trong bảng ngưỡng và JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::HeartRate => "heartRate",
            Self::Systolic => "bloodPressureSystolic",
            Self::Diastolic => "bloodPressureDiastolic",
            Self::BloodPressure => "bloodPressure",
            Self::Temperature => "temperature",
            Self::OxygenSaturation => "oxygenSaturation",
            Self::RespiratoryRate => "respiratoryRate",
            Self::Glucose => "glucose",
            Self::Weight => "weight",
            Self::Height => "height",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::HeartRate => "Heart rate",
            Self::Systolic => "Systolic blood pressure",
            Self::Diastolic => "Diastolic blood pressure",
            Self::BloodPressure => "Blood pressure",
            Self::Temperature => "Temperature",
            Self::OxygenSaturation => "Oxygen saturation",
            Self::RespiratoryRate => "Respiratory rate",
            Self::Glucose => "Blood glucose",
            Self::Weight => "Weight",
            Self::Height => "Height",
        }
    }

    pub fn default_unit(self) -> &'static str {
        match self {
            Self::HeartRate => "bpm",
            Self::Systolic | Self::Diastolic | Self::BloodPressure => "mmHg",
            Self::Temperature => "°F",
            Self::OxygenSaturation => "%",
            Self::RespiratoryRate => "breaths/min",
            Self::Glucose => "mg/dL",
            Self::Weight => "lbs",
            Self::Height => "in",
        }
    }

    /// Chỉ số có được phân loại mức độ hay không (cân nặng, chiều cao thì không).
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Weight | Self::Height)
    }
}

impl fmt::Display for VitalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VitalMetric {
    type Err = HealthKeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        let metric = match normalized.as_str() {
            "heartrate" | "pulse" | "hr" => Self::HeartRate,
            "bloodpressuresystolic" | "systolic" => Self::Systolic,
            "bloodpressurediastolic" | "diastolic" => Self::Diastolic,
            "bloodpressure" | "bp" => Self::BloodPressure,
            "temperature" | "temp" => Self::Temperature,
            "oxygensaturation" | "spo2" => Self::OxygenSaturation,
            "respiratoryrate" | "rr" => Self::RespiratoryRate,
            "glucose" | "bloodglucose" => Self::Glucose,
            "weight" => Self::Weight,
            "height" => Self::Height,
            _ => return Err(HealthKeyError::UnknownMetric(input.to_string())),
        };
        Ok(metric)
    }
}

/// Một lần ghi nhận chỉ số sống. Chỉ thay đổi qua thao tác cập nhật tường minh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub id: String,
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub systolic: Option<f64>,
    #[serde(default)]
    pub diastolic: Option<f64>,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub oxygen_saturation: Option<f64>,
    #[serde(default)]
    pub respiratory_rate: Option<f64>,
    #[serde(default)]
    pub glucose: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VitalSigns {
    /// Giá trị của một chỉ số đơn. Chỉ số ghép trả về `None`.
    pub fn value(&self, metric: VitalMetric) -> Option<f64> {
        match metric {
            VitalMetric::HeartRate => self.heart_rate,
            VitalMetric::Systolic => self.systolic,
            VitalMetric::Diastolic => self.diastolic,
            VitalMetric::BloodPressure => None,
            VitalMetric::Temperature => self.temperature,
            VitalMetric::OxygenSaturation => self.oxygen_saturation,
            VitalMetric::RespiratoryRate => self.respiratory_rate,
            VitalMetric::Glucose => self.glucose,
            VitalMetric::Weight => self.weight,
            VitalMetric::Height => self.height,
        }
    }

    /// Cặp huyết áp khi có đủ cả hai giá trị.
    pub fn blood_pressure(&self) -> Option<(f64, f64)> {
        Some((self.systolic?, self.diastolic?))
    }

    pub fn is_empty(&self) -> bool {
        VitalMetric::ALL
            .iter()
            .all(|metric| self.value(*metric).is_none())
    }
}

/// Thuốc đang dùng trong hồ sơ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

/// Người liên hệ khẩn cấp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub relationship: String,
}

/// Phần hồ sơ y tế liên quan tới thẻ khẩn cấp. Mọi trường đều có thể trống.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyProfile {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub medications: Vec<Medication>,
    pub emergency_contact: Option<EmergencyContact>,
    pub notes: Option<String>,
}

/// Bản ghi phẳng nhúng trong liên kết khẩn cấp. Các danh sách nối bằng dấu phẩy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyPayload {
    pub name: String,
    pub dob: String,
    pub blood_type: String,
    pub allergies: String,
    pub conditions: String,
    pub medications: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub emergency_contact_relationship: String,
    pub notes: String,
    pub generated_at: DateTime<Utc>,
}

impl EmergencyPayload {
    /// Dựng bản ghi từ hồ sơ hiện tại tại thời điểm chia sẻ.
    pub fn from_profile(profile: &EmergencyProfile, generated_at: DateTime<Utc>) -> Self {
        let contact = profile.emergency_contact.clone().unwrap_or_default();
        Self {
            name: profile.name.clone(),
            dob: profile
                .date_of_birth
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            blood_type: profile.blood_type.clone().unwrap_or_default(),
            allergies: join_list(&profile.allergies),
            conditions: join_list(&profile.conditions),
            medications: join_list(profile.medications.iter().map(|med| med.name.as_str())),
            emergency_contact_name: contact.name,
            emergency_contact_phone: contact.phone,
            emergency_contact_relationship: contact.relationship,
            notes: profile.notes.clone().unwrap_or_default(),
            generated_at,
        }
    }

    pub fn allergy_list(&self) -> Vec<String> {
        split_list(&self.allergies)
    }

    pub fn condition_list(&self) -> Vec<String> {
        split_list(&self.conditions)
    }

    pub fn medication_list(&self) -> Vec<String> {
        split_list(&self.medications)
    }
}

/// Nối danh sách thành chuỗi phân cách bởi dấu phẩy, bỏ phần tử rỗng.
///
/// Phần tử chứa dấu phẩy sẽ bị tách đôi khi đọc lại.
pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Tách chuỗi phân cách bởi dấu phẩy, cắt khoảng trắng, bỏ phần tử rỗng.
pub fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lỗi chung của lõi.
#[derive(Debug, thiserror::Error)]
pub enum HealthKeyError {
    #[error("Không nhận diện được chỉ số: {0}")]
    UnknownMetric(String),
    #[error("Không đọc được cấu hình: {0}")]
    Config(String),
}
