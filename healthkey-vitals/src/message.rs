use healthkey_core::{VitalMetric, VitalStatus};

pub const NORMAL_MESSAGE: &str = "Within normal range";

/// Advisory text for a classified reading.
pub fn message(metric: VitalMetric, value: f64, status: VitalStatus) -> String {
    let value = format_value(value);
    match (metric, status) {
        (_, VitalStatus::Normal) => NORMAL_MESSAGE.to_string(),

        (VitalMetric::HeartRate, VitalStatus::Elevated) => format!(
            "Heart rate of {value} bpm is outside the usual range. Rest and recheck in a few minutes."
        ),
        (VitalMetric::HeartRate, VitalStatus::Critical) => format!(
            "Heart rate of {value} bpm is at a critical level. Contact your doctor or emergency services."
        ),

        (
            VitalMetric::BloodPressure | VitalMetric::Systolic | VitalMetric::Diastolic,
            VitalStatus::Elevated,
        ) => "Blood pressure is elevated. Monitor closely and limit salt and caffeine.".to_string(),
        (
            VitalMetric::BloodPressure | VitalMetric::Systolic | VitalMetric::Diastolic,
            VitalStatus::Critical,
        ) => "Blood pressure is at a dangerous level. Seek medical attention immediately."
            .to_string(),

        (VitalMetric::Temperature, VitalStatus::Elevated) => format!(
            "Temperature of {value}°F is raised. Stay hydrated and keep monitoring."
        ),
        (VitalMetric::Temperature, VitalStatus::Critical) => format!(
            "Temperature of {value}°F needs medical attention."
        ),

        (VitalMetric::OxygenSaturation, VitalStatus::Elevated) => format!(
            "Oxygen saturation of {value}% is slightly low. Sit upright, breathe slowly and recheck."
        ),
        (VitalMetric::OxygenSaturation, VitalStatus::Critical) => format!(
            "Oxygen saturation of {value}% is critically low. Seek emergency care."
        ),

        (VitalMetric::RespiratoryRate, VitalStatus::Elevated) => format!(
            "Breathing rate of {value} breaths/min is outside the usual range. Rest and recheck."
        ),
        (VitalMetric::RespiratoryRate, VitalStatus::Critical) => format!(
            "Breathing rate of {value} breaths/min is at a critical level. Seek medical attention."
        ),

        (VitalMetric::Glucose, VitalStatus::Elevated) => format!(
            "Blood glucose of {value} mg/dL is above target. Review your meal plan and medication."
        ),
        (VitalMetric::Glucose, VitalStatus::Critical) => format!(
            "Blood glucose of {value} mg/dL is at a critical level. Follow your care plan and contact your doctor."
        ),

        (VitalMetric::Weight | VitalMetric::Height, _) => {
            format!("{} reading of {value} recorded.", metric.display_name())
        }
    }
}

/// Whole numbers without decimals, everything else with one decimal place.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
