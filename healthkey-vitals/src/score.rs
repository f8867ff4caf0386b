//! Aggregate wellness score.
//!
//! Sub-scores are percentages. They are weighted 40/30/30 and rounded first;
//! the critical-vital penalty is subtracted from the weighted total afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use healthkey_core::{EmergencyProfile, HealthKeyConfig};
use serde::{Deserialize, Serialize};

pub const ADHERENCE_WEIGHT: f64 = 0.4;
pub const COMPLETENESS_WEIGHT: f64 = 0.3;
pub const CHECK_IN_WEIGHT: f64 = 0.3;
pub const CRITICAL_VITAL_PENALTY: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreInputs {
    pub medication_adherence: f64,
    pub profile_completeness: f64,
    pub check_in_frequency: f64,
    #[serde(default)]
    pub has_critical_vital: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub total: u32,
    /// Weighted total before the penalty.
    pub weighted: u32,
    pub penalty: u32,
    pub medication_adherence: f64,
    pub profile_completeness: f64,
    pub check_in_frequency: f64,
}

pub fn health_score(inputs: &HealthScoreInputs) -> HealthScore {
    health_score_with_penalty(inputs, CRITICAL_VITAL_PENALTY)
}

impl HealthScore {
    pub fn from_config(inputs: &HealthScoreInputs, config: &HealthKeyConfig) -> Self {
        health_score_with_penalty(inputs, config.critical_penalty)
    }
}

pub fn health_score_with_penalty(inputs: &HealthScoreInputs, critical_penalty: u32) -> HealthScore {
    let adherence = clamp_percent(inputs.medication_adherence);
    let completeness = clamp_percent(inputs.profile_completeness);
    let check_in = clamp_percent(inputs.check_in_frequency);

    let weighted = (adherence * ADHERENCE_WEIGHT
        + completeness * COMPLETENESS_WEIGHT
        + check_in * CHECK_IN_WEIGHT)
        .round() as u32;
    let penalty = if inputs.has_critical_vital {
        critical_penalty
    } else {
        0
    };

    HealthScore {
        total: weighted.saturating_sub(penalty),
        weighted,
        penalty,
        medication_adherence: adherence,
        profile_completeness: completeness,
        check_in_frequency: check_in,
    }
}

/// Share of scheduled doses taken. No scheduled doses counts as full adherence.
pub fn adherence_score(taken: u32, scheduled: u32) -> f64 {
    if scheduled == 0 {
        return 100.0;
    }
    f64::from(taken.min(scheduled)) / f64::from(scheduled) * 100.0
}

/// Share of emergency-relevant profile fields that are filled in.
pub fn completeness_score(profile: &EmergencyProfile) -> f64 {
    let has_text = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    let has_contact = profile
        .emergency_contact
        .as_ref()
        .is_some_and(|contact| !contact.phone.trim().is_empty());

    let checks = [
        !profile.name.trim().is_empty(),
        profile.date_of_birth.is_some(),
        has_text(&profile.blood_type),
        !profile.allergies.is_empty(),
        !profile.conditions.is_empty(),
        !profile.medications.is_empty(),
        has_contact,
    ];

    let filled = checks.iter().filter(|filled| **filled).count();
    filled as f64 / checks.len() as f64 * 100.0
}

/// Share of the last `window_days` calendar days (today included) with at
/// least one reading taken no later than `now`.
pub fn check_in_score<I>(timestamps: I, now: DateTime<Utc>, window_days: u32) -> f64
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    if window_days == 0 {
        return 0.0;
    }

    let first_day = now
        .date_naive()
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .unwrap_or(NaiveDate::MIN);
    let days: BTreeSet<NaiveDate> = timestamps
        .into_iter()
        .filter(|ts| *ts <= now)
        .map(|ts| ts.date_naive())
        .filter(|day| *day >= first_day)
        .collect();

    days.len() as f64 / f64::from(window_days) * 100.0
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use healthkey_core::{EmergencyContact, Medication};

    use super::*;

    fn full_marks(has_critical_vital: bool) -> HealthScoreInputs {
        HealthScoreInputs {
            medication_adherence: 100.0,
            profile_completeness: 100.0,
            check_in_frequency: 100.0,
            has_critical_vital,
        }
    }

    #[test]
    fn full_marks_score_one_hundred() {
        assert_eq!(health_score(&full_marks(false)).total, 100);
    }

    #[test]
    fn critical_vital_deducts_after_weighting() {
        let score = health_score(&full_marks(true));
        assert_eq!(score.weighted, 100);
        assert_eq!(score.penalty, 20);
        assert_eq!(score.total, 80);
    }

    #[test]
    fn weights_are_forty_thirty_thirty() {
        let score = health_score(&HealthScoreInputs {
            medication_adherence: 50.0,
            profile_completeness: 100.0,
            check_in_frequency: 0.0,
            has_critical_vital: false,
        });
        assert_eq!(score.total, 50);
    }

    #[test]
    fn penalty_saturates_and_inputs_clamp() {
        let score = health_score(&HealthScoreInputs {
            medication_adherence: -40.0,
            profile_completeness: f64::NAN,
            check_in_frequency: 30.0,
            has_critical_vital: true,
        });
        assert_eq!(score.weighted, 9);
        assert_eq!(score.total, 0);

        let capped = health_score(&HealthScoreInputs {
            medication_adherence: 250.0,
            ..full_marks(false)
        });
        assert_eq!(capped.total, 100);
    }

    #[test]
    fn configured_penalty_is_used() {
        let config = HealthKeyConfig {
            critical_penalty: 35,
            ..HealthKeyConfig::default()
        };
        assert_eq!(HealthScore::from_config(&full_marks(true), &config).total, 65);
    }

    #[test]
    fn adherence_handles_empty_schedule() {
        assert_eq!(adherence_score(0, 0), 100.0);
        assert_eq!(adherence_score(3, 4), 75.0);
        assert_eq!(adherence_score(9, 4), 100.0);
    }

    #[test]
    fn completeness_counts_filled_fields() {
        assert_eq!(completeness_score(&EmergencyProfile::default()), 0.0);

        let profile = EmergencyProfile {
            name: "Lan Tran".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 9),
            blood_type: Some("O-".to_string()),
            allergies: vec!["Latex".to_string()],
            conditions: vec!["Asthma".to_string()],
            medications: vec![Medication {
                name: "Albuterol".to_string(),
                ..Medication::default()
            }],
            emergency_contact: Some(EmergencyContact {
                name: "Minh".to_string(),
                phone: "555-0100".to_string(),
                relationship: "Spouse".to_string(),
            }),
            notes: None,
        };
        assert_eq!(completeness_score(&profile), 100.0);
    }

    #[test]
    fn check_in_counts_distinct_days_in_window() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0).unwrap();
        let timestamps = vec![
            Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 8, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 20, 9, 0, 0).unwrap(),
        ];
        let score = check_in_score(timestamps, now, 4);
        assert_eq!(score, 50.0);
        assert_eq!(check_in_score(Vec::<DateTime<Utc>>::new(), now, 0), 0.0);
    }

    #[test]
    fn check_in_window_is_whole_calendar_days() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0).unwrap();
        // 8 May is outside a two-day window even though it is within 48 hours.
        let timestamps = vec![
            Utc.with_ymd_and_hms(2026, 5, 8, 20, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 9, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 10, 21, 0, 0).unwrap(),
        ];
        assert_eq!(check_in_score(timestamps, now, 2), 50.0);

        let daily: Vec<_> = (1..=10)
            .map(|day| Utc.with_ymd_and_hms(2026, 5, day, 6, 0, 0).unwrap())
            .collect();
        assert_eq!(check_in_score(daily, now, 7), 100.0);
        assert_eq!(check_in_score(Vec::<DateTime<Utc>>::new(), now, u32::MAX), 0.0);
    }
}
