use std::fs;

use chrono::{TimeZone, Utc};
use healthkey_core::{
    VitalMetric, VitalRange, VitalRanges, VitalSigns, VitalStatus, VitalThresholds,
};
use healthkey_vitals::{
    any_critical, check_in_score, critical_alerts, health_score, Classifier,
    DeviationClassifier, HealthScoreInputs, IntervalClassifier, ReadingLog, ReadingReport,
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(path).expect("Không đọc được dữ liệu mẫu")
}

fn load_log() -> ReadingLog {
    let readings: Vec<VitalSigns> =
        serde_json::from_str(&fixture("readings.json")).expect("Dữ liệu mẫu không hợp lệ");
    let mut log = ReadingLog::new();
    for reading in readings {
        log.record(reading).expect("Trùng id");
    }
    log
}

#[test]
fn interval_table_examples() {
    let classifier = IntervalClassifier::default();
    assert_eq!(classifier.classify("heartRate", 45.0), VitalStatus::Critical);
    assert_eq!(classifier.classify("heartRate", 75.0), VitalStatus::Normal);
    assert_eq!(classifier.classify("heartRate", 105.0), VitalStatus::Elevated);
    assert_eq!(
        classifier.classify_metric(VitalMetric::BloodPressure, 145.0, Some(85.0)),
        VitalStatus::Critical
    );
}

#[test]
fn deviation_table_examples() {
    let mut ranges = VitalRanges::empty();
    ranges.insert("bloodPressureSystolic", VitalRange::new(90.0, 140.0, "mmHg"));
    let classifier = DeviationClassifier::new(ranges);

    assert_eq!(
        classifier.classify("bloodPressureSystolic", 200.0),
        VitalStatus::Critical
    );
    assert_eq!(
        classifier.classify("bloodPressureSystolic", 150.0),
        VitalStatus::Elevated
    );
}

#[test]
fn reading_history_statuses() {
    let log = load_log();
    let classifier = IntervalClassifier::default();

    let worst: Vec<Option<VitalStatus>> = log
        .iter()
        .map(|reading| ReadingReport::classify(reading, &classifier).worst())
        .collect();
    assert_eq!(
        worst,
        vec![
            Some(VitalStatus::Normal),
            Some(VitalStatus::Elevated),
            Some(VitalStatus::Critical),
        ]
    );

    let latest = log.latest().expect("Có ít nhất một lần đo");
    let report = ReadingReport::classify(latest, &classifier);
    let alerts = critical_alerts(&report);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].display_value, "145/85");
}

#[test]
fn health_score_from_history() {
    let log = load_log();
    let classifier = IntervalClassifier::default();
    let now = Utc.with_ymd_and_hms(2026, 5, 10, 20, 0, 0).unwrap();

    let has_critical_vital = any_critical(log.iter(), &classifier);
    let check_in = check_in_score(log.timestamps(), now, 3);
    assert_eq!(check_in, 100.0);

    let inputs = HealthScoreInputs {
        medication_adherence: 100.0,
        profile_completeness: 100.0,
        check_in_frequency: check_in,
        has_critical_vital: false,
    };
    let calm = health_score(&inputs);
    let flagged = health_score(&HealthScoreInputs {
        has_critical_vital,
        ..inputs
    });

    assert_eq!(calm.total, 100);
    assert!(has_critical_vital);
    assert_eq!(flagged.total, 80);
}

#[test]
fn thresholds_override_from_file() {
    let thresholds = VitalThresholds::from_json_str(&fixture("pediatric_thresholds.json"))
        .expect("Không đọc được bảng ngưỡng");
    let classifier = IntervalClassifier::new(thresholds);

    assert_eq!(classifier.classify("heartRate", 115.0), VitalStatus::Normal);
    assert_eq!(classifier.classify("heartRate", 130.0), VitalStatus::Elevated);
    assert_eq!(classifier.classify("heartRate", 55.0), VitalStatus::Critical);
    assert_eq!(classifier.classify("glucose", 130.0), VitalStatus::Critical);
}
