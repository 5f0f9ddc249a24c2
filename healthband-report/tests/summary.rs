use std::fs;

use chrono::{TimeZone, Utc};
use healthband_core::{BandTag, MetricError, MetricRegistry, MetricValue};
use healthband_report::{
    summarize_log, summarize_log_str, ActivityRecord, HealthLog, ReportConfig, VitalsRecord,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn weekly_summary() -> healthband_report::DashboardSummary {
    let log = fs::read_to_string(fixture_path("weekly_log.json")).expect("fixture readable");
    summarize_log_str(&log, &MetricRegistry::default(), &ReportConfig::default())
        .expect("summary built")
}

#[test]
fn weekly_log_classifies_every_metric() {
    let summary = weekly_summary();
    assert_eq!(summary.window_days, 7);
    assert_eq!(summary.metrics.len(), MetricRegistry::default().metrics().len());

    let heart_rate = summary.metric("heartRate").unwrap();
    assert_eq!(heart_rate.value, Some(MetricValue::Scalar(70.0)));
    assert_eq!(heart_rate.display, "70 bpm");
    assert_eq!(heart_rate.band, BandTag::Good);
    assert_eq!(heart_rate.color, "#4ade80");

    let blood_pressure = summary.metric("bloodPressure").unwrap();
    assert_eq!(blood_pressure.display, "120/76 mmHg");
    assert_eq!(blood_pressure.band, BandTag::Good);

    let weight = summary.metric("weight").unwrap();
    assert_eq!(weight.value, Some(MetricValue::Scalar(77.4)));
    assert_eq!(weight.display, "77.4 kg");
    assert_eq!(weight.band, BandTag::Good);

    let activity = summary.metric("activityMinutes").unwrap();
    assert_eq!(activity.value, Some(MetricValue::Scalar(135.0)));
    assert_eq!(activity.display, "135 min/week");
    assert_eq!(activity.band, BandTag::Warning);

    let whole_grains = summary.metric("wholeGrains").unwrap();
    assert_eq!(whole_grains.display, "2.5 servings");
    assert_eq!(whole_grains.band, BandTag::Warning);

    let sugars = summary.metric("sugars").unwrap();
    assert_eq!(sugars.value, Some(MetricValue::Scalar(25.0)));
    assert_eq!(sugars.band, BandTag::Good);
}

#[test]
fn weekly_log_ignores_records_outside_window() {
    // The January vitals row (150 bpm, 180/110) would drag both averages
    // into warning territory if it were counted.
    let summary = weekly_summary();
    assert_eq!(summary.metric("heartRate").unwrap().band, BandTag::Good);
    assert_eq!(summary.metric("bloodPressure").unwrap().band, BandTag::Good);
}

#[test]
fn plate_fill_is_capped_at_one_hundred() {
    let summary = weekly_summary();

    // Six servings against a target of five still reads as a full section.
    assert_eq!(summary.plate.fruits_vegetables_pct, 100.0);
    assert_eq!(summary.plate.proteins_pct, 100.0);
    assert!((summary.plate.whole_grains_pct - 250.0 / 3.0).abs() < 1e-9);
}

#[test]
fn metrics_without_records_fall_back_to_neutral_warning() {
    let log = HealthLog {
        activity: vec![ActivityRecord {
            user_id: "5".to_string(),
            activity: "Run".to_string(),
            minutes: 200.0,
            recorded_at: Utc.with_ymd_and_hms(2025, 2, 28, 18, 0, 0).unwrap(),
        }],
        ..HealthLog::default()
    };

    let summary =
        summarize_log(&log, &MetricRegistry::default(), &ReportConfig::default()).unwrap();

    let activity = summary.metric("activityMinutes").unwrap();
    assert_eq!(activity.band, BandTag::Good);

    let heart_rate = summary.metric("heartRate").unwrap();
    assert_eq!(heart_rate.value, None);
    assert_eq!(heart_rate.band, BandTag::Warning);
    assert_eq!(heart_rate.display, "--");
    assert_eq!(
        heart_rate.message,
        "No recent readings logged for this period."
    );
}

#[test]
fn malformed_blood_pressure_rows_are_skipped() {
    let recorded_at = Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap();
    let vitals = |blood_pressure: &str| VitalsRecord {
        user_id: "5".to_string(),
        heart_rate: None,
        blood_pressure: Some(blood_pressure.to_string()),
        weight: None,
        recorded_at,
    };
    let log = HealthLog {
        vitals: vec![vitals("not-a-reading"), vitals("120/80")],
        ..HealthLog::default()
    };

    let summary =
        summarize_log(&log, &MetricRegistry::default(), &ReportConfig::default()).unwrap();
    let blood_pressure = summary.metric("bloodPressure").unwrap();
    assert_eq!(blood_pressure.display, "120/80 mmHg");
    assert_eq!(blood_pressure.band, BandTag::Good);
}

#[test]
fn empty_log_is_rejected() {
    let result = summarize_log(
        &HealthLog::default(),
        &MetricRegistry::default(),
        &ReportConfig::default(),
    );
    assert!(matches!(result, Err(MetricError::MissingData)));
}

#[test]
fn unreadable_json_is_a_parse_error() {
    let result = summarize_log_str(
        "{ definitely not json",
        &MetricRegistry::default(),
        &ReportConfig::default(),
    );
    assert!(matches!(result, Err(MetricError::Parse(_))));
}
