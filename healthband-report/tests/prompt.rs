use std::fs;

use healthband_core::MetricRegistry;
use healthband_report::{
    build_prompt, lifestyle_context, summarize_log_str, PromptTemplate, ReportConfig,
};

#[test]
fn prompt_without_context_is_the_bare_template() {
    let prompt = build_prompt(PromptTemplate::FollowupQuestion, "");
    assert_eq!(prompt, PromptTemplate::FollowupQuestion.text());
}

#[test]
fn prompt_appends_additional_context() {
    let prompt = build_prompt(
        PromptTemplate::SymptomChecker,
        "Persistent cough and fever for 3 days.",
    );
    assert!(prompt.starts_with(PromptTemplate::SymptomChecker.text()));
    assert!(prompt.ends_with("Additional context: Persistent cough and fever for 3 days."));
}

#[test]
fn lifestyle_context_lists_every_classified_metric() {
    let fixture = format!("{}/tests/data/weekly_log.json", env!("CARGO_MANIFEST_DIR"));
    let log = fs::read_to_string(fixture).expect("fixture readable");
    let summary = summarize_log_str(&log, &MetricRegistry::default(), &ReportConfig::default())
        .expect("summary built");

    let context = lifestyle_context(&summary);
    assert!(context.starts_with("Health summary over the last 7 days:"));
    assert!(context.contains("- Heart Rate: 70 bpm (good)."));
    assert!(context.contains("- Activity: 135 min/week (warning)."));
}
