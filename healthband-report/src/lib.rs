//! Backend log records to a classified dashboard summary.
//!
//! The REST backend returns plain JSON rows for vitals, activity, and diet
//! entries. This crate aggregates them over a recent window, runs every
//! registered metric through the band classifier, and produces the payload
//! the dashboard tiles and the medical-assistant prompt are built from.

use chrono::{DateTime, Utc};
use healthband_core::{evaluate, BandTag, MetricError, MetricRegistry, MetricValue};
use serde::{Deserialize, Serialize};

/// Tuning knobs for the summary window and healthy-plate targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Number of days around the most recent record that count as "current".
    pub window_days: u32,
    /// Recommended daily intake per healthy-plate food group.
    pub plate: PlateTargets,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            plate: PlateTargets::default(),
        }
    }
}

/// Daily targets the plate fill percentages are computed against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlateTargets {
    pub fruits_vegetables: f64,
    pub whole_grains: f64,
    pub proteins: f64,
}

impl Default for PlateTargets {
    fn default() -> Self {
        Self {
            fruits_vegetables: 5.0,
            whole_grains: 3.0,
            proteins: 50.0,
        }
    }
}

/// One vitals row as returned by the backend query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalsRecord {
    pub user_id: String,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    /// Raw "systolic/diastolic" string, exactly as logged.
    #[serde(default)]
    pub blood_pressure: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// One activity row (a single workout entry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    pub user_id: String,
    pub activity: String,
    pub minutes: f64,
    pub recorded_at: DateTime<Utc>,
}

/// One diet row (a day's intake per food group).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietRecord {
    pub user_id: String,
    #[serde(default)]
    pub fruits_vegetables: Option<f64>,
    #[serde(default)]
    pub whole_grains: Option<f64>,
    #[serde(default)]
    pub proteins: Option<f64>,
    #[serde(default)]
    pub sugars: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// The combined query response the dashboard works from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthLog {
    #[serde(default)]
    pub vitals: Vec<VitalsRecord>,
    #[serde(default)]
    pub activity: Vec<ActivityRecord>,
    #[serde(default)]
    pub diet: Vec<DietRecord>,
}

/// Classified display state for one dashboard tile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricStatus {
    pub metric_id: String,
    pub label: String,
    pub unit: Option<String>,
    /// Aggregate value over the window; `None` when nothing was logged.
    pub value: Option<MetricValue>,
    pub display: String,
    pub band: BandTag,
    pub color: String,
    pub message: String,
}

/// Healthy-plate fill state, 0-100 per food group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlateSummary {
    pub fruits_vegetables_pct: f64,
    pub whole_grains_pct: f64,
    pub proteins_pct: f64,
}

/// Final aggregation result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub window_days: u32,
    pub metrics: Vec<MetricStatus>,
    pub plate: PlateSummary,
}

impl DashboardSummary {
    /// Look up one tile by metric id.
    pub fn metric(&self, metric_id: &str) -> Option<&MetricStatus> {
        self.metrics
            .iter()
            .find(|status| status.metric_id == metric_id)
    }
}

const NO_RECENT_DATA: &str = "No recent readings logged for this period.";

/// Summarize a backend log from a JSON string.
pub fn summarize_log_str(
    log_json: &str,
    registry: &MetricRegistry,
    config: &ReportConfig,
) -> Result<DashboardSummary, MetricError> {
    let log: HealthLog =
        serde_json::from_str(log_json).map_err(|err| MetricError::Parse(err.to_string()))?;
    summarize_log(&log, registry, config)
}

/// Summarize an already-deserialized backend log.
pub fn summarize_log(
    log: &HealthLog,
    registry: &MetricRegistry,
    config: &ReportConfig,
) -> Result<DashboardSummary, MetricError> {
    if log.vitals.is_empty() && log.activity.is_empty() && log.diet.is_empty() {
        return Err(MetricError::MissingData);
    }

    let anchor = compute_anchor(log);
    let aggregates = Aggregates::collect(log, anchor, config.window_days);

    let mut metrics = Vec::with_capacity(registry.metrics().len());
    for definition in registry.metrics() {
        let status = match aggregates.value_for(&definition.id) {
            Some(value) => {
                let result = evaluate(registry, &definition.id, value)?;
                MetricStatus {
                    metric_id: definition.id.clone(),
                    label: definition.label.clone(),
                    unit: definition.unit.clone(),
                    value: Some(value),
                    display: display_for(&value, definition.unit.as_deref()),
                    band: result.band,
                    color: result.color,
                    message: result.message,
                }
            }
            // Nothing logged in the window: neutral warning state rather
            // than an error, so the tile still renders.
            None => MetricStatus {
                metric_id: definition.id.clone(),
                label: definition.label.clone(),
                unit: definition.unit.clone(),
                value: None,
                display: "--".to_string(),
                band: BandTag::Warning,
                color: BandTag::Warning.color().to_string(),
                message: NO_RECENT_DATA.to_string(),
            },
        };
        metrics.push(status);
    }

    let plate = PlateSummary {
        fruits_vegetables_pct: fill_percentage(
            aggregates.fruits_vegetables,
            config.plate.fruits_vegetables,
        ),
        whole_grains_pct: fill_percentage(aggregates.whole_grains, config.plate.whole_grains),
        proteins_pct: fill_percentage(aggregates.proteins, config.plate.proteins),
    };

    Ok(DashboardSummary {
        generated_at: Utc::now(),
        window_days: config.window_days,
        metrics,
        plate,
    })
}

/// Windowed aggregates, one slot per registered metric.
#[derive(Debug, Default)]
struct Aggregates {
    heart_rate: Option<f64>,
    blood_pressure: Option<(f64, f64)>,
    weight: Option<f64>,
    activity_minutes: Option<f64>,
    fruits_vegetables: Option<f64>,
    whole_grains: Option<f64>,
    proteins: Option<f64>,
    sugars: Option<f64>,
}

impl Aggregates {
    fn collect(log: &HealthLog, anchor: Option<DateTime<Utc>>, window_days: u32) -> Self {
        let mut aggregates = Self::default();

        let vitals: Vec<&VitalsRecord> = log
            .vitals
            .iter()
            .filter(|record| within_window(anchor, record.recorded_at, window_days))
            .collect();

        aggregates.heart_rate =
            mean(vitals.iter().filter_map(|record| record.heart_rate)).map(f64::round);
        aggregates.blood_pressure = mean_blood_pressure(&vitals);
        aggregates.weight = vitals
            .iter()
            .filter(|record| record.weight.is_some())
            .max_by_key(|record| record.recorded_at)
            .and_then(|record| record.weight);

        let activity_minutes: f64 = log
            .activity
            .iter()
            .filter(|record| within_window(anchor, record.recorded_at, window_days))
            .map(|record| record.minutes)
            .sum();
        let has_activity = log
            .activity
            .iter()
            .any(|record| within_window(anchor, record.recorded_at, window_days));
        aggregates.activity_minutes = has_activity.then_some(activity_minutes);

        let diet: Vec<&DietRecord> = log
            .diet
            .iter()
            .filter(|record| within_window(anchor, record.recorded_at, window_days))
            .collect();

        aggregates.fruits_vegetables =
            mean(diet.iter().filter_map(|record| record.fruits_vegetables));
        aggregates.whole_grains = mean(diet.iter().filter_map(|record| record.whole_grains));
        aggregates.proteins = mean(diet.iter().filter_map(|record| record.proteins));
        aggregates.sugars = mean(diet.iter().filter_map(|record| record.sugars));

        aggregates
    }

    fn value_for(&self, metric_id: &str) -> Option<MetricValue> {
        match metric_id {
            "heartRate" => self.heart_rate.map(MetricValue::Scalar),
            "bloodPressure" => {
                self.blood_pressure
                    .map(|(systolic, diastolic)| MetricValue::BloodPressure {
                        systolic,
                        diastolic,
                    })
            }
            "weight" => self.weight.map(MetricValue::Scalar),
            "activityMinutes" => self.activity_minutes.map(MetricValue::Scalar),
            "fruitsVegetables" => self.fruits_vegetables.map(MetricValue::Scalar),
            "wholeGrains" => self.whole_grains.map(MetricValue::Scalar),
            "proteins" => self.proteins.map(MetricValue::Scalar),
            "sugars" => self.sugars.map(MetricValue::Scalar),
            _ => None,
        }
    }
}

fn compute_anchor(log: &HealthLog) -> Option<DateTime<Utc>> {
    let vitals = log.vitals.iter().map(|record| record.recorded_at);
    let activity = log.activity.iter().map(|record| record.recorded_at);
    let diet = log.diet.iter().map(|record| record.recorded_at);
    vitals.chain(activity).chain(diet).max()
}

fn within_window(anchor: Option<DateTime<Utc>>, recorded_at: DateTime<Utc>, days: u32) -> bool {
    let Some(anchor) = anchor else {
        return true;
    };
    let delta_days = anchor.signed_duration_since(recorded_at).num_days();
    delta_days.abs() <= days as i64
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Average the parseable "sys/dia" strings; malformed entries are logged
/// and skipped so one bad row cannot sink the whole summary.
fn mean_blood_pressure(vitals: &[&VitalsRecord]) -> Option<(f64, f64)> {
    let mut systolic_sum = 0.0;
    let mut diastolic_sum = 0.0;
    let mut count = 0usize;

    for record in vitals {
        let Some(raw) = record.blood_pressure.as_deref() else {
            continue;
        };
        match MetricValue::parse_blood_pressure(raw) {
            Ok(MetricValue::BloodPressure {
                systolic,
                diastolic,
            }) => {
                systolic_sum += systolic;
                diastolic_sum += diastolic;
                count += 1;
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("skipping unreadable blood pressure entry {raw:?}: {err}");
            }
        }
    }

    (count > 0).then(|| {
        (
            (systolic_sum / count as f64).round(),
            (diastolic_sum / count as f64).round(),
        )
    })
}

fn fill_percentage(actual: Option<f64>, target: f64) -> f64 {
    let Some(actual) = actual else {
        return 0.0;
    };
    if target <= 0.0 {
        return 0.0;
    }
    (actual / target * 100.0).min(100.0)
}

fn display_for(value: &MetricValue, unit: Option<&str>) -> String {
    let body = match value {
        MetricValue::Scalar(scalar) => format_value(*scalar),
        composite @ MetricValue::BloodPressure { .. } => composite.to_string(),
    };
    match unit {
        Some(unit) => format!("{body} {unit}"),
        None => body,
    }
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Prompt templates that steer the remote medical-assistant model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    SymptomChecker,
    LifestyleSummary,
    FollowupQuestion,
    TreatmentRecommendation,
    GeneralConversation,
}

impl PromptTemplate {
    pub fn text(self) -> &'static str {
        match self {
            PromptTemplate::SymptomChecker => {
                "You are a knowledgeable and empathetic medical assistant. \
                 Given the patient's current symptoms and historical medical records, \
                 please provide a thoughtful evaluation of the top three possible causes \
                 for these symptoms concisely. Take note of the user's choice of language. \
                 Highlight if it is a medical emergency! Explain each possibility clearly, \
                 in layman language and kindly in simple terms. The patient's symptoms are:"
            }
            PromptTemplate::LifestyleSummary => {
                "You are a medical professional with experience in sports and health \
                 coaching. Given the patient's activity levels and vitals record, evaluate \
                 the health of the patient and suggest improvements in a friendly and \
                 caring manner like an engaging conversation, not too wordy. Take into \
                 account the user's choice of language, use normal layman language and \
                 the following prompt:"
            }
            PromptTemplate::FollowupQuestion => {
                "You are a caring assistant. Based on the patient's information, \
                 generate one specific follow-up question to gather more details about \
                 their condition."
            }
            PromptTemplate::TreatmentRecommendation => {
                "You are a well-informed medical consultant. Based on the patient's \
                 symptoms and medical history, suggest three potential treatment options, \
                 explain each option briefly, and note any important precautions."
            }
            PromptTemplate::GeneralConversation => {
                "You are a warm, empathetic friend. When the topic of loneliness arises, \
                 avoid default apologies like \"I'm sorry.\" Instead, validate the user's \
                 feelings and provide supportive, understanding responses, and share \
                 thoughtful insights or gentle suggestions to help them feel cared for \
                 and encouraged."
            }
        }
    }
}

/// Assemble the final prompt, appending caller context when present.
pub fn build_prompt(template: PromptTemplate, additional_context: &str) -> String {
    if additional_context.is_empty() {
        template.text().to_string()
    } else {
        format!(
            "{}\n\nAdditional context: {}",
            template.text(),
            additional_context
        )
    }
}

/// Render the classified summary into the context block consumed by the
/// lifestyle-summary prompt.
pub fn lifestyle_context(summary: &DashboardSummary) -> String {
    let mut lines = vec![format!(
        "Health summary over the last {} days:",
        summary.window_days
    )];
    for status in &summary.metrics {
        lines.push(format!(
            "- {}: {} ({}). {}",
            status.label, status.display, status.band, status.message
        ));
    }
    lines.join("\n")
}
