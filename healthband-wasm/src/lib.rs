//! Bridge WASM <-> JavaScript trung lập framework.

use healthband_core::{evaluate, MetricError, MetricRegistry, MetricValue};
use healthband_report::{summarize_log, HealthLog, PlateTargets, ReportConfig};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsReportConfig {
    #[serde(default)]
    window_days: Option<u32>,
    #[serde(default)]
    plate: Option<JsPlateTargets>,
}

#[derive(Deserialize)]
struct JsPlateTargets {
    #[serde(default)]
    fruits_vegetables: Option<f64>,
    #[serde(default)]
    whole_grains: Option<f64>,
    #[serde(default)]
    proteins: Option<f64>,
}

impl From<JsReportConfig> for ReportConfig {
    fn from(cfg: JsReportConfig) -> Self {
        let mut base = ReportConfig::default();
        if let Some(days) = cfg.window_days {
            base.window_days = days;
        }
        if let Some(plate) = cfg.plate {
            let defaults = PlateTargets::default();
            base.plate = PlateTargets {
                fruits_vegetables: plate.fruits_vegetables.unwrap_or(defaults.fruits_vegetables),
                whole_grains: plate.whole_grains.unwrap_or(defaults.whole_grains),
                proteins: plate.proteins.unwrap_or(defaults.proteins),
            };
        }
        base
    }
}

/// Phân loại một giá trị chỉ số; `value` là số hoặc `{systolic, diastolic}`.
#[wasm_bindgen]
pub fn evaluate_metric(metric_id: &str, value: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let value = from_value::<MetricValue>(value)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được giá trị chỉ số: {err}")))?;

    let registry = MetricRegistry::default();
    let result =
        evaluate(&registry, metric_id, value).map_err(|err| JsValue::from_str(&format_error(err)))?;

    to_value(&result).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Tổng hợp nhật ký sức khỏe thành bảng điều khiển đã phân loại.
#[wasm_bindgen]
pub fn summarize_health_log(
    input_log: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let log = from_value::<HealthLog>(input_log)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON nhật ký: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsReportConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            ReportConfig::from(cfg)
        }
        None => ReportConfig::default(),
    };

    let registry = MetricRegistry::default();
    let summary = summarize_log(&log, &registry, &cfg)
        .map_err(|err| JsValue::from_str(&format_error(err)))?;

    to_value(&summary)
        .map_err(|err| JsValue::from_str(&format!("Không serialize summary: {err}")))
}

fn format_error(err: MetricError) -> String {
    format!("Healthband error: {err}")
}
