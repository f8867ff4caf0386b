//! Cầu nối WASM <-> JavaScript cho thẻ khẩn cấp và phân loại chỉ số sống.

use healthkey_core::{
    EmergencyProfile, HealthKeyConfig, VitalMetric, VitalSigns, VitalStatus, VitalThresholds,
};
use healthkey_emergency::{share_card, EmergencyView, QrServerImage};
use healthkey_vitals::{
    message, Classifier, HealthScore, HealthScoreInputs, IntervalClassifier, ReadingReport,
    NORMAL_MESSAGE,
};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsHealthKeyConfig {
    #[serde(default)]
    viewer_url: Option<String>,
    #[serde(default)]
    qr_size: Option<u32>,
    #[serde(default)]
    critical_penalty: Option<u32>,
}

impl From<JsHealthKeyConfig> for HealthKeyConfig {
    fn from(cfg: JsHealthKeyConfig) -> Self {
        let mut base = HealthKeyConfig::default();
        if let Some(url) = cfg.viewer_url {
            base.viewer_url = url;
        }
        if let Some(size) = cfg.qr_size {
            base.qr_size = size;
        }
        if let Some(penalty) = cfg.critical_penalty {
            base.critical_penalty = penalty;
        }
        base
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsVitalStatus {
    status: VitalStatus,
    label: &'static str,
    color: &'static str,
    message: String,
}

/// Tạo token, link và URL ảnh QR cho hồ sơ khẩn cấp.
#[wasm_bindgen(js_name = encodeProfile)]
pub fn encode_profile(profile: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let profile: EmergencyProfile = from_value(profile)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được hồ sơ: {err}")))?;
    let cfg = read_config(config)?;

    let card = share_card(&profile, &cfg, &QrServerImage::from_config(&cfg))
        .map_err(|err| JsValue::from_str(&format!("Không tạo được link: {err}")))?;

    to_value(&card).map_err(|err| JsValue::from_str(&format!("Không serialize thẻ: {err}")))
}

/// Giải mã token; token hỏng trả về trạng thái `invalid`, không ném lỗi.
#[wasm_bindgen(js_name = decodeToken)]
pub fn decode_token(token: &str) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let view = EmergencyView::from_token(token);
    to_value(&view).map_err(|err| JsValue::from_str(&format!("Không serialize thẻ: {err}")))
}

/// Phân loại một chỉ số theo bảng ngưỡng (có thể ghi đè).
#[wasm_bindgen(js_name = classifyVital)]
pub fn classify_vital(
    metric: &str,
    value: f64,
    companion: Option<f64>,
    thresholds: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let classifier = IntervalClassifier::new(read_thresholds(thresholds)?);
    let (status, advice) = match metric.parse::<VitalMetric>() {
        Ok(parsed) => {
            let status = classifier.classify_metric(parsed, value, companion);
            (status, message(parsed, value, status))
        }
        Err(_) => (classifier.classify(metric, value), NORMAL_MESSAGE.to_string()),
    };

    let result = JsVitalStatus {
        status,
        label: status.label(),
        color: status.color(),
        message: advice,
    };
    to_value(&result).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

/// Phân loại toàn bộ một lần đo.
#[wasm_bindgen(js_name = classifyReading)]
pub fn classify_reading(reading: JsValue, thresholds: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let reading: VitalSigns = from_value(reading)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được lần đo: {err}")))?;
    let classifier = IntervalClassifier::new(read_thresholds(thresholds)?);
    let report = ReadingReport::classify(&reading, &classifier);

    to_value(&report).map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

#[wasm_bindgen(js_name = healthScore)]
pub fn health_score(inputs: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_panic_hook();

    let inputs: HealthScoreInputs = from_value(inputs)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu điểm: {err}")))?;
    let cfg = read_config(config)?;
    let score = HealthScore::from_config(&inputs, &cfg);

    to_value(&score).map_err(|err| JsValue::from_str(&format!("Không serialize điểm: {err}")))
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_config(config: Option<JsValue>) -> Result<HealthKeyConfig, JsValue> {
    match config {
        Some(js_cfg) => {
            let cfg: JsHealthKeyConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(HealthKeyConfig::from(cfg))
        }
        None => Ok(HealthKeyConfig::default()),
    }
}

fn read_thresholds(thresholds: Option<JsValue>) -> Result<VitalThresholds, JsValue> {
    let Some(js_thresholds) = thresholds else {
        return Ok(VitalThresholds::default());
    };

    let overrides: VitalThresholds = from_value(js_thresholds)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bảng ngưỡng: {err}")))?;
    let mut table = VitalThresholds::default();
    table.merge(overrides);
    Ok(table)
}
