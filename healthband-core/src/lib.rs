//! Logic lõi phân loại chỉ số sức khỏe theo bảng ngưỡng.

use serde::{Deserialize, Serialize};

/// Ba mức đánh giá của một chỉ số.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BandTag {
    Good,
    Warning,
    Danger,
}

impl BandTag {
    /// Mã màu hiển thị cố định, không phụ thuộc chỉ số.
    pub fn color(self) -> &'static str {
        match self {
            BandTag::Good => "#4ade80",
            BandTag::Warning => "#facc15",
            BandTag::Danger => "#ef4444",
        }
    }
}

impl std::fmt::Display for BandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandTag::Good => write!(f, "good"),
            BandTag::Warning => write!(f, "warning"),
            BandTag::Danger => write!(f, "danger"),
        }
    }
}

/// Khoảng giá trị đóng `[low, high]`; `high` có thể là vô cực.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Khoảng của một mức: vô hướng hoặc cặp huyết áp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BandRange {
    Scalar(Range),
    BloodPressure { systolic: Range, diastolic: Range },
}

impl BandRange {
    fn scalar(&self) -> Option<&Range> {
        match self {
            BandRange::Scalar(range) => Some(range),
            BandRange::BloodPressure { .. } => None,
        }
    }
}

/// Một mức của chỉ số kèm thông điệp hiển thị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub tag: BandTag,
    pub range: BandRange,
    pub message: String,
}

/// Định nghĩa một chỉ số theo dõi được.
///
/// Bất biến: đúng một mức cho mỗi `BandTag`, xếp theo thứ tự
/// good, warning, danger. Thứ tự này quyết định cách xử lý các
/// khoảng chồng lấn ở biên.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDefinition {
    pub id: String,
    pub label: String,
    pub unit: Option<String>,
    pub higher_is_better: bool,
    pub bands: Vec<Band>,
}

impl MetricDefinition {
    /// Chỉ số tổng hợp (huyết áp) gồm hai thành phần.
    pub fn is_composite(&self) -> bool {
        self.bands
            .first()
            .map(|band| matches!(band.range, BandRange::BloodPressure { .. }))
            .unwrap_or(false)
    }

    /// Tra mức theo nhãn.
    pub fn band(&self, tag: BandTag) -> Result<&Band, MetricError> {
        self.bands
            .iter()
            .find(|band| band.tag == tag)
            .ok_or_else(|| MetricError::UnknownBand(self.id.clone(), tag))
    }
}

/// Giá trị quan sát được của một chỉ số.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    BloodPressure { systolic: f64, diastolic: f64 },
}

impl MetricValue {
    /// Đọc chuỗi huyết áp dạng `"120/80"`.
    pub fn parse_blood_pressure(text: &str) -> Result<Self, MetricError> {
        let (sys, dia) = text
            .trim()
            .split_once('/')
            .ok_or_else(|| MetricError::InvalidValue(format!("chuỗi huyết áp: {text}")))?;
        let systolic = sys
            .trim()
            .parse::<f64>()
            .map_err(|_| MetricError::InvalidValue(format!("tâm thu: {sys}")))?;
        let diastolic = dia
            .trim()
            .parse::<f64>()
            .map_err(|_| MetricError::InvalidValue(format!("tâm trương: {dia}")))?;
        Ok(MetricValue::BloodPressure {
            systolic,
            diastolic,
        })
    }

    fn is_finite(&self) -> bool {
        match self {
            MetricValue::Scalar(value) => value.is_finite(),
            MetricValue::BloodPressure {
                systolic,
                diastolic,
            } => systolic.is_finite() && diastolic.is_finite(),
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Scalar(value) => write!(f, "{value}"),
            MetricValue::BloodPressure {
                systolic,
                diastolic,
            } => write!(f, "{systolic:.0}/{diastolic:.0}"),
        }
    }
}

/// Kết quả tra cứu hiển thị cho một lần phân loại.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub band: BandTag,
    pub color: String,
    pub message: String,
}

/// Lỗi của thư viện phân loại. Tất cả đều khôi phục được tại nơi gọi.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("Chỉ số chưa được đăng ký: {0}")]
    UnknownMetric(String),
    #[error("Chỉ số {0} thiếu mức {1}")]
    UnknownBand(String, BandTag),
    #[error("Giá trị không hợp lệ: {0}")]
    InvalidValue(String),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Dữ liệu đầu vào thiếu thông tin tối thiểu")]
    MissingData,
}

/// Bảng ngưỡng bất biến cho mọi chỉ số đã biết.
///
/// Khởi tạo một lần lúc bắt đầu rồi truyền tham chiếu vào
/// `classify`/`resolve`; không có thao tác ghi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRegistry {
    metrics: Vec<MetricDefinition>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MetricRegistry {
    /// Tra định nghĩa theo id.
    pub fn definition(&self, metric_id: &str) -> Result<&MetricDefinition, MetricError> {
        self.metrics
            .iter()
            .find(|metric| metric.id == metric_id)
            .ok_or_else(|| MetricError::UnknownMetric(metric_id.to_string()))
    }

    /// Duyệt các chỉ số theo thứ tự đăng ký.
    pub fn metrics(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    /// Bảng ngưỡng mặc định của ứng dụng.
    pub fn builtin() -> Self {
        let metrics = vec![
            scalar_metric(
                "heartRate",
                "Heart Rate",
                Some("bpm"),
                true,
                (60.0, 80.0, "Resting heart rate is in the healthy range."),
                (
                    50.0,
                    90.0,
                    "Resting heart rate is slightly outside the ideal range. Worth keeping an eye on.",
                ),
                (
                    0.0,
                    200.0,
                    "Resting heart rate is well outside the expected range. Consider checking in with a doctor.",
                ),
            ),
            blood_pressure_metric(),
            scalar_metric(
                "weight",
                "Weight",
                Some("kg"),
                true,
                (50.0, 80.0, "Weight is within the healthy range."),
                (
                    45.0,
                    90.0,
                    "Weight is drifting outside the healthy range. Small diet and activity changes can help.",
                ),
                (
                    0.0,
                    150.0,
                    "Weight is far outside the healthy range. A check-up is recommended.",
                ),
            ),
            scalar_metric(
                "activityMinutes",
                "Activity",
                Some("min/week"),
                true,
                (
                    150.0,
                    f64::INFINITY,
                    "Great job! You are meeting the recommended 150 minutes of activity per week.",
                ),
                (
                    75.0,
                    150.0,
                    "You are partway to the recommended 150 minutes of weekly activity. Keep going!",
                ),
                (
                    0.0,
                    75.0,
                    "Activity is well below the recommended level. Try adding a short daily walk.",
                ),
            ),
            scalar_metric(
                "fruitsVegetables",
                "Fruits & Vegetables",
                Some("servings"),
                true,
                (
                    5.0,
                    f64::INFINITY,
                    "You are hitting the recommended servings of fruits and vegetables.",
                ),
                (
                    2.0,
                    5.0,
                    "A few more servings of fruits and vegetables would round out your plate.",
                ),
                (
                    0.0,
                    2.0,
                    "Very few fruits and vegetables logged. Aim for five servings a day.",
                ),
            ),
            scalar_metric(
                "wholeGrains",
                "Whole Grains",
                Some("servings"),
                true,
                (3.0, f64::INFINITY, "Whole grain intake looks good."),
                (
                    1.0,
                    3.0,
                    "Adding another serving of whole grains would help.",
                ),
                (
                    0.0,
                    1.0,
                    "Almost no whole grains logged. Swap refined grains for whole grains where you can.",
                ),
            ),
            scalar_metric(
                "proteins",
                "Proteins",
                Some("g"),
                true,
                (50.0, f64::INFINITY, "Protein intake meets the daily target."),
                (
                    30.0,
                    50.0,
                    "Protein intake is a little low. Lean meat, beans, or tofu can top it up.",
                ),
                (0.0, 30.0, "Protein intake is well below the daily target."),
            ),
            scalar_metric(
                "sugars",
                "Sugars",
                Some("g"),
                false,
                (
                    0.0,
                    25.0,
                    "Sugar intake is within the recommended daily limit.",
                ),
                (
                    0.0,
                    40.0,
                    "Sugar intake is above the recommended limit. Sweet drinks are the usual culprit.",
                ),
                (
                    0.0,
                    f64::INFINITY,
                    "Sugar intake is far above the recommended limit. Consider cutting back.",
                ),
            ),
        ];

        Self { metrics }
    }
}

fn scalar_metric(
    id: &str,
    label: &str,
    unit: Option<&str>,
    higher_is_better: bool,
    good: (f64, f64, &str),
    warning: (f64, f64, &str),
    danger: (f64, f64, &str),
) -> MetricDefinition {
    let band = |tag, (low, high, message): (f64, f64, &str)| Band {
        tag,
        range: BandRange::Scalar(Range::new(low, high)),
        message: message.to_string(),
    };

    MetricDefinition {
        id: id.to_string(),
        label: label.to_string(),
        unit: unit.map(str::to_string),
        higher_is_better,
        bands: vec![
            band(BandTag::Good, good),
            band(BandTag::Warning, warning),
            band(BandTag::Danger, danger),
        ],
    }
}

fn blood_pressure_metric() -> MetricDefinition {
    let band = |tag, systolic: (f64, f64), diastolic: (f64, f64), message: &str| Band {
        tag,
        range: BandRange::BloodPressure {
            systolic: Range::new(systolic.0, systolic.1),
            diastolic: Range::new(diastolic.0, diastolic.1),
        },
        message: message.to_string(),
    };

    MetricDefinition {
        id: "bloodPressure".to_string(),
        label: "Blood Pressure".to_string(),
        unit: Some("mmHg".to_string()),
        higher_is_better: true,
        bands: vec![
            band(
                BandTag::Good,
                (90.0, 120.0),
                (60.0, 80.0),
                "Blood pressure is in the normal range.",
            ),
            band(
                BandTag::Warning,
                (120.0, 139.0),
                (80.0, 89.0),
                "Blood pressure is elevated. Cutting back on salt and re-checking in a few days can help.",
            ),
            band(
                BandTag::Danger,
                (0.0, 250.0),
                (0.0, 150.0),
                "Blood pressure is outside the safe range. Please consult a healthcare professional.",
            ),
        ],
    }
}

/// Xếp giá trị quan sát vào một mức.
pub fn classify(
    registry: &MetricRegistry,
    metric_id: &str,
    value: MetricValue,
) -> Result<BandTag, MetricError> {
    let definition = registry.definition(metric_id)?;

    if !value.is_finite() {
        return Err(MetricError::InvalidValue(format!(
            "{metric_id} nhận giá trị không hữu hạn"
        )));
    }

    match value {
        MetricValue::Scalar(scalar) => {
            if definition.is_composite() {
                return Err(MetricError::InvalidValue(format!(
                    "{metric_id} cần cặp giá trị tâm thu/tâm trương"
                )));
            }
            if definition.higher_is_better {
                classify_scalar(definition, scalar)
            } else {
                classify_inverted(definition, scalar)
            }
        }
        MetricValue::BloodPressure {
            systolic,
            diastolic,
        } => {
            if !definition.is_composite() {
                return Err(MetricError::InvalidValue(format!(
                    "{metric_id} chỉ nhận một giá trị vô hướng"
                )));
            }
            classify_composite(definition, systolic, diastolic)
        }
    }
}

/// Duyệt good -> warning -> danger, trả mức đầu tiên chứa giá trị.
/// Mức danger là lưới an toàn khi không khoảng nào chứa.
fn classify_scalar(definition: &MetricDefinition, value: f64) -> Result<BandTag, MetricError> {
    for band in &definition.bands {
        if let Some(range) = band.range.scalar() {
            if range.contains(value) {
                return Ok(band.tag);
            }
        }
    }
    Ok(BandTag::Danger)
}

/// Chỉ số càng thấp càng tốt (đường): so với cận trên của từng mức.
fn classify_inverted(definition: &MetricDefinition, value: f64) -> Result<BandTag, MetricError> {
    let good = definition.band(BandTag::Good)?;
    let warning = definition.band(BandTag::Warning)?;

    let good_high = good
        .range
        .scalar()
        .ok_or_else(|| MetricError::UnknownBand(definition.id.clone(), BandTag::Good))?
        .high;
    let warning_high = warning
        .range
        .scalar()
        .ok_or_else(|| MetricError::UnknownBand(definition.id.clone(), BandTag::Warning))?
        .high;

    if value <= good_high {
        Ok(BandTag::Good)
    } else if value <= warning_high {
        Ok(BandTag::Warning)
    } else {
        Ok(BandTag::Danger)
    }
}

/// Huyết áp: cả hai thành phần cùng đạt một mức thì mới nhận mức đó,
/// lệch mức thì rơi xuống danger.
fn classify_composite(
    definition: &MetricDefinition,
    systolic: f64,
    diastolic: f64,
) -> Result<BandTag, MetricError> {
    for tag in [BandTag::Good, BandTag::Warning] {
        let band = definition.band(tag)?;
        if let BandRange::BloodPressure {
            systolic: sys_range,
            diastolic: dia_range,
        } = &band.range
        {
            if sys_range.contains(systolic) && dia_range.contains(diastolic) {
                return Ok(tag);
            }
        }
    }
    Ok(BandTag::Danger)
}

/// Tra màu và thông điệp hiển thị cho một mức đã phân loại.
pub fn resolve(
    registry: &MetricRegistry,
    metric_id: &str,
    band: BandTag,
) -> Result<ClassificationResult, MetricError> {
    let definition = registry.definition(metric_id)?;
    let matched = definition.band(band)?;

    Ok(ClassificationResult {
        band,
        color: band.color().to_string(),
        message: matched.message.clone(),
    })
}

/// Phân loại rồi tra hiển thị trong một bước.
pub fn evaluate(
    registry: &MetricRegistry,
    metric_id: &str,
    value: MetricValue,
) -> Result<ClassificationResult, MetricError> {
    let band = classify(registry, metric_id, value)?;
    resolve(registry, metric_id, band)
}
