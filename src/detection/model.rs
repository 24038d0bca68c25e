//! 检测结果数据模型定义
//! 仅存储检测数据，无任何业务逻辑，支持序列化/反序列化

use std::fmt;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// 检测评级（固定的有序刻度：-1 / 0 / 0.5 / 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Rating {
    /// -1：未发现异常
    Clean,
    /// 0：无法判断 / 需要手动触发
    Inconclusive,
    /// 0.5：可疑
    Suspicious,
    /// 1：确认检测到自动化特征
    #[default]
    Detected,
}

impl Rating {
    /// 评级对应的数值
    pub fn value(self) -> f64 {
        match self {
            Rating::Clean => -1.0,
            Rating::Inconclusive => 0.0,
            Rating::Suspicious => 0.5,
            Rating::Detected => 1.0,
        }
    }

    /// 从数值还原评级（不在刻度上的数值返回 None）
    pub fn from_value(value: f64) -> Option<Self> {
        if value == -1.0 {
            Some(Rating::Clean)
        } else if value == 0.0 {
            Some(Rating::Inconclusive)
        } else if value == 0.5 {
            Some(Rating::Suspicious)
        } else if value == 1.0 {
            Some(Rating::Detected)
        } else {
            None
        }
    }
}

// ======== 评级序列化为 JSON 数字（-1 / 0 / 0.5 / 1） ========
impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Clean => serializer.serialize_i8(-1),
            Rating::Inconclusive => serializer.serialize_i8(0),
            Rating::Suspicious => serializer.serialize_f64(0.5),
            Rating::Detected => serializer.serialize_i8(1),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Rating::from_value(value)
            .ok_or_else(|| de::Error::custom(format!("无效评级：{}", value)))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// 调试附加信息（字符串原样输出，结构化数据格式化为 JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugPayload {
    Text(String),
    Structured(serde_json::Value),
}

impl DebugPayload {
    /// 渲染用文本：字符串原样返回，结构化数据缩进 2 空格
    pub fn pretty(&self) -> String {
        match self {
            DebugPayload::Text(text) => text.clone(),
            DebugPayload::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<String> for DebugPayload {
    fn from(text: String) -> Self {
        DebugPayload::Text(text)
    }
}

impl From<&str> for DebugPayload {
    fn from(text: &str) -> Self {
        DebugPayload::Text(text.to_string())
    }
}

impl From<serde_json::Value> for DebugPayload {
    fn from(value: serde_json::Value) -> Self {
        DebugPayload::Structured(value)
    }
}

/// 已入库的检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "type")]
    pub detection_type: String,
    pub rating: Rating,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugPayload>,
    /// 由聚合器在接受写入时计算，探针不可设置
    #[serde(rename = "msSinceLoad", serialize_with = "serialize_ms")]
    pub ms_since_load: f64,
}

// 整数毫秒输出为 JSON 整数（0 而不是 0.0），与页面导出保持一致
fn serialize_ms<S: Serializer>(ms: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if ms.is_finite() && ms.fract() == 0.0 && ms.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*ms as i64)
    } else {
        serializer.serialize_f64(*ms)
    }
}

// ======== 为 Detection 实现 Display trait（用于日志输出） ========
impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} @ {}ms", self.rating, self.detection_type, self.ms_since_load)
    }
}

/// 待提交的检测结果（探针写入聚合器的候选数据）
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub detection_type: String,
    /// 未指定时按 1 处理
    pub rating: Option<Rating>,
    pub note: String,
    pub debug: Option<DebugPayload>,
    /// 已存在同类型记录时拒绝写入
    pub once: bool,
    /// 显式为 false 时追加新行而不是覆盖
    pub replace: Option<bool>,
}

impl NewDetection {
    pub fn new(detection_type: impl Into<String>) -> Self {
        Self {
            detection_type: detection_type.into(),
            rating: None,
            note: String::new(),
            debug: None,
            once: false,
            replace: None,
        }
    }

    pub fn rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn debug(mut self, debug: impl Into<DebugPayload>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn append(mut self) -> Self {
        self.replace = Some(false);
        self
    }

    /// 实际生效的评级
    pub fn effective_rating(&self) -> Rating {
        self.rating.unwrap_or_default()
    }

    /// 是否以追加模式写入
    pub fn appends(&self) -> bool {
        self.replace == Some(false)
    }

    /// 盖上耗时戳，转换为入库记录（写入标记不保留）
    pub fn into_detection(self, ms_since_load: f64) -> Detection {
        Detection {
            rating: self.effective_rating(),
            detection_type: self.detection_type,
            note: self.note,
            debug: self.debug,
            ms_since_load,
        }
    }
}
