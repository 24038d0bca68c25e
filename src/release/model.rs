//! 版本元数据模型定义

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// 稳定版发布描述（仅保留探针需要的字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StableRelease {
    pub version: String,
    /// 发布时间（毫秒时间戳）
    pub time: f64,
}

impl StableRelease {
    pub fn new(version: impl Into<String>, time: f64) -> Self {
        Self {
            version: version.into(),
            time,
        }
    }

    /// 发布时间的 ISO 8601 文本（UTC，毫秒精度），时间戳无效时返回 None
    pub fn date(&self) -> Option<String> {
        if !self.time.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis(self.time as i64)
            .map(|date| date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }
}
