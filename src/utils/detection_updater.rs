//! 检测结果更新工具
//! 负责检测结果的去重、覆盖/追加以及耗时戳计算

use crate::detection::{Detection, NewDetection};

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// 更新检测结果，返回本次写入是否被接受
    ///
    /// # 参数
    /// - `detections`: 有序检测结果集合
    /// - `candidate`: 待写入的候选结果
    /// - `elapsed_ms`: 仅在写入被接受时调用，返回距会话开始的毫秒数
    ///
    /// # 规则
    /// 1. 已存在同类型记录且候选带 `once` 标记：拒绝
    /// 2. 已存在同类型记录且评级、说明均相同：拒绝（幂等）
    /// 3. `replace` 显式为 false：追加到末尾
    /// 4. 其余情况：同类型记录原位覆盖，不存在则追加
    pub fn update<F>(detections: &mut Vec<Detection>, candidate: NewDetection, elapsed_ms: F) -> bool
    where
        F: FnOnce() -> f64,
    {
        let existing_index = detections
            .iter()
            .position(|d| d.detection_type == candidate.detection_type);

        if let Some(index) = existing_index {
            if candidate.once {
                return false;
            }

            let existing = &detections[index];
            if existing.rating == candidate.effective_rating() && existing.note == candidate.note {
                // 无变化，忽略
                return false;
            }
        }

        let appends = candidate.appends();
        let detection = candidate.into_detection(Self::round_ms(elapsed_ms()));

        match existing_index {
            Some(index) if !appends => detections[index] = detection,
            _ => detections.push(detection),
        }

        true
    }

    /// 毫秒数保留 3 位小数
    pub fn round_ms(ms: f64) -> f64 {
        (ms * 1000.0).round() / 1000.0
    }
}
