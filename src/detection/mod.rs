//! 检测结果模块：检测结果数据模型
pub mod model;

// 导出核心接口
pub use self::model::{Detection, NewDetection, Rating, DebugPayload};
