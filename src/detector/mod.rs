//! 检测模块：会话、检测器编排与全局单例
pub mod session;
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::session::DetectionSession;
pub use self::detector::BotDetector;
pub use self::global::{init_bot_detector, init_bot_detector_with_config, get_global_detector};
