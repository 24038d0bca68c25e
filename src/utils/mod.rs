//! 工具模块：检测结果聚合、版本比较、JS 值语义辅助
pub mod detection_updater;
pub mod version_compare;
pub mod js_value;

pub use self::detection_updater::DetectionUpdater;
pub use self::version_compare::VersionComparator;
pub use self::js_value::{js_display, js_typeof};
