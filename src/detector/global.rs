//! 全局检测器单例管理
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::detector::BotDetector;
use crate::config::{ConfigManager, GlobalConfig};
use crate::error::{BdResult, BotDetectorError};
use crate::host::BrowserHost;
use crate::report::ReportSink;

/// 全局检测器实例
static GLOBAL_DETECTOR: Lazy<Arc<OnceCell<BotDetector>>> = Lazy::new(|| {
    Arc::new(OnceCell::new())
});

/// 初始化全局检测器（默认配置）
pub fn init_bot_detector(host: Arc<dyn BrowserHost>, sink: Arc<dyn ReportSink>) -> BdResult<()> {
    init_bot_detector_with_config(ConfigManager::get_default(), host, sink)
}

/// 带自定义配置初始化全局检测器
pub fn init_bot_detector_with_config(
    config: GlobalConfig,
    host: Arc<dyn BrowserHost>,
    sink: Arc<dyn ReportSink>,
) -> BdResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        return Ok(());
    }

    let detector = BotDetector::new(config, host, sink)?;
    // 并发初始化时保留先写入的实例
    if GLOBAL_DETECTOR.set(detector).is_err() {
        return Ok(());
    }

    Ok(())
}

/// 获取全局检测器
pub fn get_global_detector() -> BdResult<&'static BotDetector> {
    GLOBAL_DETECTOR.get()
        .ok_or(BotDetectorError::DetectorNotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use crate::report::MemorySink;

    #[test]
    fn test_global_init_is_idempotent() {
        let first = Arc::new(MemorySink::new());
        init_bot_detector(Arc::new(SimulatedHost::new()), first).unwrap();
        let detector = get_global_detector().unwrap();

        let second = ConfigManager::custom().table_id("other".to_string()).build();
        init_bot_detector_with_config(second, Arc::new(SimulatedHost::new()), Arc::new(MemorySink::new())).unwrap();

        assert!(std::ptr::eq(detector, get_global_detector().unwrap()));
        assert_eq!(get_global_detector().unwrap().config().table_id, "detections-table");
    }
}
