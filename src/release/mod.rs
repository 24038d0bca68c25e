//! 版本元数据模块：拉取最新稳定版浏览器版本，用于 useragent 探针比对
pub mod model;
pub mod fetcher;

// 导出核心接口
pub use self::model::StableRelease;
pub use self::fetcher::{ReleaseSource, ChromiumDashSource};
