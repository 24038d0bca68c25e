//! rsbotdetector - 浏览器自动化环境检测引擎
//! 各探针独立检测自动化特征，结果经聚合器去重后渲染为表格与 JSON

// 导出全局错误类型
pub use self::error::{BotDetectorError, BdResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出检测结果模型
pub use self::detection::{Detection, NewDetection, Rating, DebugPayload};

// 导出宿主能力接口
pub use self::host::{
    BrowserHost, SimulatedHost, GlobalValue, NavigatorSnapshot, ViewportMetrics,
    BrandVersion, ScriptLoad, MethodCall, StackTrap,
};

// 导出版本元数据接口
pub use self::release::{ReleaseSource, ChromiumDashSource, StableRelease};

// 导出渲染接口
pub use self::report::{Reporter, ReportRow, ReportSink, MemorySink};

// 导出工具模块核心接口
pub use self::utils::{DetectionUpdater, VersionComparator};

// 导出探针接口
pub use self::probe::{Probe, ProbeContext, default_probes};

// 导出检测模块核心接口
pub use self::detector::{
    BotDetector,
    DetectionSession,
    init_bot_detector,
    init_bot_detector_with_config,
    get_global_detector,
};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod detection;
pub mod host;
pub mod release;
pub mod report;
pub mod utils;
pub mod probe;
pub mod detector;
