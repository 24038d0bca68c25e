//! 报告模块：将检测结果投影为表格行与 JSON 导出
pub mod renderer;
pub mod sink;

// 导出核心接口
pub use self::renderer::{Reporter, ReportRow};
pub use self::sink::{ReportSink, MemorySink};
