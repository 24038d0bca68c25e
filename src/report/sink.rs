//! 渲染输出目标
//! 页面中对应一个表格元素（tbody 整体替换）和一个文本框（写入 JSON 导出）

use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;

use super::renderer::ReportRow;

/// 渲染输出目标
pub trait ReportSink: Send + Sync {
    /// 用新行整体替换表格 tbody
    fn replace_table_body(&self, table_id: &str, rows: &[ReportRow]);

    /// 写入 JSON 导出文本
    fn set_dump(&self, dump_id: &str, dump: &str);
}

#[derive(Debug, Default)]
struct MemorySinkState {
    table_id: String,
    rows: Vec<ReportRow>,
    dump_id: String,
    dump: String,
}

/// 内存渲染目标：保留最近一次输出并统计渲染次数
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemorySinkState>,
    render_count: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 表格被整体替换的次数
    pub fn render_count(&self) -> usize {
        self.render_count.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.state.lock().rows.clone()
    }

    pub fn dump(&self) -> String {
        self.state.lock().dump.clone()
    }

    pub fn table_id(&self) -> String {
        self.state.lock().table_id.clone()
    }

    pub fn dump_id(&self) -> String {
        self.state.lock().dump_id.clone()
    }

    /// 最近一次输出的 tbody HTML
    pub fn tbody_html(&self) -> String {
        ReportRow::tbody_html(&self.state.lock().rows)
    }
}

impl ReportSink for MemorySink {
    fn replace_table_body(&self, table_id: &str, rows: &[ReportRow]) {
        let mut state = self.state.lock();
        state.table_id = table_id.to_string();
        state.rows = rows.to_vec();
        self.render_count.fetch_add(1, Ordering::SeqCst);
    }

    fn set_dump(&self, dump_id: &str, dump: &str) {
        let mut state = self.state.lock();
        state.dump_id = dump_id.to_string();
        state.dump = dump.to_string();
    }
}
