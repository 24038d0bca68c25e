//! 检测结果渲染器
//! 纯投影：不修改检测结果，每次调用都整体替换之前的输出

use tracing::debug;

use super::sink::ReportSink;
use crate::config::GlobalConfig;
use crate::detection::{DebugPayload, Detection, Rating};
use crate::error::{BdResult, BotDetectorError};

/// 表格中的一行（三列 HTML 片段）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// 图标 + 类型
    pub label: String,
    /// 耗时
    pub elapsed: String,
    /// 说明 + 调试信息
    pub detail: String,
}

impl ReportRow {
    pub fn cells(&self) -> [&str; 3] {
        [&self.label, &self.elapsed, &self.detail]
    }

    pub fn to_html(&self) -> String {
        let cells: String = self.cells().iter().map(|cell| format!("<td>{}</td>", cell)).collect();
        format!("<tr>{}</tr>", cells)
    }

    /// 拼接完整 tbody
    pub fn tbody_html(rows: &[ReportRow]) -> String {
        let body: String = rows.iter().map(ReportRow::to_html).collect();
        format!("<tbody>{}</tbody>", body)
    }
}

/// 检测结果渲染器
pub struct Reporter;

impl Reporter {
    /// 评级图标：<0 绿、=0 白、=0.5 黄，其余一律红
    pub fn rating_icon(rating: Rating) -> &'static str {
        let value = rating.value();
        if value < 0.0 {
            "🟢"
        } else if value == 0.0 {
            "⚪️"
        } else if value == 0.5 {
            "🟡"
        } else {
            "🔴"
        }
    }

    /// 生成单行
    pub fn build_row(detection: &Detection) -> ReportRow {
        let debug_block = match &detection.debug {
            None => String::new(),
            Some(DebugPayload::Text(text)) if text.is_empty() => String::new(),
            Some(debug) => format!("\n<pre>{}</pre>", debug.pretty()),
        };

        ReportRow {
            label: format!(
                r#"<span class="text-nowrap">{} {}</span>"#,
                Self::rating_icon(detection.rating),
                detection.detection_type
            ),
            elapsed: format!(r#"<span class="text-nowrap">{} ms</span>"#, detection.ms_since_load),
            detail: format!("{}{}", detection.note, debug_block),
        }
    }

    /// 按存储顺序生成所有行
    pub fn build_rows(detections: &[Detection]) -> Vec<ReportRow> {
        detections.iter().map(Self::build_row).collect()
    }

    /// 检测结果整体导出为缩进 JSON
    pub fn dump(detections: &[Detection]) -> BdResult<String> {
        serde_json::to_string_pretty(detections).map_err(|e| BotDetectorError::RenderError(e.to_string()))
    }

    /// 渲染到输出目标
    pub fn render(detections: &[Detection], config: &GlobalConfig, sink: &dyn ReportSink) -> BdResult<()> {
        let rows = Self::build_rows(detections);
        let dump = Self::dump(detections)?;

        sink.replace_table_body(&config.table_id, &rows);
        sink.set_dump(&config.dump_id, &dump);

        debug!("渲染完成，共{}行", rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::NewDetection;
    use crate::report::MemorySink;
    use serde_json::json;

    fn detection(kind: &str, rating: Rating) -> Detection {
        NewDetection::new(kind).rating(rating).note("note").into_detection(1.5)
    }

    #[test]
    fn test_rating_icons() {
        assert_eq!(Reporter::rating_icon(Rating::Clean), "🟢");
        assert_eq!(Reporter::rating_icon(Rating::Inconclusive), "⚪️");
        assert_eq!(Reporter::rating_icon(Rating::Suspicious), "🟡");
        assert_eq!(Reporter::rating_icon(Rating::Detected), "🔴");
    }

    #[test]
    fn test_row_cells() {
        let row = Reporter::build_row(&detection("viewport", Rating::Clean));
        assert_eq!(row.label, r#"<span class="text-nowrap">🟢 viewport</span>"#);
        assert_eq!(row.elapsed, r#"<span class="text-nowrap">1.5 ms</span>"#);
        assert_eq!(row.detail, "note");
    }

    #[test]
    fn test_debug_rendering() {
        // 测试场景：结构化 debug 缩进输出，字符串 debug 原样输出
        let structured = NewDetection::new("viewport")
            .note("n")
            .debug(json!({"width": 800}))
            .into_detection(0.0);
        let row = Reporter::build_row(&structured);
        assert_eq!(row.detail, "n\n<pre>{\n  \"width\": 800\n}</pre>");

        let text = NewDetection::new("sourceUrlLeak").note("n").debug("Error\n at x").into_detection(0.0);
        assert_eq!(Reporter::build_row(&text).detail, "n\n<pre>Error\n at x</pre>");

        let empty = NewDetection::new("a").note("n").debug("").into_detection(0.0);
        assert_eq!(Reporter::build_row(&empty).detail, "n");
    }

    #[test]
    fn test_render_replaces_output_in_store_order() {
        let sink = MemorySink::new();
        let config = GlobalConfig::default();

        let detections = vec![detection("b", Rating::Clean), detection("a", Rating::Detected)];
        Reporter::render(&detections, &config, &sink).unwrap();
        Reporter::render(&detections[..1], &config, &sink).unwrap();

        assert_eq!(sink.render_count(), 2);
        assert_eq!(sink.rows().len(), 1);
        assert_eq!(sink.table_id(), "detections-table");
        assert_eq!(sink.dump_id(), "detections-json");

        let dumped: serde_json::Value = serde_json::from_str(&sink.dump()).unwrap();
        assert_eq!(dumped, json!([{"type": "b", "rating": -1, "note": "note", "msSinceLoad": 1.5}]));
    }

    #[test]
    fn test_tbody_html() {
        let rows = Reporter::build_rows(&[detection("a", Rating::Suspicious)]);
        let html = ReportRow::tbody_html(&rows);
        assert!(html.starts_with("<tbody><tr><td>"));
        assert!(html.ends_with("</td></tr></tbody>"));
    }
}
