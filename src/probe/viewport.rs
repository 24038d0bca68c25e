//! 视口默认值探针（viewport）
//! 自动化库有各自的默认窗口尺寸：Puppeteer 800×600，Playwright 1280×720

use serde_json::json;
use tokio::task::JoinHandle;

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};
use crate::host::ViewportMetrics;

pub const VIEWPORT_TYPE: &str = "viewport";

const PUPPETEER_DEFAULT_VIEWPORT: (u32, u32) = (800, 600);
const PLAYWRIGHT_DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// 视口默认值探针
pub struct ViewportProbe;

impl ViewportProbe {
    pub fn evaluate(metrics: &ViewportMetrics) -> NewDetection {
        let (width, height) = metrics.effective_size();
        let debug = json!({ "width": width, "height": height });

        let note = match (width, height) {
            PUPPETEER_DEFAULT_VIEWPORT => {
                Some("Viewport has default Puppeteer values. Use <code>defaultViewport: null</code> in options.")
            }
            PLAYWRIGHT_DEFAULT_VIEWPORT => {
                Some("Viewport has default Playwright values. Use <code>viewport: null</code> in options.")
            }
            _ => None,
        };

        match note {
            Some(note) => NewDetection::new(VIEWPORT_TYPE)
                .rating(Rating::Detected)
                .note(note)
                .debug(debug),
            None => NewDetection::new(VIEWPORT_TYPE)
                .rating(Rating::Clean)
                .note("Viewport is different from default values used in automation libraries.")
                .debug(debug),
        }
    }
}

impl Probe for ViewportProbe {
    fn detection_type(&self) -> &'static str {
        VIEWPORT_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        ctx.submit(Self::evaluate(&ctx.host.viewport()));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puppeteer_default() {
        let detection = ViewportProbe::evaluate(&ViewportMetrics::new(800, 600));
        assert_eq!(detection.effective_rating(), Rating::Detected);
        assert!(detection.note.contains("defaultViewport: null"));
        assert_eq!(detection.debug, Some(json!({"width": 800, "height": 600}).into()));
    }

    #[test]
    fn test_playwright_default() {
        let detection = ViewportProbe::evaluate(&ViewportMetrics::new(1280, 720));
        assert!(detection.note.contains("<code>viewport: null</code>"));
    }

    #[test]
    fn test_larger_of_document_and_window() {
        // 测试场景：文档宽度为 0、窗口为 800×600 时仍命中
        let metrics = ViewportMetrics {
            document_client_width: Some(0),
            document_client_height: None,
            inner_width: Some(800),
            inner_height: Some(600),
        };
        assert_eq!(ViewportProbe::evaluate(&metrics).effective_rating(), Rating::Detected);
    }

    #[test]
    fn test_regular_viewport() {
        let detection = ViewportProbe::evaluate(&ViewportMetrics::new(1920, 1080));
        assert_eq!(detection.effective_rating(), Rating::Clean);
        assert_eq!(detection.debug, Some(json!({"width": 1920, "height": 1080}).into()));
    }
}
