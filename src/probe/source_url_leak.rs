//! sourceURL 泄露探针（sourceUrlLeak）
//! 包装 `document.getElementById`，每次调用时检查调用方 stack 中
//! 自动化库注入脚本留下的标记（Puppeteer 的 `pptr:`，Playwright 的 `UtilityScript.`）

use tokio::task::JoinHandle;
use tracing::warn;

use super::{Probe, ProbeContext, USE_PATCHES_TIP};
use crate::detection::{NewDetection, Rating};
use crate::host::instrument_dom_method;

pub const SOURCE_URL_LEAK_TYPE: &str = "sourceUrlLeak";
/// 被插桩的 DOM 方法
pub const SOURCE_URL_METHOD: &str = "getElementById";

const PUPPETEER_STACK_MARKER: &str = "pptr:";
const PLAYWRIGHT_STACK_MARKER: &str = "UtilityScript.";

/// sourceURL 泄露探针
pub struct SourceUrlLeakProbe;

impl SourceUrlLeakProbe {
    /// 检查一次调用的 stack 文本
    pub fn evaluate_stack(stack: &str) -> NewDetection {
        let note = if stack.contains(PUPPETEER_STACK_MARKER) {
            Some("Error stack contains <code>pptr:</code>. You're using unpatched Puppeteer.")
        } else if stack.contains(PLAYWRIGHT_STACK_MARKER) {
            Some("Error stack contains <code>UtilityScript.</code>. You're using unpatched Playwright.")
        } else {
            None
        };

        match note {
            Some(note) => NewDetection::new(SOURCE_URL_LEAK_TYPE)
                .rating(Rating::Detected)
                .note(format!("{} {}", note, USE_PATCHES_TIP))
                .debug(stack),
            None => NewDetection::new(SOURCE_URL_LEAK_TYPE)
                .rating(Rating::Clean)
                .note("Error stack doesn't contain anything suspicious.")
                .debug(stack),
        }
    }
}

impl Probe for SourceUrlLeakProbe {
    fn detection_type(&self) -> &'static str {
        SOURCE_URL_LEAK_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        let session = ctx.session.clone();
        let installed = instrument_dom_method(ctx.host.as_ref(), SOURCE_URL_METHOD, move |call| {
            session.add_detection(Self::evaluate_stack(&call.stack));
        });
        if let Err(e) = installed {
            warn!("sourceURL探针插桩失败：{}", e);
        }

        ctx.submit(
            NewDetection::new(SOURCE_URL_LEAK_TYPE)
                .rating(Rating::Inconclusive)
                .note("Call <code>document.getElementById('detections-json')</code> to test sourceUrl leak."),
        );
        None
    }
}
