//! CSP 绕过探针（bypassCsp）
//! 注入一个应被严格 CSP 拦截的第三方脚本：加载失败是正常行为，加载成功说明 CSP 被绕过

use tokio::task::JoinHandle;
use tracing::debug;

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};
use crate::host::ScriptLoad;

pub const BYPASS_CSP_TYPE: &str = "bypassCsp";

/// CSP 绕过探针
pub struct BypassCspProbe;

impl BypassCspProbe {
    pub fn evaluate(outcome: ScriptLoad) -> NewDetection {
        match outcome {
            ScriptLoad::Failed => NewDetection::new(BYPASS_CSP_TYPE)
                .rating(Rating::Clean)
                .note("Content Security Policy (CSP) is enabled, it's expected behavior."),
            ScriptLoad::Loaded => NewDetection::new(BYPASS_CSP_TYPE)
                .rating(Rating::Detected)
                .note("Content Security Policy (CSP) was ignored, you might use <code>Page.setBypassCSP</code> (Puppeteer) or <code>bypassCSP: true</code> (Playwright). It's invalid behavior for a normal browser."),
        }
    }
}

impl Probe for BypassCspProbe {
    fn detection_type(&self) -> &'static str {
        BYPASS_CSP_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        let task_ctx = ctx.clone();
        Some(tokio::spawn(async move {
            let src = task_ctx.config().csp_probe_script_url.clone();
            let outcome = task_ctx.host.load_script(&src).await;
            debug!("CSP探针脚本加载结果：{:?}，URL：{}", outcome, src);
            task_ctx.submit(Self::evaluate(outcome));
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use crate::probe::test_support::harness;

    #[tokio::test]
    async fn test_blocked_script_is_expected() {
        let h = harness(SimulatedHost::new());
        BypassCspProbe.start(&h.ctx).expect("异步任务").await.unwrap();

        assert_eq!(h.ctx.session.detection(BYPASS_CSP_TYPE).unwrap().rating, Rating::Clean);
        assert_eq!(h.host.loaded_scripts(), vec!["https://www.w3schools.com/js/myScript.js".to_string()]);
    }

    #[tokio::test]
    async fn test_loaded_script_means_bypass() {
        let h = harness(SimulatedHost::new().with_script_load(ScriptLoad::Loaded));
        BypassCspProbe.start(&h.ctx).expect("异步任务").await.unwrap();

        let record = h.ctx.session.detection(BYPASS_CSP_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Detected);
        assert!(record.note.contains("Page.setBypassCSP"));
    }
}
