//! 暴露函数泄露探针（exposeFunctionLeak）
//! 检查 `page.exposeFunction` 在页面留下的痕迹：绑定函数源码中的标记串、
//! 特定前缀/保留名的全局属性、带 `__installed = true` 属性的全局函数

use serde_json::{json, Value};
use tokio::task::JoinHandle;

use super::{start_polling, PollControl, Probe, ProbeContext, NO_FIX_TIP};
use crate::detection::{NewDetection, Rating};
use crate::host::BrowserHost;

pub const EXPOSE_FUNCTION_LEAK_TYPE: &str = "exposeFunctionLeak";
/// 被检查的全局绑定名
pub const EXPOSED_FN_NAME: &str = "exposedFn";

const PUPPETEER_BINDING_MARKER: &str = "This is the Puppeteer binding";
const PLAYWRIGHT_BINDING_MARKER: &str = "exposeBindingHandle supports a single argument";
const PUPPETEER_KEY_PREFIX: &str = "puppeteer_";
const PLAYWRIGHT_BINDING_KEY: &str = "__playwright__binding__";
const INSTALLED_FLAG: &str = "__installed";

/// 暴露函数泄露探针
pub struct ExposeFunctionLeakProbe;

impl ExposeFunctionLeakProbe {
    fn leak_note(lead: &str) -> String {
        format!(
            "<div>{}</div>\n<div>{}</div>\n<div>Remove <code>page.exposeFunction</code> from your code to avoid this leak.</div>",
            lead, NO_FIX_TIP
        )
    }

    fn detected(lead: &str, debug: Value) -> NewDetection {
        NewDetection::new(EXPOSE_FUNCTION_LEAK_TYPE)
            .rating(Rating::Detected)
            .note(Self::leak_note(lead))
            .debug(debug)
    }

    /// 单轮检测
    pub fn evaluate(host: &dyn BrowserHost) -> NewDetection {
        let Some(exposed) = host.global(EXPOSED_FN_NAME) else {
            return NewDetection::new(EXPOSE_FUNCTION_LEAK_TYPE)
                .rating(Rating::Inconclusive)
                .note("No <code>window.exposedFn</code>. Use <code>page.exposeFunction</code> to trigger this test.");
        };

        let source = exposed.source_text();
        if source.contains(PUPPETEER_BINDING_MARKER) {
            return Self::detected(
                "You're using unpatched Puppeteer and method <code>page.exposeFunction</code>.",
                json!({ "exposedFn.toString()": source }),
            );
        }
        if source.contains(PLAYWRIGHT_BINDING_MARKER) {
            return Self::detected(
                "You're using unpatched Playwright and method <code>page.exposeFunction</code>.",
                json!({ "exposedFn.toString()": source }),
            );
        }

        // 逐个扫描全局属性，命中第一个即返回
        for key in host.global_names() {
            if key.starts_with(PUPPETEER_KEY_PREFIX) {
                return Self::detected(
                    "You're using unpatched Puppeteer and method <code>page.exposeFunction</code>.",
                    json!({ "windowKey": key }),
                );
            }
            if key == PLAYWRIGHT_BINDING_KEY {
                return Self::detected(
                    "You're using unpatched Playwright and method <code>page.exposeFunction</code> as it creates <code>window.__playwright__binding__</code> object.",
                    json!({ "windowKey": key }),
                );
            }
            let installed = host
                .global(&key)
                .is_some_and(|value| value.is_function() && value.property(INSTALLED_FLAG) == Some(&Value::Bool(true)));
            if installed {
                return Self::detected(
                    "You're using unpatched Playwright and method <code>page.exposeFunction</code>. It's detected because the exposed function has a property <code>__installed = true</code>.",
                    json!({ "windowKey": key }),
                );
            }
        }

        NewDetection::new(EXPOSE_FUNCTION_LEAK_TYPE)
            .rating(Rating::Clean)
            .note("No leak detected.")
    }
}

impl Probe for ExposeFunctionLeakProbe {
    fn detection_type(&self) -> &'static str {
        EXPOSE_FUNCTION_LEAK_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        let tick_ctx = ctx.clone();
        start_polling(ctx, EXPOSE_FUNCTION_LEAK_TYPE, move || {
            tick_ctx.submit(Self::evaluate(tick_ctx.host.as_ref()));
            PollControl::Continue
        })
    }
}
