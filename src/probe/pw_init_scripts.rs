//! 初始化脚本标记探针（pwInitScripts）
//! 未打补丁的 Playwright 会在页面创建 `window.__pwInitScripts`

use serde_json::json;
use tokio::task::JoinHandle;

use super::{start_polling, PollControl, Probe, ProbeContext, NO_FIX_TIP};
use crate::detection::{NewDetection, Rating};

pub const PW_INIT_SCRIPTS_TYPE: &str = "pwInitScripts";
const PW_INIT_SCRIPTS_GLOBAL: &str = "__pwInitScripts";

/// 初始化脚本标记探针
pub struct PwInitScriptsProbe;

impl Probe for PwInitScriptsProbe {
    fn detection_type(&self) -> &'static str {
        PW_INIT_SCRIPTS_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        ctx.submit(
            NewDetection::new(PW_INIT_SCRIPTS_TYPE)
                .rating(Rating::Clean)
                .note("No <code>window.__pwInitScripts</code> detected."),
        );

        let tick_ctx = ctx.clone();
        start_polling(ctx, PW_INIT_SCRIPTS_TYPE, move || {
            let Some(scripts) = tick_ctx.host.global(PW_INIT_SCRIPTS_GLOBAL) else {
                return PollControl::Continue;
            };

            tick_ctx.submit(
                NewDetection::new(PW_INIT_SCRIPTS_TYPE)
                    .rating(Rating::Detected)
                    .note(format!(
                        "<div>You're using unpatched Playwright as it creates <code>window.__pwInitScripts</code> object.</div>\n<div>{}</div>",
                        NO_FIX_TIP
                    ))
                    .debug(json!({ "__pwInitScripts": scripts.to_json() })),
            );
            PollControl::Stop
        })
    }
}
