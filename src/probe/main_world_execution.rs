//! 主世界执行泄露探针（mainWorldExecution）
//! 包装 `document.getElementsByClassName`：只有在主世界执行的脚本才会调用到包装函数

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};
use crate::host::instrument_dom_method;

pub const MAIN_WORLD_EXECUTION_TYPE: &str = "mainWorldExecution";
/// 被插桩的 DOM 方法
pub const MAIN_WORLD_METHOD: &str = "getElementsByClassName";

/// 主世界执行泄露探针
pub struct MainWorldExecutionProbe;

impl Probe for MainWorldExecutionProbe {
    fn detection_type(&self) -> &'static str {
        MAIN_WORLD_EXECUTION_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        ctx.submit(
            NewDetection::new(MAIN_WORLD_EXECUTION_TYPE)
                .rating(Rating::Inconclusive)
                .note("Call <code>document.getElementsByClassName('div')</code> to trigger this test. If you did and the test wasn't triggered, then you're running it in an isolated world, which is safe and not detectable."),
        );

        let session = ctx.session.clone();
        let installed = instrument_dom_method(ctx.host.as_ref(), MAIN_WORLD_METHOD, move |call| {
            session.add_detection(
                NewDetection::new(MAIN_WORLD_EXECUTION_TYPE)
                    .rating(Rating::Detected)
                    .note(r#"You've called <code>document.getElementsByClassName()</code> in the main world. Use <a href="https://github.com/rebrowser/rebrowser-patches" target="_blank">rebrowser-patches</a> to run your scripts in an isolated world."#)
                    .debug(json!({ "args": call.args })),
            );
        });

        if let Err(e) = installed {
            warn!("主世界执行探针插桩失败：{}", e);
        }
        None
    }
}
