//! 运行时内省泄露探针（runtimeEnableLeak）
//! 调试协议（如开启 Runtime.enable 的 CDP）记录错误时会主动读取 stack，
//! 正常页面不会。记录一个 stack 带计数陷阱的错误，计数大于 0 即判定泄露

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::json;
use tokio::task::JoinHandle;

use super::{start_polling, PollControl, Probe, ProbeContext, USE_PATCHES_TIP};
use crate::detection::{NewDetection, Rating};
use crate::host::StackTrap;

pub const RUNTIME_ENABLE_LEAK_TYPE: &str = "runtimeEnableLeak";

/// 运行时内省泄露探针
pub struct RuntimeEnableLeakProbe;

impl RuntimeEnableLeakProbe {
    fn leak_note() -> String {
        format!(
            "<div>You might have opened devtools. It's a red flag for any anti-bot system.</div>\n\
             <div>You might have CDP with <code>Runtime.enable</code>. {}</div>",
            USE_PATCHES_TIP
        )
    }
}

impl Probe for RuntimeEnableLeakProbe {
    fn detection_type(&self) -> &'static str {
        RUNTIME_ENABLE_LEAK_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        let lookups = Arc::new(AtomicU64::new(0));
        ctx.submit(
            NewDetection::new(RUNTIME_ENABLE_LEAK_TYPE)
                .rating(Rating::Clean)
                .note("No leak detected."),
        );

        let tick_ctx = ctx.clone();
        start_polling(ctx, RUNTIME_ENABLE_LEAK_TYPE, move || {
            let count = lookups.load(Ordering::SeqCst);
            if count > 0 {
                tick_ctx.submit(
                    NewDetection::new(RUNTIME_ENABLE_LEAK_TYPE)
                        .rating(Rating::Detected)
                        .note(Self::leak_note())
                        .debug(json!({ "stackLookupCount": count })),
                );
                return PollControl::Stop;
            }

            tick_ctx.host.console_debug(StackTrap::new(lookups.clone()));
            PollControl::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use crate::probe::test_support::harness;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_clean_path_keeps_polling() {
        let h = harness(SimulatedHost::new());
        let handle = RuntimeEnableLeakProbe.start(&h.ctx).expect("轮询任务");

        tokio::time::sleep(Duration::from_millis(350)).await;
        let record = h.ctx.session.detection(RUNTIME_ENABLE_LEAK_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Clean);
        assert!(h.host.logged_errors() >= 4);
        assert!(!handle.is_finished());

        h.ctx.session.shutdown();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_devtools_read_is_detected_and_polling_stops() {
        let h = harness(SimulatedHost::new());
        let handle = RuntimeEnableLeakProbe.start(&h.ctx).expect("轮询任务");

        h.host.attach_devtools(true);
        tokio::time::sleep(Duration::from_millis(250)).await;

        let record = h.ctx.session.detection(RUNTIME_ENABLE_LEAK_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Detected);
        assert_eq!(record.debug, Some(json!({"stackLookupCount": 1}).into()));
        assert!(handle.is_finished());
    }
}
