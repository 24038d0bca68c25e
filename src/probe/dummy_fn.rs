//! 主世界访问探针（dummyFn）
//! 在页面全局暴露零参函数，能从外部调用它说明可以访问主世界对象

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};

pub const DUMMY_FN_TYPE: &str = "dummyFn";
/// 暴露的全局函数名
pub const DUMMY_FN_NAME: &str = "dummyFn";

/// 主世界访问探针
pub struct DummyFnProbe;

impl Probe for DummyFnProbe {
    fn detection_type(&self) -> &'static str {
        DUMMY_FN_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        ctx.submit(
            NewDetection::new(DUMMY_FN_TYPE)
                .rating(Rating::Inconclusive)
                .note("Call <code>window.dummyFn()</code> to test if you can access main world objects."),
        );

        let session = ctx.session.clone();
        ctx.host.expose_global_fn(
            DUMMY_FN_NAME,
            Arc::new(move || {
                session.add_detection(
                    NewDetection::new(DUMMY_FN_TYPE)
                        .rating(Rating::Clean)
                        .note("<code>window.dummyFn()</code> was called! It means you can interact with main world objects."),
                );
                Value::Bool(true)
            }),
        );

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use crate::probe::test_support::harness;

    #[test]
    fn test_awaiting_manual_trigger() {
        let h = harness(SimulatedHost::new());
        assert!(DummyFnProbe.start(&h.ctx).is_none());

        let record = h.ctx.session.detection(DUMMY_FN_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Inconclusive);
    }

    #[test]
    fn test_call_confirms_main_world_access() {
        let h = harness(SimulatedHost::new());
        DummyFnProbe.start(&h.ctx);

        assert_eq!(h.host.call_global_fn(DUMMY_FN_NAME), Some(Value::Bool(true)));
        let record = h.ctx.session.detection(DUMMY_FN_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Clean);
        assert_eq!(h.sink.render_count(), 2);

        // 再次调用：结果不变，不重新渲染
        assert_eq!(h.host.call_global_fn(DUMMY_FN_NAME), Some(Value::Bool(true)));
        assert_eq!(h.sink.render_count(), 2);
    }
}
