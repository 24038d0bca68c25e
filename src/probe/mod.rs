//! 探针模块：每个探针负责一种自动化特征检测技术
//! 探针之间互不依赖，所有结果统一经由会话聚合器写入
pub mod dummy_fn;
pub mod runtime_enable_leak;
pub mod expose_function_leak;
pub mod pw_init_scripts;
pub mod navigator_webdriver;
pub mod viewport;
pub mod useragent;
pub mod bypass_csp;
pub mod main_world_execution;
pub mod source_url_leak;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::GlobalConfig;
use crate::detection::NewDetection;
use crate::detector::DetectionSession;
use crate::host::BrowserHost;
use crate::release::ReleaseSource;

pub use self::dummy_fn::DummyFnProbe;
pub use self::runtime_enable_leak::RuntimeEnableLeakProbe;
pub use self::expose_function_leak::ExposeFunctionLeakProbe;
pub use self::pw_init_scripts::PwInitScriptsProbe;
pub use self::navigator_webdriver::NavigatorWebdriverProbe;
pub use self::viewport::ViewportProbe;
pub use self::useragent::UseragentProbe;
pub use self::bypass_csp::BypassCspProbe;
pub use self::main_world_execution::MainWorldExecutionProbe;
pub use self::source_url_leak::SourceUrlLeakProbe;

/// 修复建议：使用补丁
pub const USE_PATCHES_TIP: &str =
    r#"Use <a href="https://github.com/rebrowser/rebrowser-patches" target="_blank">rebrowser-patches</a> to fix it."#;

/// 修复建议：暂无修复
pub const NO_FIX_TIP: &str = r#"No fix available. Follow <a href="https://github.com/rebrowser/rebrowser-patches" target="_blank">rebrowser-patches</a> to stay up-to-date."#;

/// 探针运行上下文（会话、宿主、外部版本数据源）
#[derive(Clone)]
pub struct ProbeContext {
    pub session: Arc<DetectionSession>,
    pub host: Arc<dyn BrowserHost>,
    pub release_source: Arc<dyn ReleaseSource>,
}

impl ProbeContext {
    pub fn new(
        session: Arc<DetectionSession>,
        host: Arc<dyn BrowserHost>,
        release_source: Arc<dyn ReleaseSource>,
    ) -> Self {
        Self {
            session,
            host,
            release_source,
        }
    }

    /// 提交检测结果
    pub fn submit(&self, candidate: NewDetection) -> bool {
        self.session.add_detection(candidate)
    }

    pub fn config(&self) -> &GlobalConfig {
        self.session.config()
    }
}

/// 轮询控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollControl {
    Continue,
    Stop,
}

/// 探针
pub trait Probe: Send + Sync {
    /// 探针写入的检测类型
    fn detection_type(&self) -> &'static str;

    /// 启动探针：同步部分在调用内完成，异步/轮询部分返回任务句柄
    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>>;
}

/// 默认探针集合（固定启动顺序）
pub fn default_probes() -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(DummyFnProbe),
        Box::new(SourceUrlLeakProbe),
        Box::new(MainWorldExecutionProbe),
        Box::new(RuntimeEnableLeakProbe),
        Box::new(ExposeFunctionLeakProbe),
        Box::new(NavigatorWebdriverProbe),
        Box::new(BypassCspProbe),
        Box::new(ViewportProbe),
        Box::new(UseragentProbe),
        Box::new(PwInitScriptsProbe),
    ]
}

/// 启动轮询：首轮在当前调用内同步执行，之后按固定间隔重新调度
/// 收到会话停止信号或 `tick` 返回 `Stop` 时结束；生命周期日志仅在 `verbose` 时输出
pub(crate) fn start_polling<F>(ctx: &ProbeContext, name: &'static str, mut tick: F) -> Option<JoinHandle<()>>
where
    F: FnMut() -> PollControl + Send + 'static,
{
    let verbose = ctx.config().verbose;
    if tick() == PollControl::Stop {
        if verbose {
            debug!("轮询结束：{}（首轮即终止）", name);
        }
        return None;
    }

    let interval = ctx.config().poll_interval();
    let mut shutdown = ctx.session.shutdown_signal();

    Some(tokio::spawn(async move {
        loop {
            let sender_dropped = tokio::select! {
                _ = tokio::time::sleep(interval) => false,
                changed = shutdown.changed() => changed.is_err(),
            };

            if sender_dropped || *shutdown.borrow() {
                if verbose {
                    debug!("轮询已取消：{}", name);
                }
                return;
            }

            if tick() == PollControl::Stop {
                if verbose {
                    debug!("轮询结束：{}", name);
                }
                return;
            }
        }
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::ProbeContext;
    use crate::config::GlobalConfig;
    use crate::detector::DetectionSession;
    use crate::error::{BdResult, BotDetectorError};
    use crate::host::SimulatedHost;
    use crate::release::{ReleaseSource, StableRelease};
    use crate::report::MemorySink;

    /// 测试用版本数据源：返回预设结果并统计调用次数
    pub struct StubReleaseSource {
        result: Mutex<Result<StableRelease, String>>,
        calls: AtomicUsize,
    }

    impl StubReleaseSource {
        pub fn ok(version: &str) -> Self {
            Self {
                result: Mutex::new(Ok(StableRelease::new(version, 1734465600000.0))),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                result: Mutex::new(Err(message.to_string())),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReleaseSource for StubReleaseSource {
        async fn latest_stable(&self) -> BdResult<StableRelease> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.lock().clone().map_err(BotDetectorError::ReleaseFetchError)
        }
    }

    /// 测试上下文
    pub struct Harness {
        pub ctx: ProbeContext,
        pub host: Arc<SimulatedHost>,
        pub sink: Arc<MemorySink>,
        pub source: Arc<StubReleaseSource>,
    }

    pub fn harness(host: SimulatedHost) -> Harness {
        harness_with(host, StubReleaseSource::ok("131.0.6778.205"), GlobalConfig::default())
    }

    pub fn harness_with(host: SimulatedHost, source: StubReleaseSource, config: GlobalConfig) -> Harness {
        let host = Arc::new(host);
        let sink = Arc::new(MemorySink::new());
        let source = Arc::new(source);
        let session = Arc::new(DetectionSession::new(Arc::new(config), sink.clone()));
        let ctx = ProbeContext::new(session, host.clone(), source.clone());
        Harness { ctx, host, sink, source }
    }
}
