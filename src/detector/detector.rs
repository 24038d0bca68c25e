//! 检测器核心：组装会话、宿主与探针，按固定顺序启动所有探针
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::DetectionSession;
use crate::config::GlobalConfig;
use crate::detection::Detection;
use crate::error::{BdResult, BotDetectorError};
use crate::host::BrowserHost;
use crate::probe::{default_probes, Probe, ProbeContext};
use crate::release::{ChromiumDashSource, ReleaseSource};
use crate::report::ReportSink;

/// 自动化环境检测器
pub struct BotDetector {
    ctx: ProbeContext,
    probes: Vec<Box<dyn Probe>>,
    started: AtomicBool,
    // 探针只启动一次：DOM 方法插桩与全局函数暴露不可撤销
    launched: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BotDetector {
    /// 创建检测器（版本元数据来自 chromiumdash）
    pub fn new(config: GlobalConfig, host: Arc<dyn BrowserHost>, sink: Arc<dyn ReportSink>) -> BdResult<Self> {
        let release_source = Arc::new(ChromiumDashSource::new(&config)?);
        Self::with_release_source(config, host, sink, release_source)
    }

    /// 使用自定义版本数据源创建检测器
    pub fn with_release_source(
        config: GlobalConfig,
        host: Arc<dyn BrowserHost>,
        sink: Arc<dyn ReportSink>,
        release_source: Arc<dyn ReleaseSource>,
    ) -> BdResult<Self> {
        config.validate()?;

        let session = Arc::new(DetectionSession::new(Arc::new(config), sink));
        Ok(Self {
            ctx: ProbeContext::new(session, host, release_source),
            probes: default_probes(),
            started: AtomicBool::new(false),
            launched: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// 启动所有探针（每个检测器只启动一次，之后的调用无效果，包括 `shutdown` 之后）
    /// 同步部分在返回前全部完成，轮询与异步探针在当前 tokio 运行时中继续执行
    pub fn run(&self) -> BdResult<()> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| BotDetectorError::InvalidInput(format!("需要在 tokio 运行时中启动：{}", e)))?;

        if self.launched.swap(true, Ordering::SeqCst) {
            warn!("检测器已启动过，忽略重复启动");
            return Ok(());
        }
        self.started.store(true, Ordering::SeqCst);

        self.ctx.session.reset();
        info!("开始检测，探针数量：{}", self.probes.len());

        let mut tasks = self.tasks.lock();
        for probe in &self.probes {
            debug!("启动探针：{}", probe.detection_type());
            if let Some(handle) = probe.start(&self.ctx) {
                tasks.push(handle);
            }
        }
        Ok(())
    }

    /// 停止所有轮询与未完成的异步探针
    pub fn shutdown(&self) {
        self.ctx.session.shutdown();
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in &tasks {
            task.abort();
        }
        if self.started.swap(false, Ordering::SeqCst) {
            info!("检测已停止，取消任务数：{}", tasks.len());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// 仍在运行的后台任务数
    pub fn pending_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|task| !task.is_finished()).count()
    }

    pub fn session(&self) -> &Arc<DetectionSession> {
        &self.ctx.session
    }

    /// 当前检测结果快照
    pub fn detections(&self) -> Vec<Detection> {
        self.ctx.session.detections()
    }

    pub fn config(&self) -> &GlobalConfig {
        self.ctx.config()
    }
}

impl Drop for BotDetector {
    fn drop(&mut self) {
        self.shutdown();
    }
}
