//! 检测会话：会话级上下文（检测结果存储 + 计时起点 + 渲染目标）
//! 所有探针的写入都经过 `add_detection`，存储与渲染在同一把锁内串行完成

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::GlobalConfig;
use crate::detection::{Detection, NewDetection};
use crate::error::BdResult;
use crate::report::{ReportSink, Reporter};
use crate::utils::DetectionUpdater;

struct SessionState {
    detections: Vec<Detection>,
    started_at: Instant,
}

/// 检测会话
pub struct DetectionSession {
    state: Mutex<SessionState>,
    config: Arc<GlobalConfig>,
    sink: Arc<dyn ReportSink>,
    shutdown_tx: watch::Sender<bool>,
}

impl DetectionSession {
    pub fn new(config: Arc<GlobalConfig>, sink: Arc<dyn ReportSink>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(SessionState {
                detections: Vec::new(),
                started_at: Instant::now(),
            }),
            config,
            sink,
            shutdown_tx,
        }
    }

    /// 清空检测结果并重新记录计时起点
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.detections.clear();
        state.started_at = Instant::now();
        self.shutdown_tx.send_replace(false);
    }

    /// 聚合器入口：按去重/覆盖规则写入，接受后同步重新渲染
    pub fn add_detection(&self, candidate: NewDetection) -> bool {
        let detection_type = candidate.detection_type.clone();
        let rating = candidate.effective_rating();

        let mut state = self.state.lock();
        let started_at = state.started_at;
        let accepted = DetectionUpdater::update(&mut state.detections, candidate, || {
            started_at.elapsed().as_secs_f64() * 1000.0
        });

        if !accepted {
            return false;
        }

        if self.config.verbose {
            debug!("addDetection：type={}，rating={}", detection_type, rating);
        }
        if let Err(e) = Reporter::render(&state.detections, &self.config, self.sink.as_ref()) {
            warn!("渲染检测结果失败：{}", e);
        }
        true
    }

    /// 当前全部检测结果（按存储顺序）
    pub fn detections(&self) -> Vec<Detection> {
        self.state.lock().detections.clone()
    }

    /// 指定类型的第一条检测结果
    pub fn detection(&self, detection_type: &str) -> Option<Detection> {
        self.state
            .lock()
            .detections
            .iter()
            .find(|d| d.detection_type == detection_type)
            .cloned()
    }

    /// 手动重新渲染
    pub fn render(&self) -> BdResult<()> {
        let state = self.state.lock();
        Reporter::render(&state.detections, &self.config, self.sink.as_ref())
    }

    /// 距会话开始的毫秒数
    pub fn elapsed_ms(&self) -> f64 {
        self.state.lock().started_at.elapsed().as_secs_f64() * 1000.0
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// 通知所有轮询任务停止
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// 订阅停止信号
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}
