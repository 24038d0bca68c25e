//! Simulated detection session for rsbotdetector
//! rsbotdetector 模拟检测会话演示程序
//! 功能说明：
//! 1. 使用内存宿主模拟一个泄露了多种自动化特征的页面
//! 2. 启动全部探针，并模拟页面脚本在运行期间的调用
//! 3. 输出检测表格行与 JSON 导出结果
//!
//! 运行命令：
//! cargo run --example simulated_session

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rsbotdetector::{
    BdResult, BotDetector, ConfigManager, GlobalValue, MemorySink, MethodCall, Reporter, ReleaseSource,
    ScriptLoad, SimulatedHost, StableRelease, ViewportMetrics,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// 离线版本数据源（演示无需联网）
struct FixedRelease;

#[async_trait]
impl ReleaseSource for FixedRelease {
    async fn latest_stable(&self) -> BdResult<StableRelease> {
        Ok(StableRelease::new("131.0.6778.204", 1734465600000.0))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // ========== 2. 构造带自动化特征的宿主 ==========
    let host = Arc::new(
        SimulatedHost::new()
            .with_viewport(ViewportMetrics::new(800, 600))
            .with_script_load(ScriptLoad::Loaded)
            .with_global("puppeteer___ariaQuery", GlobalValue::function("function () {}")),
    );
    let sink = Arc::new(MemorySink::new());

    // ========== 3. 启动检测器 ==========
    let config = ConfigManager::custom().poll_interval_ms(50).build();
    let detector = BotDetector::with_release_source(config, host.clone(), sink.clone(), Arc::new(FixedRelease))?;
    detector.run()?;
    println!("✅ 检测器已启动 | 初始检测项：{}", detector.detections().len());

    // ========== 4. 模拟页面脚本行为 ==========
    host.call_global_fn("dummyFn");
    host.call_dom_method("getElementsByClassName", MethodCall::new(vec![json!("div")]));
    host.call_dom_method(
        "getElementById",
        MethodCall::new(vec![json!("detections-json")]).with_stack("Error\n    at pptr:evaluate;1:10"),
    );
    host.set_global("exposedFn", GlobalValue::function("// This is the Puppeteer binding"));
    host.attach_devtools(true);
    tokio::time::sleep(Duration::from_millis(300)).await;
    detector.shutdown();

    // ========== 5. 输出结果 ==========
    println!("\n===== 检测表格 =====");
    for detection in detector.detections() {
        println!(
            "{} {:<20} {:>8} ms",
            Reporter::rating_icon(detection.rating),
            detection.detection_type,
            detection.ms_since_load
        );
    }
    println!("\n===== JSON 导出（#{}）=====", sink.dump_id());
    println!("{}", sink.dump());
    Ok(())
}
