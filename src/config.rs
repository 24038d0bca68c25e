//! 全局配置管理,存储所有可配置项

use std::time::Duration;
use url::Url;

use crate::error::{BdResult, BotDetectorError};

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 最新稳定版本元数据接口
    pub release_endpoint: String,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 拉取版本元数据时使用的 User-Agent
    pub http_user_agent: String,
    // 轮询间隔（单位：毫秒）
    pub poll_interval_ms: u64,
    // CSP 探针注入的第三方脚本
    pub csp_probe_script_url: String,
    // 结果表格元素 id
    pub table_id: String,
    // JSON 导出元素 id
    pub dump_id: String,
    // 是否按字面复现 `typeof x === undefined` 判断（该分支永远不会命中）
    pub literal_user_agent_check: bool,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            release_endpoint: "https://chromiumdash.appspot.com/fetch_releases?channel=Stable&platform=Windows&num=1&offset=0".to_string(),
            http_timeout: 30,
            http_user_agent: "Rsbotdetector/0.1.0".to_string(),
            poll_interval_ms: 100,
            csp_probe_script_url: "https://www.w3schools.com/js/myScript.js".to_string(),
            table_id: "detections-table".to_string(),
            dump_id: "detections-json".to_string(),
            literal_user_agent_check: false,
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 校验配置项（URL 必须可解析，轮询间隔不能为 0）
    pub fn validate(&self) -> BdResult<()> {
        Url::parse(&self.release_endpoint)?;
        Url::parse(&self.csp_probe_script_url)?;
        if self.poll_interval_ms == 0 {
            return Err(BotDetectorError::InvalidInput("轮询间隔不能为 0".to_string()));
        }
        if self.table_id.trim().is_empty() || self.dump_id.trim().is_empty() {
            return Err(BotDetectorError::InvalidInput("渲染目标 id 不能为空".to_string()));
        }
        Ok(())
    }
}

/// 配置管理器（单例）
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn release_endpoint(mut self, url: String) -> Self {
        self.config.release_endpoint = url;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn http_user_agent(mut self, user_agent: String) -> Self {
        self.config.http_user_agent = user_agent;
        self
    }

    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.config.poll_interval_ms = interval;
        self
    }

    pub fn csp_probe_script_url(mut self, url: String) -> Self {
        self.config.csp_probe_script_url = url;
        self
    }

    pub fn table_id(mut self, id: String) -> Self {
        self.config.table_id = id;
        self
    }

    pub fn dump_id(mut self, id: String) -> Self {
        self.config.dump_id = id;
        self
    }

    pub fn literal_user_agent_check(mut self, literal: bool) -> Self {
        self.config.literal_user_agent_check = literal;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
