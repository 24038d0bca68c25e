//! 全局错误类型定义

use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum BotDetectorError {
    // 版本元数据相关错误（消息原样透传，作为检测结果的 debug 内容）
    #[error("{0}")]
    ReleaseFetchError(String),

    // 宿主环境相关错误
    #[error("宿主能力调用失败：{0}")]
    HostError(String),
    #[error("宿主缺少能力：{0}")]
    MissingCapability(String),

    // 检测相关错误
    #[error("检测器未初始化")]
    DetectorNotInitialized,
    #[error("渲染失败：{0}")]
    RenderError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl BotDetectorError {
    /// 不带前缀的原始错误消息（用于检测结果的 debug 字段）
    pub fn message(&self) -> String {
        match self {
            BotDetectorError::ReleaseFetchError(msg)
            | BotDetectorError::HostError(msg)
            | BotDetectorError::MissingCapability(msg)
            | BotDetectorError::RenderError(msg)
            | BotDetectorError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// 全局Result类型
pub type BdResult<T> = Result<T, BotDetectorError>;
