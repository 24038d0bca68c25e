//! 最新稳定版本拉取器
//! 单次请求，不重试：失败由调用方转换为"无法判断"的检测结果

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::model::StableRelease;
use crate::config::GlobalConfig;
use crate::error::{BdResult, BotDetectorError};

/// 最新稳定版本数据源
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// 获取最新稳定版发布描述
    async fn latest_stable(&self) -> BdResult<StableRelease>;
}

/// chromiumdash 发布元数据接口
#[derive(Debug, Clone)]
pub struct ChromiumDashSource {
    client: Client,
    endpoint: String,
    user_agent: String,
}

impl ChromiumDashSource {
    /// 按配置创建数据源
    pub fn new(config: &GlobalConfig) -> BdResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.release_endpoint.clone(),
            user_agent: config.http_user_agent.clone(),
        })
    }

    /// 解析发布列表，取第一项
    pub fn parse_releases(body: &[u8]) -> BdResult<StableRelease> {
        let releases: Vec<StableRelease> = serde_json::from_slice(body)
            .map_err(|e| BotDetectorError::ReleaseFetchError(e.to_string()))?;

        releases
            .into_iter()
            .next()
            .ok_or_else(|| BotDetectorError::ReleaseFetchError("release list is empty".to_string()))
    }
}

#[async_trait]
impl ReleaseSource for ChromiumDashSource {
    async fn latest_stable(&self) -> BdResult<StableRelease> {
        debug!("开始拉取最新稳定版本，URL：{}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| BotDetectorError::ReleaseFetchError(e.to_string()))?;

        // 非 2xx：消息为"状态码 原因短语"
        let status = response.status();
        if !status.is_success() {
            return Err(BotDetectorError::ReleaseFetchError(status.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BotDetectorError::ReleaseFetchError(e.to_string()))?;

        let release = Self::parse_releases(&body)?;
        debug!("最新稳定版本：{}", release.version);
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_first_release() {
        let body = br#"[{"version":"131.0.6778.205","time":1734465600000},{"version":"130.0.1.0","time":1}]"#;
        let release = ChromiumDashSource::parse_releases(body).unwrap();
        assert_eq!(release.version, "131.0.6778.205");
    }

    #[test]
    fn test_parse_empty_list_is_error() {
        let err = ChromiumDashSource::parse_releases(b"[]").unwrap_err();
        assert_eq!(err.to_string(), "release list is empty");
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            ChromiumDashSource::parse_releases(b"<html>"),
            Err(BotDetectorError::ReleaseFetchError(_))
        ));
    }

    #[test]
    fn test_source_builds_from_default_config() {
        assert!(ChromiumDashSource::new(&GlobalConfig::default()).is_ok());
    }

    fn source_for(endpoint: String) -> ChromiumDashSource {
        let config = ConfigManager::custom().release_endpoint(endpoint).http_timeout(5).build();
        ChromiumDashSource::new(&config).unwrap()
    }

    /// 本地单次应答服务：读取请求后返回固定响应
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://{}/fetch_releases", addr)
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_status_line() {
        let endpoint = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let err = source_for(endpoint).latest_stable().await.unwrap_err();
        assert!(matches!(err, BotDetectorError::ReleaseFetchError(_)));
        assert_eq!(err.message(), "503 Service Unavailable");
    }

    #[tokio::test]
    async fn test_success_response_is_parsed() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 39\r\nconnection: close\r\n\r\n[{\"version\":\"131.0.6778.205\",\"time\":1}]",
        )
        .await;

        let release = source_for(endpoint).latest_stable().await.unwrap();
        assert_eq!(release.version, "131.0.6778.205");
    }

    #[tokio::test]
    async fn test_transport_failure_carries_message() {
        let err = source_for("http://127.0.0.1:1/".to_string()).latest_stable().await.unwrap_err();
        match err {
            BotDetectorError::ReleaseFetchError(message) => assert!(message.contains("127.0.0.1:1")),
            other => panic!("意外的错误类型：{:?}", other),
        }
    }
}
