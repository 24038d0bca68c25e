//! UA 版本探针（useragent）
//! 读取 `navigator.userAgentData` 高熵品牌版本，与最新稳定版比较：
//! 缺少商业品牌说明可能是 Chrome for Testing，版本高于稳定版说明不是稳定渠道

use std::cmp::Ordering;

use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};
use crate::host::{BrandVersion, BrowserHost};
use crate::release::ReleaseSource;
use crate::utils::VersionComparator;

pub const USERAGENT_TYPE: &str = "useragent";

const CHROMIUM_BRAND: &str = "Chromium";
const CHROME_BRAND: &str = "Google Chrome";

/// UA 版本探针
pub struct UseragentProbe;

impl UseragentProbe {
    fn inconclusive(note: &str) -> NewDetection {
        NewDetection::new(USERAGENT_TYPE)
            .rating(Rating::Inconclusive)
            .note(note)
    }

    /// 完整的异步检测流程（单次尝试，不重试）
    pub async fn evaluate(host: &dyn BrowserHost, release_source: &dyn ReleaseSource) -> NewDetection {
        let brands = match host.high_entropy_brands().await {
            Ok(brands) => brands,
            Err(e) => {
                error!("[useragent] 读取高熵 UA 数据失败：{}", e);
                return Self::inconclusive("Cannot read high entropy values of navigator.userAgentData.")
                    .debug(json!({ "error": e.message() }));
            }
        };

        let items: Vec<BrandVersion> = brands
            .into_iter()
            .filter(|item| item.brand == CHROMIUM_BRAND || item.brand == CHROME_BRAND)
            .collect();
        let has_brand = |brand: &str| items.iter().any(|item| item.brand == brand);

        let mut debug = Map::new();
        debug.insert("useragentVersionItems".to_string(), json!(items));

        let verdict = if items.is_empty() {
            Some((
                Rating::Suspicious,
                "Cannot detect Chrome version. These tests are designed for Chromium based browsers only.".to_string(),
            ))
        } else if has_brand(CHROMIUM_BRAND) && !has_brand(CHROME_BRAND) {
            Some((
                Rating::Detected,
                "<div>Google Chrome is not presented in <code>navigator.userAgentData</code>. You might be using Google Chrome for Testing which is a red flag.</div>\n\
                 <div>Try to specify <code>executablePath</code> and use Google Chrome (stable channel).</div>"
                    .to_string(),
            ))
        } else {
            let release = match release_source.latest_stable().await {
                Ok(release) => release,
                Err(e) => {
                    error!("[testUseragent] fetch failed: {}", e);
                    return Self::inconclusive("Cannot fetch the latest stable release of Chrome.")
                        .debug(json!({ "error": e.message() }));
                }
            };

            debug.insert(
                "latestStableRelease".to_string(),
                json!({ "version": release.version, "date": release.date() }),
            );

            let chrome_version = items.iter().find(|item| item.brand == CHROME_BRAND).map(|item| item.version.as_str());
            match chrome_version {
                Some(version) if VersionComparator::compare(version, &release.version) == Ordering::Greater => Some((
                    Rating::Suspicious,
                    "Your Chrome version is higher than the latest stable release. You might be using not Stable channel which is abnormal."
                        .to_string(),
                )),
                _ => None,
            }
        };

        match verdict {
            Some((rating, note)) => NewDetection::new(USERAGENT_TYPE)
                .rating(rating)
                .note(note)
                .debug(Value::Object(debug)),
            None => NewDetection::new(USERAGENT_TYPE)
                .rating(Rating::Clean)
                .note("Google Chrome version is not higher than the latest stable release version which is fine.")
                .debug(Value::Object(debug)),
        }
    }
}

impl Probe for UseragentProbe {
    fn detection_type(&self) -> &'static str {
        USERAGENT_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        // 按字面复现时该判断永远为假，缺少 userAgentData 会在读取高熵值时失败
        if !ctx.config().literal_user_agent_check && !ctx.host.has_user_agent_data() {
            warn!("navigator.userAgentData 不存在，跳过版本比对");
            ctx.submit(Self::inconclusive(
                "Cannot detect Chrome version as navigator.userAgentData is undefined.",
            ));
            return None;
        }

        let task_ctx = ctx.clone();
        Some(tokio::spawn(async move {
            let detection = Self::evaluate(task_ctx.host.as_ref(), task_ctx.release_source.as_ref()).await;
            task_ctx.submit(detection);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigManager, GlobalConfig};
    use crate::host::SimulatedHost;
    use crate::probe::test_support::{harness_with, StubReleaseSource};

    async fn run(host: SimulatedHost, source: StubReleaseSource) -> (NewDetection, usize) {
        let detection = UseragentProbe::evaluate(&host, &source).await;
        (detection, source.calls())
    }

    #[tokio::test]
    async fn test_stable_chrome_is_clean() {
        let (detection, calls) = run(SimulatedHost::new(), StubReleaseSource::ok("131.0.6778.205")).await;
        assert_eq!(detection.effective_rating(), Rating::Clean);
        assert_eq!(calls, 1);
        assert_eq!(
            detection.debug,
            Some(
                json!({
                    "useragentVersionItems": [
                        {"brand": "Chromium", "version": "131.0.6778.205"},
                        {"brand": "Google Chrome", "version": "131.0.6778.205"}
                    ],
                    "latestStableRelease": {"version": "131.0.6778.205", "date": "2024-12-17T20:00:00.000Z"}
                })
                .into()
            )
        );
    }

    #[tokio::test]
    async fn test_ahead_of_stable_is_suspicious() {
        let host = SimulatedHost::new().with_brands(vec![
            BrandVersion::new("Chromium", "132.0.1.0"),
            BrandVersion::new("Google Chrome", "132.0.1.0"),
        ]);
        let (detection, _) = run(host, StubReleaseSource::ok("131.0.6778.204")).await;
        assert_eq!(detection.effective_rating(), Rating::Suspicious);
    }

    #[tokio::test]
    async fn test_chrome_for_testing_is_red_flag() {
        let host = SimulatedHost::new().with_brands(vec![BrandVersion::new("Chromium", "131.0.0.0")]);
        let (detection, calls) = run(host, StubReleaseSource::ok("131.0.0.0")).await;
        assert_eq!(detection.effective_rating(), Rating::Detected);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_non_chromium_is_untested() {
        let host = SimulatedHost::new().with_brands(vec![BrandVersion::new("Microsoft Edge", "131.0.0.0")]);
        let (detection, calls) = run(host, StubReleaseSource::ok("131.0.0.0")).await;
        assert_eq!(detection.effective_rating(), Rating::Suspicious);
        assert_eq!(detection.debug, Some(json!({"useragentVersionItems": []}).into()));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_inconclusive_without_retry() {
        let h = harness_with(
            SimulatedHost::new(),
            StubReleaseSource::failing("Failed to fetch"),
            GlobalConfig::default(),
        );
        let handle = UseragentProbe.start(&h.ctx).expect("异步任务");
        handle.await.unwrap();

        let record = h.ctx.session.detection(USERAGENT_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Inconclusive);
        assert_eq!(record.debug, Some(json!({"error": "Failed to fetch"}).into()));
        assert_eq!(h.source.calls(), 1);
    }

    #[test]
    fn test_missing_user_agent_data() {
        let h = harness_with(
            SimulatedHost::new().without_user_agent_data(),
            StubReleaseSource::ok("131.0.0.0"),
            GlobalConfig::default(),
        );
        assert!(UseragentProbe.start(&h.ctx).is_none());
        assert_eq!(h.ctx.session.detection(USERAGENT_TYPE).unwrap().rating, Rating::Inconclusive);
    }

    #[tokio::test]
    async fn test_literal_check_falls_through_to_lookup() {
        // 测试场景：按字面复现时不做存在性判断，读取高熵值失败后记为无法判断
        let h = harness_with(
            SimulatedHost::new().without_user_agent_data(),
            StubReleaseSource::ok("131.0.0.0"),
            ConfigManager::custom().literal_user_agent_check(true).build(),
        );
        let handle = UseragentProbe.start(&h.ctx).expect("异步任务");
        handle.await.unwrap();

        let record = h.ctx.session.detection(USERAGENT_TYPE).unwrap();
        assert_eq!(record.rating, Rating::Inconclusive);
        assert_eq!(h.source.calls(), 0);
    }
}
