//! DOM 方法插桩：包装原方法，先执行检测再转发给原方法
use std::sync::Arc;
use tracing::debug;

use super::{BrowserHost, DomMethod, MethodCall};
use crate::error::{BdResult, BotDetectorError};

/// 包装 DOM 方法：调用时先执行 `inspect`，再原样转发并返回原方法的结果
pub fn wrap_dom_method<F>(original: DomMethod, inspect: F) -> DomMethod
where
    F: Fn(&MethodCall) + Send + Sync + 'static,
{
    Arc::new(move |call: &MethodCall| {
        inspect(call);
        original(call)
    })
}

/// 在宿主上安装包装后的 DOM 方法（单次显式注册）
pub fn instrument_dom_method<F>(host: &dyn BrowserHost, name: &str, inspect: F) -> BdResult<()>
where
    F: Fn(&MethodCall) + Send + Sync + 'static,
{
    let original = host
        .dom_method(name)
        .ok_or_else(|| BotDetectorError::MissingCapability(format!("document.{}", name)))?;

    host.install_dom_method(name, wrap_dom_method(original, inspect));
    debug!("DOM方法已插桩：document.{}", name);
    Ok(())
}
