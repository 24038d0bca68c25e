//! 内存模拟宿主
//! 用于测试与演示：以可配置的方式模拟"正常浏览器"或各类自动化环境的页面特征

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};

use super::{
    BrandVersion, BrowserHost, DomMethod, ExposedFn, GlobalValue, MethodCall, NavigatorSnapshot,
    ScriptLoad, StackTrap, ViewportMetrics,
};
use crate::error::{BdResult, BotDetectorError};

/// 内存模拟宿主
pub struct SimulatedHost {
    globals: RwLock<Vec<(String, GlobalValue)>>,
    exposed: RwLock<HashMap<String, ExposedFn>>,
    dom_methods: RwLock<HashMap<String, DomMethod>>,
    navigator: RwLock<NavigatorSnapshot>,
    viewport: RwLock<ViewportMetrics>,
    // None：页面没有 navigator.userAgentData
    user_agent: RwLock<Option<Result<Vec<BrandVersion>, String>>>,
    script_load: RwLock<ScriptLoad>,
    devtools_attached: AtomicBool,
    logged_errors: AtomicUsize,
    loaded_scripts: Mutex<Vec<String>>,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    /// 创建一个"正常浏览器"宿主：稳定版 Chrome、1920×1080、CSP 生效、无调试器
    pub fn new() -> Self {
        let mut dom_methods: HashMap<String, DomMethod> = HashMap::new();
        dom_methods.insert("getElementById".to_string(), Arc::new(|_: &MethodCall| Value::Null));
        dom_methods.insert(
            "getElementsByClassName".to_string(),
            Arc::new(|_: &MethodCall| json!([])),
        );

        Self {
            globals: RwLock::new(Vec::new()),
            exposed: RwLock::new(HashMap::new()),
            dom_methods: RwLock::new(dom_methods),
            navigator: RwLock::new(NavigatorSnapshot::default()),
            viewport: RwLock::new(ViewportMetrics::new(1920, 1080)),
            user_agent: RwLock::new(Some(Ok(vec![
                BrandVersion::new("Not_A Brand", "24.0.0.0"),
                BrandVersion::new("Chromium", "131.0.6778.205"),
                BrandVersion::new("Google Chrome", "131.0.6778.205"),
            ]))),
            script_load: RwLock::new(ScriptLoad::Failed),
            devtools_attached: AtomicBool::new(false),
            logged_errors: AtomicUsize::new(0),
            loaded_scripts: Mutex::new(Vec::new()),
        }
    }

    // ===== 构建方法 =====

    pub fn with_global(self, name: &str, value: GlobalValue) -> Self {
        self.set_global(name, value);
        self
    }

    pub fn with_navigator(self, navigator: NavigatorSnapshot) -> Self {
        *self.navigator.write() = navigator;
        self
    }

    pub fn with_viewport(self, viewport: ViewportMetrics) -> Self {
        *self.viewport.write() = viewport;
        self
    }

    pub fn with_brands(self, brands: Vec<BrandVersion>) -> Self {
        *self.user_agent.write() = Some(Ok(brands));
        self
    }

    pub fn without_user_agent_data(self) -> Self {
        *self.user_agent.write() = None;
        self
    }

    pub fn with_high_entropy_error(self, message: &str) -> Self {
        *self.user_agent.write() = Some(Err(message.to_string()));
        self
    }

    pub fn with_script_load(self, outcome: ScriptLoad) -> Self {
        *self.script_load.write() = outcome;
        self
    }

    pub fn with_devtools_attached(self) -> Self {
        self.attach_devtools(true);
        self
    }

    pub fn without_dom_method(self, name: &str) -> Self {
        self.dom_methods.write().remove(name);
        self
    }

    // ===== 运行期修改 =====

    /// 设置全局属性（已存在则原位替换，保持枚举顺序）
    pub fn set_global(&self, name: &str, value: GlobalValue) {
        let mut globals = self.globals.write();
        match globals.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => globals.push((name.to_string(), value)),
        }
    }

    pub fn remove_global(&self, name: &str) {
        self.globals.write().retain(|(key, _)| key != name);
        self.exposed.write().remove(name);
    }

    /// 模拟调试器 / Runtime.enable：记录错误时读取其 stack
    pub fn attach_devtools(&self, attached: bool) {
        self.devtools_attached.store(attached, Ordering::SeqCst);
    }

    // ===== 外部调用入口 =====

    /// 调用暴露到全局的函数，None 表示不存在
    pub fn call_global_fn(&self, name: &str) -> Option<Value> {
        // 先释放锁再调用，回调内部可能再次访问宿主
        let func = self.exposed.read().get(name).cloned()?;
        Some(func())
    }

    /// 调用 DOM 方法，None 表示方法不存在
    pub fn call_dom_method(&self, name: &str, call: MethodCall) -> Option<Value> {
        let method = self.dom_methods.read().get(name).cloned()?;
        Some(method(&call))
    }

    pub fn logged_errors(&self) -> usize {
        self.logged_errors.load(Ordering::SeqCst)
    }

    pub fn loaded_scripts(&self) -> Vec<String> {
        self.loaded_scripts.lock().clone()
    }
}

#[async_trait]
impl BrowserHost for SimulatedHost {
    fn global(&self, name: &str) -> Option<GlobalValue> {
        self.globals
            .read()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn global_names(&self) -> Vec<String> {
        self.globals.read().iter().map(|(key, _)| key.clone()).collect()
    }

    fn expose_global_fn(&self, name: &str, func: ExposedFn) {
        self.exposed.write().insert(name.to_string(), func);
        self.set_global(name, GlobalValue::function(format!("function {}() {{ [native code] }}", name)));
    }

    fn console_debug(&self, trap: StackTrap) {
        self.logged_errors.fetch_add(1, Ordering::SeqCst);
        if self.devtools_attached.load(Ordering::SeqCst) {
            let _ = trap.stack();
        }
    }

    fn navigator(&self) -> NavigatorSnapshot {
        self.navigator.read().clone()
    }

    fn viewport(&self) -> ViewportMetrics {
        *self.viewport.read()
    }

    fn has_user_agent_data(&self) -> bool {
        self.user_agent.read().is_some()
    }

    async fn high_entropy_brands(&self) -> BdResult<Vec<BrandVersion>> {
        let user_agent = self.user_agent.read().clone();
        match user_agent {
            Some(Ok(brands)) => Ok(brands),
            Some(Err(message)) => Err(BotDetectorError::HostError(message)),
            None => Err(BotDetectorError::HostError(
                "Cannot read properties of undefined (reading 'getHighEntropyValues')".to_string(),
            )),
        }
    }

    async fn load_script(&self, src: &str) -> ScriptLoad {
        self.loaded_scripts.lock().push(src.to_string());
        *self.script_load.read()
    }

    fn dom_method(&self, name: &str) -> Option<DomMethod> {
        self.dom_methods.read().get(name).cloned()
    }

    fn install_dom_method(&self, name: &str, method: DomMethod) {
        self.dom_methods.write().insert(name.to_string(), method);
    }
}
