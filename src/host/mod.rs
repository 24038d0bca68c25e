//! 宿主模块：探针可用的页面能力边界
//! 页面 DOM、全局对象、网络加载等均通过 `BrowserHost` 注入，引擎本身不依赖具体页面实现
pub mod instrument;
pub mod simulated;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BdResult;

pub use self::instrument::{instrument_dom_method, wrap_dom_method};
pub use self::simulated::SimulatedHost;

/// 暴露到页面全局的零参函数
pub type ExposedFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// 页面 DOM 方法（可被包装替换）
pub type DomMethod = Arc<dyn Fn(&MethodCall) -> Value + Send + Sync>;

/// 页面全局属性的值
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalValue {
    /// 函数：源码文本 + 挂在函数对象上的属性
    Function {
        source: String,
        properties: Map<String, Value>,
    },
    /// 普通值
    Value(Value),
}

impl GlobalValue {
    pub fn function(source: impl Into<String>) -> Self {
        GlobalValue::Function {
            source: source.into(),
            properties: Map::new(),
        }
    }

    /// 为函数追加属性（非函数值忽略）
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        if let GlobalValue::Function { properties, .. } = &mut self {
            properties.insert(key.into(), value);
        }
        self
    }

    pub fn is_function(&self) -> bool {
        matches!(self, GlobalValue::Function { .. })
    }

    /// 函数对象上的属性
    pub fn property(&self, key: &str) -> Option<&Value> {
        match self {
            GlobalValue::Function { properties, .. } => properties.get(key),
            GlobalValue::Value(Value::Object(map)) => map.get(key),
            GlobalValue::Value(_) => None,
        }
    }

    /// 对应页面中 `toString()` 的结果
    pub fn source_text(&self) -> String {
        match self {
            GlobalValue::Function { source, .. } => source.clone(),
            GlobalValue::Value(value) => crate::utils::js_display(value),
        }
    }

    /// JSON 序列化视图（函数不可序列化，输出 null）
    pub fn to_json(&self) -> Value {
        match self {
            GlobalValue::Function { .. } => Value::Null,
            GlobalValue::Value(value) => value.clone(),
        }
    }
}

/// 计数型 stack 访问陷阱
/// 正常页面记录错误时不会读取 stack，调试协议会主动读取
#[derive(Debug, Clone, Default)]
pub struct StackTrap {
    lookups: Arc<AtomicU64>,
}

impl StackTrap {
    pub fn new(lookups: Arc<AtomicU64>) -> Self {
        Self { lookups }
    }

    /// 读取 stack：计数加一并返回空串
    pub fn stack(&self) -> String {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        String::new()
    }

    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

/// navigator 对象快照
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorSnapshot {
    /// `navigator.webdriver`，None 表示 undefined
    pub webdriver: Option<Value>,
    /// `Object.getOwnPropertyNames(navigator)`
    pub own_property_names: Vec<String>,
    /// `Object.getOwnPropertyDescriptor(navigator, 'webdriver')`
    pub webdriver_descriptor: Option<Value>,
}

impl Default for NavigatorSnapshot {
    fn default() -> Self {
        Self {
            webdriver: Some(Value::Bool(false)),
            own_property_names: Vec::new(),
            webdriver_descriptor: None,
        }
    }
}

/// 视口尺寸（缺失的值按 0 处理）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportMetrics {
    pub document_client_width: Option<u32>,
    pub document_client_height: Option<u32>,
    pub inner_width: Option<u32>,
    pub inner_height: Option<u32>,
}

impl ViewportMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            document_client_width: Some(width),
            document_client_height: Some(height),
            inner_width: Some(width),
            inner_height: Some(height),
        }
    }

    /// 文档与窗口尺寸中的较大值
    pub fn effective_size(&self) -> (u32, u32) {
        let width = self.document_client_width.unwrap_or(0).max(self.inner_width.unwrap_or(0));
        let height = self.document_client_height.unwrap_or(0).max(self.inner_height.unwrap_or(0));
        (width, height)
    }
}

/// `navigator.userAgentData` 高熵值中的品牌版本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandVersion {
    pub brand: String,
    pub version: String,
}

impl BrandVersion {
    pub fn new(brand: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            version: version.into(),
        }
    }
}

/// 外部脚本加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLoad {
    Loaded,
    Failed,
}

/// 一次 DOM 方法调用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodCall {
    /// 调用参数
    pub args: Vec<Value>,
    /// 调用方上下文中新建错误对象得到的 stack 文本
    pub stack: String,
}

impl MethodCall {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            stack: String::new(),
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}

/// 宿主页面能力
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// 读取页面全局属性，None 表示 undefined
    fn global(&self, name: &str) -> Option<GlobalValue>;

    /// 枚举页面定义的全局属性名（不含引擎内部状态）
    fn global_names(&self) -> Vec<String>;

    /// 在页面全局暴露零参函数
    fn expose_global_fn(&self, name: &str, func: ExposedFn);

    /// 以调试级别记录一个 stack 带陷阱的错误对象
    fn console_debug(&self, trap: StackTrap);

    /// navigator 快照
    fn navigator(&self) -> NavigatorSnapshot;

    /// 视口尺寸
    fn viewport(&self) -> ViewportMetrics;

    /// 是否提供 `navigator.userAgentData`
    fn has_user_agent_data(&self) -> bool;

    /// `getHighEntropyValues(['fullVersionList'])`
    async fn high_entropy_brands(&self) -> BdResult<Vec<BrandVersion>>;

    /// 注入外部脚本并等待加载结果
    async fn load_script(&self, src: &str) -> ScriptLoad;

    /// 读取当前的 DOM 方法
    fn dom_method(&self, name: &str) -> Option<DomMethod>;

    /// 替换 DOM 方法
    fn install_dom_method(&self, name: &str, method: DomMethod);
}
