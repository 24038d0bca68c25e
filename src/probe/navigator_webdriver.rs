//! 自动化标记探针（navigatorWebdriver）
//! 单次同步检测，按优先级依次检查 `navigator.webdriver` 的值与属性形态

use serde_json::Value;
use tokio::task::JoinHandle;

use super::{Probe, ProbeContext};
use crate::detection::{NewDetection, Rating};
use crate::host::NavigatorSnapshot;
use crate::utils::{js_display, js_typeof};

pub const NAVIGATOR_WEBDRIVER_TYPE: &str = "navigatorWebdriver";

/// 自动化标记探针
pub struct NavigatorWebdriverProbe;

impl NavigatorWebdriverProbe {
    /// 检测 navigator 快照
    pub fn evaluate(navigator: &NavigatorSnapshot) -> NewDetection {
        let webdriver = navigator.webdriver.as_ref();

        let finding = if webdriver == Some(&Value::Bool(true)) {
            Some((
                "<code>navigator.webdriver = true</code> indicates that browser is automated. Use <code>--disable-blink-features=AutomationControlled</code> switch for Chrome.".to_string(),
                format!("typeof navigator.webdriver = {}; navigator.webdriver = true", js_typeof(webdriver)),
            ))
        } else if webdriver.is_none() {
            Some((
                "This property shouldn't be undefined. You might have it deleted manually.".to_string(),
                format!("typeof navigator.webdriver = {}", js_typeof(webdriver)),
            ))
        } else if !navigator.own_property_names.is_empty() {
            let names = serde_json::to_string(&navigator.own_property_names).unwrap_or_default();
            Some((
                "<code>Object.getOwnPropertyNames(navigator)</code> should return empty array.".to_string(),
                format!("Object.getOwnPropertyNames(navigator) = {}", names),
            ))
        } else {
            navigator.webdriver_descriptor.as_ref().map(|descriptor| {
                (
                    "<code>Object.getOwnPropertyDescriptor(navigator, 'webdriver')</code> should return undefined.".to_string(),
                    format!(
                        "Object.getOwnPropertyDescriptor(navigator, 'webdriver') = {}",
                        js_display(descriptor)
                    ),
                )
            })
        };

        match finding {
            Some((note, debug)) => NewDetection::new(NAVIGATOR_WEBDRIVER_TYPE)
                .rating(Rating::Detected)
                .note(note)
                .debug(debug),
            None => NewDetection::new(NAVIGATOR_WEBDRIVER_TYPE)
                .rating(Rating::Clean)
                .note("No webdriver presented."),
        }
    }
}

impl Probe for NavigatorWebdriverProbe {
    fn detection_type(&self) -> &'static str {
        NAVIGATOR_WEBDRIVER_TYPE
    }

    fn start(&self, ctx: &ProbeContext) -> Option<JoinHandle<()>> {
        ctx.submit(Self::evaluate(&ctx.host.navigator()));
        None
    }
}
