//! 页面值语义辅助
//! 宿主以 `serde_json::Value` 描述页面中的值，`None` 表示 undefined

use serde_json::Value;

/// 对应页面中 `typeof` 的结果
pub fn js_typeof(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::Object(_)) => "object",
    }
}

/// 对应页面中模板字符串插值的结果
pub fn js_display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_display(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
