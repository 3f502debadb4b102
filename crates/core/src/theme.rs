//! 主题对象
//!
//! 主题由外部以 JSON 形式提供，这里只负责按路径查值。
//! 顶层分类中只有 [`TOKEN_CATEGORIES`] 会被写成全局 CSS 变量，
//! 其他键仍可被 token 解析器按路径查到。

use serde_json::{Map, Value};

/// 生成全局 CSS 变量时遍历的顶层分类（顺序即输出顺序）
pub const TOKEN_CATEGORIES: [&str; 7] = [
    "palette",
    "shadows",
    "shape",
    "typography",
    "zIndex",
    "direction",
    "transitions",
];

/// 存放 CSS 变量版主题的键（`theme.vars.palette...`）
const VARS_KEY: &str = "vars";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    root: Map<String, Value>,
}

impl Theme {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// 从 JSON 值构造；非对象的值得到空主题
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// 顶层分类
    pub fn category(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// `theme.vars` 下的分类
    pub fn vars_category(&self, name: &str) -> Option<&Value> {
        self.root.get(VARS_KEY)?.get(name)
    }

    /// 是否存在该顶层键（包括 `theme.vars` 下）
    pub fn has_category(&self, name: &str) -> bool {
        self.category(name).is_some() || self.vars_category(name).is_some()
    }

    /// 在 `theme[category]` 中按 segments 查值，未命中时回退到 `theme.vars[category]`
    pub fn lookup(&self, category: &str, segments: &[&str]) -> Option<&Value> {
        self.category(category)
            .and_then(|value| walk(value, segments))
            .or_else(|| {
                self.vars_category(category)
                    .and_then(|value| walk(value, segments))
            })
    }

    /// 从主题根开始按完整路径查值（如 `["palette", "primary", "main"]`）
    pub fn get_path(&self, segments: &[&str]) -> Option<&Value> {
        let (first, rest) = segments.split_first()?;
        walk(self.root.get(*first)?, rest)
    }
}

impl From<Value> for Theme {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// 逐段下钻，数组用数字下标
fn walk<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// 值是否可以作为 token 的解析结果（字符串 / 数字 / 布尔）
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// 按 JS 的 `toString` 规则把标量转成字符串
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

/// 数字格式化：整数不带小数点（`1.0` → `1`），其余使用最短表示
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
