//! 主题 → 全局 CSS 变量
//!
//! 只遍历 [`TOKEN_CATEGORIES`] 中的分类；每个标量叶子生成一条
//! `--{prefix}-{category}-{path}: value;`。

use crate::theme::{scalar_to_string, Theme, TOKEN_CATEGORIES};
use crate::types::CssVariableSet;
use indexmap::IndexMap;
use serde_json::Value;

/// 主题 CSS 生成选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCssOptions {
    /// 默认主题的变量是否写在 `:root` 上（默认 true）
    pub inject_in_root: bool,
    /// 默认主题在主题参数表中的键（默认 `"theme"`）
    pub default_theme_key: String,
}

impl Default for ThemeCssOptions {
    fn default() -> Self {
        Self {
            inject_in_root: true,
            default_theme_key: "theme".to_string(),
        }
    }
}

/// 生成单个主题的 CSS 变量集合
pub fn generate_css_variables(theme: &Theme, prefix: &str) -> CssVariableSet {
    let mut variables = CssVariableSet::new();
    for category in TOKEN_CATEGORIES {
        let Some(value) = theme.category(category) else {
            continue;
        };
        let mut path = vec![prefix.to_string(), category.to_string()];
        collect_variables(value, &mut path, &mut variables);
    }
    variables
}

fn collect_variables(value: &Value, path: &mut Vec<String>, variables: &mut CssVariableSet) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                collect_variables(item, path, variables);
                path.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                path.push(key.clone());
                collect_variables(item, path, variables);
                path.pop();
            }
        }
        Value::Null => {}
        scalar => {
            if let Some(serialized) = scalar_to_string(scalar) {
                let name: Vec<&str> = path
                    .iter()
                    .map(String::as_str)
                    .filter(|segment| !segment.is_empty())
                    .collect();
                variables.insert(format!("--{}", name.join("-")), serialized);
            }
        }
    }
}

/// 主题的选择器：默认主题写在 `:root`，其余写在 `.{key}`
fn theme_selector(theme_key: &str, options: &ThemeCssOptions) -> String {
    if theme_key == options.default_theme_key && options.inject_in_root {
        ":root".to_string()
    } else {
        format!(".{}", theme_key)
    }
}

/// 为每个主题生成一个规则块，按参数表顺序拼接
pub fn generate_theme_css(
    themes: &IndexMap<String, Theme>,
    prefix: &str,
    options: &ThemeCssOptions,
) -> String {
    let mut css = String::new();

    for (theme_key, theme) in themes {
        let variables = generate_css_variables(theme, prefix);
        css.push_str(&format!("{} {{\n", theme_selector(theme_key, options)));
        for (name, value) in &variables {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push_str("}\n");
    }

    css
}

/// 主题 token 对象：结构同主题，标量叶子换成对应的 `var()` 引用
///
/// 供运行时 `theme` 虚拟模块导出，组件代码拿到的都是变量引用而非具体值。
pub fn generate_theme_tokens(theme: &Theme, prefix: &str) -> Value {
    let mut tokens = serde_json::Map::new();
    for category in TOKEN_CATEGORIES {
        let Some(value) = theme.category(category) else {
            continue;
        };
        let mut path = vec![prefix.to_string(), category.to_string()];
        tokens.insert(category.to_string(), tokenize(value, &mut path));
    }
    Value::Object(tokens)
}

fn tokenize(value: &Value, path: &mut Vec<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    path.push(index.to_string());
                    let token = tokenize(item, path);
                    path.pop();
                    token
                })
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    path.push(key.clone());
                    let token = tokenize(item, path);
                    path.pop();
                    (key.clone(), token)
                })
                .collect(),
        ),
        Value::Null => Value::Null,
        _ => {
            let name: Vec<&str> = path
                .iter()
                .map(String::as_str)
                .filter(|segment| !segment.is_empty())
                .collect();
            Value::String(format!("var(--{})", name.join("-")))
        }
    }
}
