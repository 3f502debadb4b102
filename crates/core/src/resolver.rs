//! 主题 token 解析
//!
//! 把 `"primary.main"` 这类点分路径解析为 `var(--mui-palette-primary-main)`。
//! 查不到值时不报错：照样输出 `var()` 引用并标记 `found = false`，
//! 由调用方决定如何汇总警告。

use crate::theme::{is_scalar, Theme, TOKEN_CATEGORIES};
use crate::types::Diagnostic;
use phf::phf_map;

/// CSS 属性 → 该属性默认所属的主题分类
static PROPERTY_THEME_KEYS: phf::Map<&'static str, &'static str> = phf_map! {
    "color" => "palette",
    "bgcolor" => "palette",
    "backgroundColor" => "palette",
    "borderColor" => "palette",
    "borderTopColor" => "palette",
    "borderRightColor" => "palette",
    "borderBottomColor" => "palette",
    "borderLeftColor" => "palette",
    "outlineColor" => "palette",
    "fill" => "palette",
    "stroke" => "palette",
    "boxShadow" => "shadows",
    "zIndex" => "zIndex",
    "fontFamily" => "typography",
    "fontSize" => "typography",
    "fontStyle" => "typography",
    "fontWeight" => "typography",
    "typography" => "typography",
};

/// 属性对应的主题分类（如 `color` → `palette`）
pub fn theme_key_for_property(property: &str) -> Option<&'static str> {
    PROPERTY_THEME_KEYS.get(property).copied()
}

/// 字符串是否长得像主题 token：`category.sub.path`
///
/// 第一段必须以字母开头，所以 `0.5rem`、`1.5` 之类的值不会被误判。
pub fn is_token_shaped(value: &str) -> bool {
    if value.starts_with("var(") || !value.contains('.') {
        return false;
    }

    let mut segments = value.split('.');
    let starts_with_letter = segments
        .next()
        .and_then(|first| first.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic());

    starts_with_letter
        && value.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

/// 一次解析的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResolution {
    /// `var(--mui-palette-primary-main)`
    pub css_var: String,
    /// 实际使用的主题分类
    pub category: String,
    /// 原始 token 路径
    pub path: String,
    /// 主题中是否存在该值
    pub found: bool,
}

impl TokenResolution {
    /// 未命中时对应的警告
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        if self.found {
            return None;
        }
        Some(Diagnostic::warning(format!(
            "Value for key: {} does not exist in \"theme.{}\" or \"theme.vars.{}\"",
            self.path, self.category, self.category
        )))
    }
}

/// 主题 token 解析器
#[derive(Debug, Clone, Copy)]
pub struct TokenResolver<'a> {
    theme: &'a Theme,
    prefix: &'a str,
}

impl<'a> TokenResolver<'a> {
    pub fn new(theme: &'a Theme, prefix: &'a str) -> Self {
        Self { theme, prefix }
    }

    pub fn theme(&self) -> &'a Theme {
        self.theme
    }

    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// 解析 token 路径
    ///
    /// 返回 `None` 表示该字符串不是 token，应原样保留。
    pub fn resolve(&self, path: &str, theme_key: Option<&str>) -> Option<TokenResolution> {
        if !is_token_shaped(path) {
            return None;
        }
        if theme_key == Some("typography") && path == "inherit" {
            return None;
        }

        let segments: Vec<&str> = path.split('.').collect();
        let (category, rest) = self.split_category(&segments, theme_key);

        let found = self
            .theme
            .lookup(category, rest)
            .is_some_and(is_scalar);

        if !found {
            tracing::warn!(
                token = path,
                category,
                "theme value does not exist in \"theme.{category}\" or \"theme.vars.{category}\""
            );
        }

        let mut name_parts: Vec<&str> = Vec::with_capacity(rest.len() + 2);
        if !self.prefix.is_empty() {
            name_parts.push(self.prefix);
        }
        name_parts.push(category);
        name_parts.extend_from_slice(rest);

        Some(TokenResolution {
            css_var: format!("var(--{})", name_parts.join("-")),
            category: category.to_string(),
            path: path.to_string(),
            found,
        })
    }

    /// 以 CSS 属性名为上下文解析（`color: "primary.main"` 默认落在 `palette`）
    pub fn resolve_for_property(&self, property: &str, value: &str) -> Option<TokenResolution> {
        self.resolve(value, theme_key_for_property(property))
    }

    /// 确定分类以及分类下的剩余路径
    fn split_category<'p>(
        &self,
        segments: &'p [&'p str],
        theme_key: Option<&'p str>,
    ) -> (&'p str, &'p [&'p str]) {
        if let Some(key) = theme_key {
            // `color: "palette.primary.main"` 与 `color: "primary.main"` 等价
            return match segments.split_first() {
                Some((first, rest)) if *first == key && !rest.is_empty() => (key, rest),
                _ => (key, segments),
            };
        }

        let first = segments[0];
        if self.theme.has_category(first) {
            return (first, &segments[1..]);
        }

        // `"primary.main"` 不带分类：在已知分类里找第一个包含完整路径的
        if let Some(category) = TOKEN_CATEGORIES
            .iter()
            .copied()
            .find(|category| self.theme.lookup(category, segments).is_some_and(is_scalar))
        {
            return (category, segments);
        }

        (first, &segments[1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn palette_theme() -> Theme {
        Theme::from_value(json!({
            "palette": {
                "primary": { "main": "#ff0000" },
                "secondary": { "main": "#00ff00" },
                "grey": { "500": "#999" }
            },
            "typography": { "fontFamily": "Roboto", "body1": { "fontSize": "1rem" } },
            "zIndex": { "modal": 1300 },
            "vars": { "shape": { "borderRadius": "var(--r)" } }
        }))
    }

    #[test]
    fn test_token_shape() {
        assert!(is_token_shaped("primary.main"));
        assert!(is_token_shaped("grey.500"));
        assert!(is_token_shaped("palette.primary.main"));
        assert!(!is_token_shaped("primary"));
        assert!(!is_token_shaped("0.5rem"));
        assert!(!is_token_shaped("1.5"));
        assert!(!is_token_shaped("var(--a.b)"));
        assert!(!is_token_shaped("1px solid primary.main"));
        assert!(!is_token_shaped("a..b"));
        assert!(!is_token_shaped("url(a.png)"));
    }

    #[test]
    fn test_resolve_without_category() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        let resolution = resolver.resolve("primary.main", None).unwrap();
        assert_eq!(resolution.css_var, "var(--mui-palette-primary-main)");
        assert_eq!(resolution.category, "palette");
        assert!(resolution.found);
    }

    #[test]
    fn test_resolve_explicit_category() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        let resolution = resolver.resolve("zIndex.modal", None).unwrap();
        assert_eq!(resolution.css_var, "var(--mui-zIndex-modal)");
        assert!(resolution.found);
    }

    #[test]
    fn test_resolve_with_theme_key_override() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");

        let resolution = resolver.resolve_for_property("color", "grey.500").unwrap();
        assert_eq!(resolution.css_var, "var(--mui-palette-grey-500)");
        assert!(resolution.found);

        let prefixed = resolver
            .resolve_for_property("color", "palette.primary.main")
            .unwrap();
        assert_eq!(prefixed.css_var, "var(--mui-palette-primary-main)");
    }

    #[test]
    fn test_resolve_vars_fallback() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        let resolution = resolver.resolve("shape.borderRadius", None).unwrap();
        assert_eq!(resolution.css_var, "var(--mui-shape-borderRadius)");
        assert!(resolution.found);
    }

    #[test]
    fn test_unresolved_token_still_yields_var() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        let resolution = resolver.resolve("nonexistent.path", None).unwrap();
        assert_eq!(resolution.css_var, "var(--mui-nonexistent-path)");
        assert!(!resolution.found);

        let diagnostic = resolution.diagnostic().unwrap();
        assert!(diagnostic.is_warning());
        assert!(diagnostic.message.contains("nonexistent.path"));
    }

    #[test]
    fn test_object_value_is_not_found() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        let resolution = resolver.resolve("typography.body1", None).unwrap();
        assert!(!resolution.found);
    }

    #[test]
    fn test_literal_passthrough() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        assert_eq!(resolver.resolve("red", None), None);
        assert_eq!(resolver.resolve("inherit", Some("typography")), None);
        assert_eq!(resolver.resolve_for_property("fontFamily", "inherit"), None);
    }

    #[test]
    fn test_empty_prefix() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "");
        let resolution = resolver.resolve("primary.main", None).unwrap();
        assert_eq!(resolution.css_var, "var(--palette-primary-main)");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let theme = palette_theme();
        let resolver = TokenResolver::new(&theme, "mui");
        assert_eq!(
            resolver.resolve("secondary.main", None),
            resolver.resolve("secondary.main", None)
        );
    }
}
