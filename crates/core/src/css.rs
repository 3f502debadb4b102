//! 样式树 → CSS 文本
//!
//! 只处理已经不含函数的样式树（函数叶子会被跳过）。
//! 同一层先输出声明，再按插入顺序输出嵌套规则。

use crate::style::{Literal, StyleTree, StyleValue};
use crate::theme::format_number;
use crate::unitless::is_unit_less;

const INDENT: &str = "  ";

/// camelCase → kebab-case（`backgroundColor` → `background-color`）
pub fn kebab_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    for (i, ch) in input.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                result.push('-');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// 样式键 → CSS 属性名，处理厂商前缀与自定义属性
pub fn css_property_name(key: &str) -> String {
    if key.starts_with("--") || key.contains('-') {
        return key.to_string();
    }
    // msTransform → -ms-transform（ms 是小写开头的特例）
    if let Some(rest) = key.strip_prefix("ms") {
        if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
            return format!("-ms-{}", kebab_case(rest));
        }
    }
    let kebab = kebab_case(key);
    for vendor in ["webkit-", "moz-"] {
        if kebab.starts_with(vendor) && key.starts_with(|c: char| c.is_ascii_uppercase()) {
            return format!("-{}", kebab);
        }
    }
    kebab
}

/// 字面量 → CSS 值；数字按需补 `px`，布尔值不输出
pub fn css_value(property: &str, value: &Literal) -> Option<String> {
    match value {
        Literal::Str(s) => Some(s.clone()),
        Literal::Num(n) if *n == 0.0 || is_unit_less(property) => Some(format_number(*n)),
        Literal::Num(n) => Some(format!("{}px", format_number(*n))),
        Literal::Bool(_) => None,
    }
}

/// 扁平化后的一条规则
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatRule {
    at_rules: Vec<String>,
    selector: String,
    declarations: Vec<(String, String)>,
}

/// 将样式树渲染为以 `selector` 为根的 CSS 规则
pub fn render_style_rules<F>(selector: &str, tree: &StyleTree<F>) -> String {
    let mut rules = Vec::new();
    flatten(tree, selector, &[], &mut rules);

    let mut css = String::new();
    for rule in &rules {
        write_rule(&mut css, rule);
    }
    css
}

fn flatten<F>(tree: &StyleTree<F>, selector: &str, at_rules: &[String], out: &mut Vec<FlatRule>) {
    let mut declarations = Vec::new();
    for (key, value) in &tree.entries {
        match value {
            StyleValue::Literal(literal) => {
                if let Some(v) = css_value(key, literal) {
                    declarations.push((css_property_name(key), v));
                }
            }
            // 数组值：每一项一条声明（常用于回退值）
            StyleValue::Array(items) => {
                for item in items {
                    if let StyleValue::Literal(literal) = item {
                        if let Some(v) = css_value(key, literal) {
                            declarations.push((css_property_name(key), v));
                        }
                    }
                }
            }
            StyleValue::Function(_) | StyleValue::Nested(_) => {}
        }
    }

    if !declarations.is_empty() {
        out.push(FlatRule {
            at_rules: at_rules.to_vec(),
            selector: selector.to_string(),
            declarations,
        });
    }

    for (key, value) in &tree.entries {
        let StyleValue::Nested(nested) = value else {
            continue;
        };
        let key = key.trim();
        if key.starts_with('@') {
            let mut wrapped = at_rules.to_vec();
            wrapped.push(key.to_string());
            flatten(nested, selector, &wrapped, out);
        } else {
            flatten(nested, &nest_selector(selector, key), at_rules, out);
        }
    }
}

/// 组合父子选择器：`&` 替换为父选择器，否则作为后代选择器
pub fn nest_selector(parent: &str, child: &str) -> String {
    let parents = split_selector_list(parent);
    let mut combined = Vec::new();

    for child_part in split_selector_list(child) {
        for parent_part in &parents {
            if child_part.contains('&') {
                combined.push(child_part.replace('&', parent_part));
            } else {
                combined.push(format!("{} {}", parent_part, child_part));
            }
        }
    }

    combined.join(", ")
}

/// 按顶层逗号拆分选择器列表（括号内的逗号不拆）
fn split_selector_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in selector.chars() {
        match ch {
            '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

fn write_rule(css: &mut String, rule: &FlatRule) {
    let depth = rule.at_rules.len();

    for (level, at_rule) in rule.at_rules.iter().enumerate() {
        css.push_str(&INDENT.repeat(level));
        css.push_str(&format!("{} {{\n", at_rule));
    }

    let pad = INDENT.repeat(depth);
    css.push_str(&format!("{}{} {{\n", pad, rule.selector));
    for (property, value) in &rule.declarations {
        css.push_str(&format!("{}{}{}: {};\n", pad, INDENT, property, value));
    }
    css.push_str(&format!("{}}}\n", pad));

    for level in (0..depth).rev() {
        css.push_str(&INDENT.repeat(level));
        css.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tree = StyleTree<()>;

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("backgroundColor"), "background-color");
        assert_eq!(kebab_case("PrimaryButton"), "primary-button");
        assert_eq!(kebab_case("color"), "color");
    }

    #[test]
    fn test_property_names() {
        assert_eq!(css_property_name("zIndex"), "z-index");
        assert_eq!(css_property_name("WebkitTransition"), "-webkit-transition");
        assert_eq!(css_property_name("MozAppearance"), "-moz-appearance");
        assert_eq!(css_property_name("msTransform"), "-ms-transform");
        assert_eq!(css_property_name("--my-var"), "--my-var");
        assert_eq!(css_property_name("font-size"), "font-size");
    }

    #[test]
    fn test_numeric_units() {
        assert_eq!(css_value("padding", &Literal::Num(20.0)).as_deref(), Some("20px"));
        assert_eq!(css_value("opacity", &Literal::Num(0.5)).as_deref(), Some("0.5"));
        assert_eq!(css_value("margin", &Literal::Num(0.0)).as_deref(), Some("0"));
        assert_eq!(css_value("display", &Literal::Bool(true)), None);
    }

    #[test]
    fn test_render_flat_rule() {
        let tree = Tree::new()
            .with_literal("marginLeft", 20.0)
            .with_literal("width", "50%");

        let css = render_style_rules(".box", &tree);
        assert_eq!(css, ".box {\n  margin-left: 20px;\n  width: 50%;\n}\n");
    }

    #[test]
    fn test_render_nested_and_media() {
        let tree = Tree::new()
            .with_literal("color", "red")
            .with_nested("&:hover, &:focus", Tree::new().with_literal("color", "blue"))
            .with_nested(".icon", Tree::new().with_literal("fill", "currentColor"))
            .with_nested(
                "@media (min-width: 600px)",
                Tree::new().with_literal("padding", 8.0),
            );

        let css = render_style_rules(".btn", &tree);
        println!("{}", css);

        assert!(css.starts_with(".btn {\n  color: red;\n}\n"));
        assert!(css.contains(".btn:hover, .btn:focus {\n  color: blue;\n}\n"));
        assert!(css.contains(".btn .icon {\n  fill: currentColor;\n}\n"));
        assert!(css.contains("@media (min-width: 600px) {\n  .btn {\n    padding: 8px;\n  }\n}\n"));
    }

    #[test]
    fn test_render_array_fallbacks() {
        let tree = Tree::new().with(
            "backgroundColor",
            StyleValue::Array(vec![
                StyleValue::Literal(Literal::from("red")),
                StyleValue::Literal(Literal::from("rgba(255, 0, 0, 0.5)")),
            ]),
        );

        let css = render_style_rules(".a", &tree);
        assert_eq!(
            css,
            ".a {\n  background-color: red;\n  background-color: rgba(255, 0, 0, 0.5);\n}\n"
        );
    }

    #[test]
    fn test_nest_selector_keeps_parenthesised_commas() {
        assert_eq!(
            nest_selector(".a", "&:is(.b, .c)"),
            ".a:is(.b, .c)"
        );
        assert_eq!(nest_selector(".a, .b", "& > span"), ".a > span, .b > span");
    }

    #[test]
    fn test_empty_tree_renders_nothing() {
        assert_eq!(render_style_rules(".a", &Tree::new()), "");
    }
}
