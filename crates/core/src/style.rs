//! 样式树
//!
//! 一个 styled 组件的样式定义：属性、嵌套选择器、at-rule 以及 `variants`。
//! 值的种类用枚举区分，遍历时穷尽匹配，不做运行时类型嗅探。
//! `F` 是前端对“运行时函数”的表示（SWC 前端里是函数表达式 + span）。

use crate::theme::format_number;
use indexmap::IndexMap;

/// 字面量
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            Literal::Num(n) => f.write_str(&format_number(*n)),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Num(value)
    }
}

/// 样式值
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue<F> {
    Literal(Literal),
    /// 依赖运行时 props 的函数
    Function(F),
    /// 嵌套选择器 / at-rule
    Nested(StyleTree<F>),
    /// 多值（如 `backgroundColor: [a, b]`），对函数提取器不透明
    Array(Vec<StyleValue<F>>),
}

impl<F> StyleValue<F> {
    pub fn is_function(&self) -> bool {
        matches!(self, StyleValue::Function(_))
    }
}

/// 条件样式：`props` 全部匹配时追加 `style`
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<F> {
    pub props: IndexMap<String, Literal>,
    pub style: StyleTree<F>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleTree<F> {
    pub entries: IndexMap<String, StyleValue<F>>,
    /// 只有顶层的 `variants` 键会被识别
    pub variants: Vec<Variant<F>>,
}

impl<F> Default for StyleTree<F> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            variants: Vec::new(),
        }
    }
}

impl<F> StyleTree<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个键值，返回 self（builder 风格，便于测试构造）
    pub fn with(mut self, key: impl Into<String>, value: StyleValue<F>) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn with_literal(self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.with(key, StyleValue::Literal(value.into()))
    }

    pub fn with_nested(self, key: impl Into<String>, tree: StyleTree<F>) -> Self {
        self.with(key, StyleValue::Nested(tree))
    }

    pub fn with_variant(mut self, variant: Variant<F>) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue<F>> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.variants.is_empty()
    }

    /// 树中（含嵌套与 variants，不含数组）函数叶子的数量
    pub fn function_count(&self) -> usize {
        let own: usize = self
            .entries
            .values()
            .map(|value| match value {
                StyleValue::Function(_) => 1,
                StyleValue::Nested(tree) => tree.function_count(),
                StyleValue::Literal(_) | StyleValue::Array(_) => 0,
            })
            .sum();
        own + self
            .variants
            .iter()
            .map(|variant| variant.style.function_count())
            .sum::<usize>()
    }
}
