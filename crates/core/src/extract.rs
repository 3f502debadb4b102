//! 函数提取
//!
//! 深度优先遍历样式树，把依赖 props 的函数叶子换成 `var(--id)`，
//! 并记录 `(id, 改写后的表达式, 是否无单位)`。函数体内的 token 字符串
//! 交给 [`FunctionRewriter`] 改写，核心层不关心函数的具体表示。

use crate::error::StyleError;
use crate::naming::NamingStrategy;
use crate::resolver::TokenResolver;
use crate::style::{Literal, StyleTree, StyleValue};
use crate::types::Diagnostic;
use crate::unitless::is_unit_less;
use std::marker::PhantomData;

/// 运行时函数的改写接口
///
/// 由前端实现（SWC 前端直接在函数 AST 上改写字符串字面量）。
pub trait FunctionRewriter<F> {
    /// 改写结果的表示，如表达式 AST
    type Expr;

    /// 函数的原始源码，用于生成稳定的变量名
    fn source_text(&self, key: &str, func: &F) -> Result<String, StyleError>;

    /// 把函数内的 token 字符串替换为 `var(--...)`
    ///
    /// 未命中的 token 追加到 `diagnostics`，不视为错误。
    fn rewrite(
        &mut self,
        key: &str,
        func: &F,
        tokens: &TokenResolver<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Self::Expr, StyleError>;
}

/// 一个动态值绑定
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding<E> {
    pub variable_id: String,
    pub expression: E,
    pub is_unit_less: bool,
}

/// 提取结果：改写后的树 + 按遍历顺序排列的绑定
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<F, E> {
    pub tree: StyleTree<F>,
    pub bindings: Vec<VariableBinding<E>>,
}

pub fn extract_functions<F, R>(
    mut tree: StyleTree<F>,
    tokens: &TokenResolver<'_>,
    naming: &dyn NamingStrategy,
    rewriter: &mut R,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Extraction<F, R::Expr>, StyleError>
where
    R: FunctionRewriter<F>,
{
    let mut extractor = Extractor {
        tokens,
        naming,
        rewriter,
        diagnostics,
        bindings: Vec::new(),
        _function: PhantomData,
    };
    extractor.visit_tree(&mut tree)?;

    Ok(Extraction {
        tree,
        bindings: extractor.bindings,
    })
}

struct Extractor<'a, 't, R: FunctionRewriter<F>, F> {
    tokens: &'a TokenResolver<'t>,
    naming: &'a dyn NamingStrategy,
    rewriter: &'a mut R,
    diagnostics: &'a mut Vec<Diagnostic>,
    bindings: Vec<VariableBinding<R::Expr>>,
    _function: PhantomData<fn(&F)>,
}

impl<R: FunctionRewriter<F>, F> Extractor<'_, '_, R, F> {
    fn visit_tree(&mut self, tree: &mut StyleTree<F>) -> Result<(), StyleError> {
        for (key, value) in tree.entries.iter_mut() {
            let replacement = match value {
                StyleValue::Nested(nested) => {
                    self.visit_tree(nested)?;
                    None
                }
                StyleValue::Function(func) => Some(self.extract(key, func)?),
                // 数组对提取器不透明；数组里的函数原样保留
                StyleValue::Array(_) | StyleValue::Literal(_) => None,
            };

            if let Some(replacement) = replacement {
                *value = replacement;
            }
        }

        for variant in tree.variants.iter_mut() {
            self.visit_tree(&mut variant.style)?;
        }

        Ok(())
    }

    fn extract(&mut self, key: &str, func: &F) -> Result<StyleValue<F>, StyleError> {
        let source = self.rewriter.source_text(key, func)?;
        let expression = self
            .rewriter
            .rewrite(key, func, self.tokens, self.diagnostics)?;
        let unit_less = is_unit_less(key);
        let variable_id = self.naming.variable_name(key, &source, unit_less);

        self.bindings.push(VariableBinding {
            variable_id: variable_id.clone(),
            expression,
            is_unit_less: unit_less,
        });

        Ok(StyleValue::Literal(Literal::Str(format!(
            "var(--{})",
            variable_id
        ))))
    }
}

/// 静态 token 改写：把纯字符串 token（`color: "primary.main"`）换成 `var()` 引用
///
/// 与函数提取互不依赖；数组里的字符串也会被改写。
pub fn resolve_static_tokens<F>(
    tree: &mut StyleTree<F>,
    tokens: &TokenResolver<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (key, value) in tree.entries.iter_mut() {
        match value {
            StyleValue::Literal(literal) => resolve_literal(key, literal, tokens, diagnostics),
            StyleValue::Array(items) => {
                for item in items.iter_mut() {
                    if let StyleValue::Literal(literal) = item {
                        resolve_literal(key, literal, tokens, diagnostics);
                    }
                }
            }
            StyleValue::Nested(nested) => resolve_static_tokens(nested, tokens, diagnostics),
            StyleValue::Function(_) => {}
        }
    }

    for variant in tree.variants.iter_mut() {
        resolve_static_tokens(&mut variant.style, tokens, diagnostics);
    }
}

fn resolve_literal(
    key: &str,
    literal: &mut Literal,
    tokens: &TokenResolver<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Literal::Str(value) = literal else {
        return;
    };
    if let Some(resolution) = tokens.resolve_for_property(key, value) {
        diagnostics.extend(resolution.diagnostic());
        *value = resolution.css_var;
    }
}
