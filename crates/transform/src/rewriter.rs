use crate::strip_empty_line_markers;
use crate::style_object::{str_value, JsFunction};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap, SourceMapper, Span};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use zerostyle_core::{Diagnostic, FunctionRewriter, StyleError, TokenResolver};

/// SWC 前端的函数改写器
///
/// 直接在函数 AST 上把 token 字符串替换为 `var(--...)`，
/// 原始函数从不被执行。
pub struct SwcFunctionRewriter<'a> {
    cm: &'a Lrc<SourceMap>,
}

impl<'a> SwcFunctionRewriter<'a> {
    pub fn new(cm: &'a Lrc<SourceMap>) -> Self {
        Self { cm }
    }

    /// `file:line:column`
    pub fn location(&self, span: Span) -> String {
        let loc = self.cm.lookup_char_pos(span.lo);
        let file = match &*loc.file.name {
            FileName::Custom(name) => name.clone(),
            other => other.to_string(),
        };
        format!("{}:{}:{}", file, loc.line, loc.col.0 + 1)
    }
}

/// 不能按值调用的函数形态
fn unsupported_reason(expr: &Expr) -> Option<&'static str> {
    let (is_async, is_generator) = match expr {
        Expr::Arrow(arrow) => (arrow.is_async, arrow.is_generator),
        Expr::Fn(func) => (func.function.is_async, func.function.is_generator),
        _ => return Some("style value is not a function"),
    };

    if is_async {
        Some("async functions cannot produce a style value")
    } else if is_generator {
        Some("generator functions cannot produce a style value")
    } else {
        None
    }
}

impl FunctionRewriter<JsFunction> for SwcFunctionRewriter<'_> {
    type Expr = Box<Expr>;

    fn source_text(&self, key: &str, func: &JsFunction) -> Result<String, StyleError> {
        self.cm
            .span_to_snippet(func.span)
            .map(|snippet| strip_empty_line_markers(&snippet))
            .map_err(|err| {
                StyleError::rewrite(
                    key,
                    self.location(func.span),
                    format!("source text unavailable: {:?}", err),
                )
            })
    }

    fn rewrite(
        &mut self,
        key: &str,
        func: &JsFunction,
        tokens: &TokenResolver<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Box<Expr>, StyleError> {
        if let Some(reason) = unsupported_reason(&func.expr) {
            return Err(StyleError::rewrite(key, self.location(func.span), reason));
        }

        let mut expr = func.expr.clone();
        expr.visit_mut_with(&mut ThemeTokenVisitor::new(key, tokens, diagnostics));
        Ok(expr)
    }
}

/// 把函数体内的 token 字符串字面量改写为 `var()` 引用
///
/// 分类由外层属性名决定：`color` 下的 `"primary.main"` 落在 `palette`。
pub struct ThemeTokenVisitor<'a, 't> {
    property: &'a str,
    tokens: &'a TokenResolver<'t>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a, 't> ThemeTokenVisitor<'a, 't> {
    pub fn new(
        property: &'a str,
        tokens: &'a TokenResolver<'t>,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            property,
            tokens,
            diagnostics,
        }
    }
}

impl VisitMut for ThemeTokenVisitor<'_, '_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let Expr::Lit(Lit::Str(s)) = expr else {
            return;
        };
        let value = str_value(s);
        if let Some(resolution) = self.tokens.resolve_for_property(self.property, &value) {
            self.diagnostics.extend(resolution.diagnostic());
            s.value = resolution.css_var.into();
            s.raw = None;
        }
    }

    // props["a.b"] 是键名，不是 token
    fn visit_mut_member_prop(&mut self, _prop: &mut MemberProp) {}
}
