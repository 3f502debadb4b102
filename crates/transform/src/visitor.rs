use crate::collector::StyleCollector;
use crate::rewriter::SwcFunctionRewriter;
use crate::strip_empty_line_markers;
use crate::style_object::{str_value, style_tree_from_argument, JsFunction};
use swc_core::common::sync::Lrc;
use swc_core::common::{SourceMap, SourceMapper, Spanned, DUMMY_SP};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use zerostyle_core::{Literal, StyleError, StyleOutput};

/// styled 调用遍历器 —— 使用 SWC VisitMut 遍历 AST，
/// 找到从运行时包导入的 `styled` 的调用点，
/// 把样式参数替换为运行时 glue 对象。
///
/// 支持三种调用形式：
/// - `styled('div')({...})`
/// - `styled(Component, { name, slot })({...})`
/// - `styled.div({...})`
pub struct StyledCallVisitor<'a, 't> {
    collector: &'a mut StyleCollector<'t>,
    rewriter: SwcFunctionRewriter<'a>,
    cm: &'a Lrc<SourceMap>,
    runtime_package: &'a str,
    /// 本文件中 `styled` 的本地名字
    styled_locals: Vec<String>,
    error: Option<StyleError>,
}

/// 命中的调用点
struct StyledCall {
    /// 可读命名模式下的类名前缀
    hint: Option<String>,
}

impl<'a, 't> StyledCallVisitor<'a, 't> {
    pub fn new(
        collector: &'a mut StyleCollector<'t>,
        cm: &'a Lrc<SourceMap>,
        runtime_package: &'a str,
    ) -> Self {
        Self {
            collector,
            rewriter: SwcFunctionRewriter::new(cm),
            cm,
            runtime_package,
            styled_locals: Vec::new(),
            error: None,
        }
    }

    /// 结束遍历，返回遍历中遇到的第一个致命错误
    pub fn finish(self) -> Result<(), StyleError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_styled(&self, expr: &Expr) -> bool {
        matches!(expr, Expr::Ident(ident) if self.styled_locals.iter().any(|local| local.as_str() == &*ident.sym))
    }

    fn styled_target(&self, call: &CallExpr) -> Option<StyledCall> {
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };

        match callee.as_ref() {
            // styled(tag, options)(...)
            Expr::Call(inner) => {
                let Callee::Expr(inner_callee) = &inner.callee else {
                    return None;
                };
                self.is_styled(inner_callee).then(|| StyledCall {
                    hint: component_hint(&inner.args),
                })
            }
            // styled.tag(...)
            Expr::Member(member) if self.is_styled(&member.obj) => match &member.prop {
                MemberProp::Ident(tag) => Some(StyledCall {
                    hint: Some(tag.sym.to_string()),
                }),
                _ => None,
            },
            _ => None,
        }
    }

    fn process_call(&mut self, call: &mut CallExpr, target: StyledCall) {
        let location = self.rewriter.location(call.span);
        let theme = self.collector.theme();

        let mut trees = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            if arg.spread.is_some() {
                self.collector.warn(format!(
                    "{}: spread arguments are not supported; styled call left untouched",
                    location
                ));
                return;
            }
            match style_tree_from_argument(&arg.expr, theme) {
                Ok(tree) => trees.push((tree, arg.expr.span())),
                Err(unsupported) => {
                    self.collector.warn(format!(
                        "{}: {}; styled call left untouched",
                        self.rewriter.location(unsupported.span),
                        unsupported.reason
                    ));
                    return;
                }
            }
        }

        let mut glue = Vec::with_capacity(trees.len());
        for (tree, span) in trees {
            let seed = self
                .cm
                .span_to_snippet(span)
                .map(|snippet| strip_empty_line_markers(&snippet))
                .unwrap_or_else(|_| format!("{}@{:?}", location, span));
            match self
                .collector
                .process(tree, &seed, target.hint.as_deref(), &mut self.rewriter)
            {
                Ok(output) => glue.push(glue_object(output)),
                Err(err) => {
                    self.error = Some(err);
                    return;
                }
            }
        }

        for (arg, expr) in call.args.iter_mut().zip(glue) {
            arg.expr = Box::new(expr);
        }
    }
}

impl VisitMut for StyledCallVisitor<'_, '_> {
    fn visit_mut_module(&mut self, module: &mut Module) {
        self.styled_locals = styled_imports(module, self.runtime_package);
        if self.styled_locals.is_empty() {
            return;
        }
        module.visit_mut_children_with(self);
    }

    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        call.visit_mut_children_with(self);
        if self.error.is_some() {
            return;
        }

        if let Some(target) = self.styled_target(call) {
            self.process_call(call, target);
        }
    }
}

/// 收集从运行时包导入的 `styled` 的本地名字
fn styled_imports(module: &Module, runtime_package: &str) -> Vec<String> {
    module
        .body
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => Some(import),
            _ => None,
        })
        .filter(|import| !import.type_only && import.src.value.as_str() == Some(runtime_package))
        .flat_map(|import| import.specifiers.iter())
        .filter_map(|specifier| match specifier {
            ImportSpecifier::Named(named) if !named.is_type_only => {
                let imported = match &named.imported {
                    Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                    Some(ModuleExportName::Str(s)) => str_value(s),
                    None => named.local.sym.to_string(),
                };
                (imported == "styled").then(|| named.local.sym.to_string())
            }
            ImportSpecifier::Default(specifier) => Some(specifier.local.sym.to_string()),
            _ => None,
        })
        .collect()
}

/// 组件名：options 里的 `name`（带 `slot`）优先，其次是 tag / 组件标识符
fn component_hint(args: &[ExprOrSpread]) -> Option<String> {
    if let Some(Expr::Object(options)) = args.get(1).map(|arg| arg.expr.as_ref()) {
        let field = |name: &str| {
            options.props.iter().find_map(|prop| match prop {
                PropOrSpread::Prop(prop) => match prop.as_ref() {
                    Prop::KeyValue(KeyValueProp {
                        key: PropName::Ident(key),
                        value,
                    }) if &*key.sym == name => match value.as_ref() {
                        Expr::Lit(Lit::Str(s)) => Some(str_value(s)),
                        _ => None,
                    },
                    _ => None,
                },
                _ => None,
            })
        };
        if let Some(name) = field("name") {
            return Some(match field("slot") {
                Some(slot) => format!("{}-{}", name, slot),
                None => name,
            });
        }
    }

    match args.first().map(|arg| arg.expr.as_ref()) {
        Some(Expr::Lit(Lit::Str(s))) => Some(str_value(s)),
        Some(Expr::Ident(ident)) => Some(ident.sym.to_string()),
        _ => None,
    }
}

/// `{ className, vars?: { id: [fn, isUnitLess] }, variants?: [{ props, className }] }`
fn glue_object(output: StyleOutput<JsFunction, Box<Expr>>) -> Expr {
    let mut props = vec![key_value("className", string_expr(&output.class_name))];

    if !output.bindings.is_empty() {
        let vars = output
            .bindings
            .into_iter()
            .map(|binding| {
                key_value(
                    &binding.variable_id,
                    array_expr(vec![
                        binding.expression,
                        Box::new(Expr::Lit(Lit::Bool(Bool {
                            span: DUMMY_SP,
                            value: binding.is_unit_less,
                        }))),
                    ]),
                )
            })
            .collect();
        props.push(key_value("vars", object_expr(vars)));
    }

    if !output.variants.is_empty() {
        let variants = output
            .variants
            .into_iter()
            .map(|variant| {
                let matches = variant
                    .props
                    .iter()
                    .map(|(key, value)| key_value(key, literal_expr(value)))
                    .collect();
                Box::new(object_expr(vec![
                    key_value("props", object_expr(matches)),
                    key_value("className", string_expr(&variant.class_name)),
                ]))
            })
            .collect();
        props.push(key_value("variants", array_expr(variants)));
    }

    object_expr(props)
}

fn key_value(key: &str, value: Expr) -> PropOrSpread {
    PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: prop_name(key),
        value: Box::new(value),
    })))
}

fn prop_name(key: &str) -> PropName {
    if is_identifier(key) {
        PropName::Ident(IdentName {
            span: DUMMY_SP,
            sym: key.into(),
        })
    } else {
        PropName::Str(Str {
            span: DUMMY_SP,
            value: key.into(),
            raw: None,
        })
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn string_expr(value: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}

fn literal_expr(value: &Literal) -> Expr {
    let number = |value: f64| {
        Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value,
            raw: None,
        }))
    };

    match value {
        Literal::Str(s) => string_expr(s),
        Literal::Num(n) if *n < 0.0 => Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::Minus,
            arg: Box::new(number(-n)),
        }),
        Literal::Num(n) => number(*n),
        Literal::Bool(b) => Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: *b,
        })),
    }
}

fn array_expr(items: Vec<Box<Expr>>) -> Expr {
    Expr::Array(ArrayLit {
        span: DUMMY_SP,
        elems: items
            .into_iter()
            .map(|expr| Some(ExprOrSpread { spread: None, expr }))
            .collect(),
    })
}

fn object_expr(props: Vec<PropOrSpread>) -> Expr {
    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("className"));
        assert!(is_identifier("$size"));
        assert!(!is_identifier("color-0a1b2c"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_literal_expr_negative_numbers() {
        assert!(matches!(
            literal_expr(&Literal::Num(-2.0)),
            Expr::Unary(UnaryExpr { op: UnaryOp::Minus, .. })
        ));
        assert!(matches!(
            literal_expr(&Literal::Num(2.0)),
            Expr::Lit(Lit::Num(Number { value, .. })) if value == 2.0
        ));
    }
}
