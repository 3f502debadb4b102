//! 对象字面量 → 样式树
//!
//! 只接受构建期能确定的写法：字面量、嵌套对象、数组、函数，
//! 以及回调形式 `({ theme }) => ({...})` 里对 `theme.a.b` 的成员访问。
//! 其他写法返回 [`Unsupported`]，调用方据此原样保留整个调用点。

use crate::strip_empty_line_markers;
use indexmap::IndexMap;
use serde_json::Value;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};
use zerostyle_core::theme::{format_number, Theme};
use zerostyle_core::{Literal, StyleTree, StyleValue, Variant};

/// 样式对象里的运行时函数（箭头函数或函数表达式）
#[derive(Debug, Clone, PartialEq)]
pub struct JsFunction {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// 无法静态分析的写法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub span: Span,
    pub reason: String,
}

impl Unsupported {
    fn new(span: Span, reason: impl Into<String>) -> Self {
        Self {
            span,
            reason: reason.into(),
        }
    }
}

/// 回调参数里 theme 的来源
#[derive(Debug, Clone, PartialEq, Eq)]
enum ThemeBinding {
    /// `({ theme }) => ...`，`theme.palette.x`
    Direct(String),
    /// `(props) => ...`，`props.theme.palette.x`
    Props(String),
}

/// 把 styled 调用的一个参数转换为样式树
pub fn style_tree_from_argument(
    expr: &Expr,
    theme: &Theme,
) -> Result<StyleTree<JsFunction>, Unsupported> {
    match unwrap_expr(expr) {
        Expr::Object(obj) => ObjectContext {
            theme,
            binding: None,
            params: Vec::new(),
        }
        .tree(obj, true),
        Expr::Arrow(arrow) => {
            if arrow.is_async || arrow.is_generator {
                return Err(Unsupported::new(
                    arrow.span,
                    "async style callbacks cannot be evaluated at build time",
                ));
            }
            let context = ObjectContext {
                theme,
                binding: callback_binding(arrow)?,
                params: param_names(&arrow.params),
            };
            context.tree(callback_body(arrow)?, true)
        }
        other => Err(Unsupported::new(
            other.span(),
            "style argument must be an object literal or a theme callback",
        )),
    }
}

fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_expr(&paren.expr),
        Expr::TsAs(ts) => unwrap_expr(&ts.expr),
        Expr::TsConstAssertion(ts) => unwrap_expr(&ts.expr),
        Expr::TsSatisfies(ts) => unwrap_expr(&ts.expr),
        _ => expr,
    }
}

fn callback_binding(arrow: &ArrowExpr) -> Result<Option<ThemeBinding>, Unsupported> {
    match arrow.params.as_slice() {
        [] => Ok(None),
        [Pat::Ident(props)] => Ok(Some(ThemeBinding::Props(props.id.sym.to_string()))),
        [Pat::Object(pattern)] => Ok(pattern.props.iter().find_map(|prop| match prop {
            ObjectPatProp::Assign(assign) if &*assign.key.id.sym == "theme" => {
                Some(ThemeBinding::Direct("theme".to_string()))
            }
            ObjectPatProp::KeyValue(kv) if prop_key(&kv.key).ok().as_deref() == Some("theme") => {
                match kv.value.as_ref() {
                    Pat::Ident(local) => Some(ThemeBinding::Direct(local.id.sym.to_string())),
                    _ => None,
                }
            }
            _ => None,
        })),
        _ => Err(Unsupported::new(
            arrow.span,
            "style callbacks take a single props parameter",
        )),
    }
}

/// 回调参数绑定的全部名字
fn param_names(params: &[Pat]) -> Vec<String> {
    let mut names = Vec::new();
    for param in params {
        collect_pat_names(param, &mut names);
    }
    names
}

fn collect_pat_names(pat: &Pat, names: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => names.push(binding.id.sym.to_string()),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => collect_pat_names(&kv.value, names),
                    ObjectPatProp::Assign(assign) => names.push(assign.key.id.sym.to_string()),
                    ObjectPatProp::Rest(rest) => collect_pat_names(&rest.arg, names),
                }
            }
        }
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                collect_pat_names(elem, names);
            }
        }
        Pat::Rest(rest) => collect_pat_names(&rest.arg, names),
        Pat::Assign(assign) => collect_pat_names(&assign.left, names),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}

fn callback_body(arrow: &ArrowExpr) -> Result<&ObjectLit, Unsupported> {
    let body = match arrow.body.as_ref() {
        BlockStmtOrExpr::Expr(expr) => unwrap_expr(expr),
        BlockStmtOrExpr::BlockStmt(block) => match block.stmts.as_slice() {
            [Stmt::Return(ReturnStmt { arg: Some(arg), .. })] => unwrap_expr(arg),
            _ => {
                return Err(Unsupported::new(
                    block.span,
                    "style callback body must be a single `return {...}`",
                ))
            }
        },
    };

    match body {
        Expr::Object(obj) => Ok(obj),
        other => Err(Unsupported::new(
            other.span(),
            "style callback must return an object literal",
        )),
    }
}

struct ObjectContext<'a> {
    theme: &'a Theme,
    binding: Option<ThemeBinding>,
    /// 回调参数名：运行时函数引用它们时，运行时拿不到这些值
    params: Vec<String>,
}

impl ObjectContext<'_> {
    fn tree(&self, obj: &ObjectLit, top_level: bool) -> Result<StyleTree<JsFunction>, Unsupported> {
        let mut tree = StyleTree::new();

        for prop in &obj.props {
            let (key, value) = key_value(prop)?;

            if top_level && key == "variants" {
                if let Expr::Array(array) = unwrap_expr(value) {
                    tree.variants = self.variants(array)?;
                    continue;
                }
            }

            tree.entries.insert(key, self.value(value)?);
        }

        Ok(tree)
    }

    fn value(&self, expr: &Expr) -> Result<StyleValue<JsFunction>, Unsupported> {
        let literal = |value: Literal| -> Result<StyleValue<JsFunction>, Unsupported> {
            Ok(StyleValue::Literal(value))
        };

        match unwrap_expr(expr) {
            Expr::Lit(Lit::Str(s)) => literal(Literal::Str(str_value(s))),
            Expr::Lit(Lit::Num(n)) => literal(Literal::Num(n.value)),
            Expr::Lit(Lit::Bool(b)) => literal(Literal::Bool(b.value)),
            Expr::Unary(UnaryExpr {
                op: UnaryOp::Minus,
                arg,
                span,
            }) => match unwrap_expr(arg) {
                Expr::Lit(Lit::Num(n)) => literal(Literal::Num(-n.value)),
                _ => Err(Unsupported::new(*span, "only numbers can be negated")),
            },
            // 无插值模板字符串
            Expr::Tpl(tpl) if tpl.exprs.is_empty() && tpl.quasis.len() == 1 => {
                literal(Literal::Str(strip_empty_line_markers(&tpl.quasis[0].raw)))
            }
            Expr::Object(obj) => Ok(StyleValue::Nested(self.tree(obj, false)?)),
            Expr::Array(array) => {
                let mut items = Vec::with_capacity(array.elems.len());
                for elem in &array.elems {
                    match elem {
                        Some(ExprOrSpread { spread: None, expr }) => items.push(self.value(expr)?),
                        _ => {
                            return Err(Unsupported::new(
                                array.span,
                                "array values cannot contain spreads or holes",
                            ))
                        }
                    }
                }
                Ok(StyleValue::Array(items))
            }
            func @ (Expr::Arrow(_) | Expr::Fn(_)) => {
                if let Some(name) = self.params.iter().find(|name| captures_binding(func, name)) {
                    return Err(Unsupported::new(
                        func.span(),
                        format!("runtime function refers to `{}` from the style callback", name),
                    ));
                }
                Ok(StyleValue::Function(JsFunction {
                    expr: Box::new(func.clone()),
                    span: func.span(),
                }))
            }
            member @ Expr::Member(_) => self.theme_value(member).map(StyleValue::Literal),
            other => Err(Unsupported::new(
                other.span(),
                "value cannot be evaluated at build time",
            )),
        }
    }

    /// 对 `theme.a.b` 在构建期求值
    fn theme_value(&self, expr: &Expr) -> Result<Literal, Unsupported> {
        let not_theme = || Unsupported::new(expr.span(), "member access outside the theme");

        let (root, path) = member_path(expr).ok_or_else(not_theme)?;
        let segments: Vec<&str> = match &self.binding {
            Some(ThemeBinding::Direct(name)) if *name == root => {
                path.iter().map(String::as_str).collect()
            }
            Some(ThemeBinding::Props(name)) if *name == root && path.first().map(String::as_str) == Some("theme") => {
                path[1..].iter().map(String::as_str).collect()
            }
            _ => return Err(not_theme()),
        };

        match self.theme.get_path(&segments) {
            Some(Value::String(s)) => Ok(Literal::Str(s.clone())),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Literal::Num)
                .ok_or_else(|| Unsupported::new(expr.span(), "theme number out of range")),
            Some(Value::Bool(b)) => Ok(Literal::Bool(*b)),
            _ => Err(Unsupported::new(
                expr.span(),
                format!("`theme.{}` is not a scalar value in the theme", segments.join(".")),
            )),
        }
    }

    fn variants(&self, array: &ArrayLit) -> Result<Vec<Variant<JsFunction>>, Unsupported> {
        let mut variants = Vec::with_capacity(array.elems.len());

        for elem in &array.elems {
            let Some(ExprOrSpread { spread: None, expr }) = elem else {
                return Err(Unsupported::new(array.span, "variants must be an array of objects"));
            };
            let Expr::Object(obj) = unwrap_expr(expr) else {
                return Err(Unsupported::new(expr.span(), "variant must be an object literal"));
            };

            let mut props = None;
            let mut style = None;
            for prop in &obj.props {
                let (key, value) = key_value(prop)?;
                match key.as_str() {
                    "props" => props = Some(self.variant_props(value)?),
                    "style" => match unwrap_expr(value) {
                        Expr::Object(style_obj) => style = Some(self.tree(style_obj, false)?),
                        other => {
                            return Err(Unsupported::new(
                                other.span(),
                                "variant style must be an object literal",
                            ))
                        }
                    },
                    _ => {
                        return Err(Unsupported::new(
                            prop.span(),
                            format!("unknown variant field `{}`", key),
                        ))
                    }
                }
            }

            match (props, style) {
                (Some(props), Some(style)) => variants.push(Variant { props, style }),
                _ => {
                    return Err(Unsupported::new(
                        obj.span,
                        "variant needs both `props` and `style`",
                    ))
                }
            }
        }

        Ok(variants)
    }

    fn variant_props(&self, expr: &Expr) -> Result<IndexMap<String, Literal>, Unsupported> {
        let Expr::Object(obj) = unwrap_expr(expr) else {
            return Err(Unsupported::new(expr.span(), "variant props must be an object literal"));
        };

        let mut props = IndexMap::new();
        for prop in &obj.props {
            let (key, value) = key_value(prop)?;
            match self.value(value)? {
                StyleValue::Literal(literal) => {
                    props.insert(key, literal);
                }
                _ => {
                    return Err(Unsupported::new(
                        value.span(),
                        "variant props must be literal values",
                    ))
                }
            }
        }
        Ok(props)
    }
}

fn key_value(prop: &PropOrSpread) -> Result<(String, &Expr), Unsupported> {
    let PropOrSpread::Prop(prop) = prop else {
        return Err(Unsupported::new(prop.span(), "spread properties are not supported"));
    };
    match prop.as_ref() {
        Prop::KeyValue(kv) => Ok((prop_key(&kv.key)?, kv.value.as_ref())),
        other => Err(Unsupported::new(
            other.span(),
            "only `key: value` properties are supported",
        )),
    }
}

fn prop_key(key: &PropName) -> Result<String, Unsupported> {
    match key {
        PropName::Ident(ident) => Ok(ident.sym.to_string()),
        PropName::Str(s) => Ok(str_value(s)),
        PropName::Num(n) => Ok(format_number(n.value)),
        PropName::Computed(computed) => Err(Unsupported::new(
            computed.span,
            "computed keys are not supported",
        )),
        PropName::BigInt(big) => Err(Unsupported::new(big.span, "bigint keys are not supported")),
    }
}

pub(crate) fn str_value(s: &Str) -> String {
    s.value.as_str().unwrap_or_default().to_string()
}

/// `a.b["c"][0]` → `("a", ["b", "c", "0"])`
fn member_path(expr: &Expr) -> Option<(String, Vec<String>)> {
    match unwrap_expr(expr) {
        Expr::Ident(ident) => Some((ident.sym.to_string(), Vec::new())),
        Expr::Member(member) => {
            let (root, mut path) = member_path(&member.obj)?;
            match &member.prop {
                MemberProp::Ident(ident) => path.push(ident.sym.to_string()),
                MemberProp::Computed(computed) => match unwrap_expr(&computed.expr) {
                    Expr::Lit(Lit::Str(s)) => path.push(str_value(s)),
                    Expr::Lit(Lit::Num(n)) => path.push(format_number(n.value)),
                    _ => return None,
                },
                MemberProp::PrivateName(_) => return None,
            }
            Some((root, path))
        }
        _ => None,
    }
}

/// 函数是否引用了外层回调的参数（自己重新绑定同名变量的不算）
fn captures_binding(func: &Expr, name: &str) -> bool {
    let mut usage = BindingUsage {
        name,
        bound: false,
        used: false,
    };
    func.visit_with(&mut usage);
    usage.used && !usage.bound
}

struct BindingUsage<'a> {
    name: &'a str,
    bound: bool,
    used: bool,
}

impl Visit for BindingUsage<'_> {
    fn visit_binding_ident(&mut self, binding: &BindingIdent) {
        if &*binding.id.sym == self.name {
            self.bound = true;
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if &*ident.sym == self.name {
            self.used = true;
        }
    }
}
