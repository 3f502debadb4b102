use crate::css::render_style_rules;
use crate::error::StyleError;
use crate::extract::{extract_functions, resolve_static_tokens, FunctionRewriter, VariableBinding};
use crate::naming::NamingStrategy;
use crate::resolver::TokenResolver;
use crate::style::{Literal, StyleTree};
use crate::types::Diagnostic;
use indexmap::IndexMap;

/// 一个 variant 的输出：匹配条件 + 对应类名
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOutput {
    pub props: IndexMap<String, Literal>,
    pub class_name: String,
}

/// 样式树转换结果
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOutput<F, E> {
    pub class_name: String,
    /// 不含函数、token 已解析的样式树
    pub tree: StyleTree<F>,
    pub bindings: Vec<VariableBinding<E>>,
    pub variants: Vec<VariantOutput>,
    /// 基础规则 + 各 variant 规则
    pub css: String,
}

/// 样式树转换管线
///
/// 依次执行：函数提取 → 静态 token 解析 → 分配类名 → 生成 CSS。
pub struct StylePipeline<'a> {
    tokens: TokenResolver<'a>,
    naming: &'a dyn NamingStrategy,
}

impl<'a> StylePipeline<'a> {
    pub fn new(tokens: TokenResolver<'a>, naming: &'a dyn NamingStrategy) -> Self {
        Self { tokens, naming }
    }

    pub fn tokens(&self) -> &TokenResolver<'a> {
        &self.tokens
    }

    /// 转换一棵样式树
    ///
    /// # 参数
    ///
    /// - `seed`: 用于生成类名的内容（通常是样式对象的源码）
    /// - `hint`: 可读命名模式下的类名前缀（如组件名）
    pub fn transform_style_tree<F, R>(
        &self,
        tree: StyleTree<F>,
        seed: &str,
        hint: Option<&str>,
        rewriter: &mut R,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<StyleOutput<F, R::Expr>, StyleError>
    where
        R: FunctionRewriter<F>,
    {
        let extraction = extract_functions(tree, &self.tokens, self.naming, rewriter, diagnostics)?;
        let mut tree = extraction.tree;
        resolve_static_tokens(&mut tree, &self.tokens, diagnostics);

        let class_name = self.naming.class_name(hint, seed);
        let mut css = render_style_rules(&format!(".{}", class_name), &tree);

        let mut variants = Vec::with_capacity(tree.variants.len());
        for (index, variant) in tree.variants.iter().enumerate() {
            let variant_class = format!("{}-v{}", class_name, index);
            css.push_str(&render_style_rules(
                &format!(".{}", variant_class),
                &variant.style,
            ));
            variants.push(VariantOutput {
                props: variant.props.clone(),
                class_name: variant_class,
            });
        }

        Ok(StyleOutput {
            class_name,
            tree,
            bindings: extraction.bindings,
            variants,
            css,
        })
    }
}
