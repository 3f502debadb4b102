use crate::style_object::JsFunction;
use indexmap::IndexMap;
use zerostyle_core::{
    Diagnostic, FunctionRewriter, StyleError, StyleOutput, StylePipeline, StyleTree, Theme,
};

/// 样式收集器 —— 收集一个文件里所有 styled 调用的输出，
/// 按类名去重 CSS，并汇总诊断信息。
pub struct StyleCollector<'a> {
    pipeline: StylePipeline<'a>,
    /// 类名 -> CSS
    css_entries: IndexMap<String, String>,
    diagnostics: Vec<Diagnostic>,
    processed: usize,
}

impl<'a> StyleCollector<'a> {
    pub fn new(pipeline: StylePipeline<'a>) -> Self {
        Self {
            pipeline,
            css_entries: IndexMap::new(),
            diagnostics: Vec::new(),
            processed: 0,
        }
    }

    pub fn theme(&self) -> &'a Theme {
        self.pipeline.tokens().theme()
    }

    /// 处理一棵样式树。同样内容得到同样类名，CSS 只记录一次。
    pub fn process<R>(
        &mut self,
        tree: StyleTree<JsFunction>,
        seed: &str,
        hint: Option<&str>,
        rewriter: &mut R,
    ) -> Result<StyleOutput<JsFunction, R::Expr>, StyleError>
    where
        R: FunctionRewriter<JsFunction>,
    {
        let output =
            self.pipeline
                .transform_style_tree(tree, seed, hint, rewriter, &mut self.diagnostics)?;

        if !output.css.is_empty() {
            self.css_entries
                .entry(output.class_name.clone())
                .or_insert_with(|| output.css.clone());
        }
        self.processed += 1;

        Ok(output)
    }

    /// 记录一条警告（同时写入 tracing）
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.diagnostics.push(Diagnostic::warning(message));
    }

    /// 已转换的样式参数个数
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn combined_css(&self) -> String {
        self.css_entries.values().map(String::as_str).collect()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.css_entries.keys().map(String::as_str)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
