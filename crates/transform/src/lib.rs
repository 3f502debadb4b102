pub mod collector;
pub mod rewriter;
pub mod session;
pub mod style_object;
pub mod visitor;

use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::sync::Lrc;
use swc_core::common::source_map::SourceMapGenConfig;
use swc_core::common::{BytePos, FileName, Globals, LineCol, SourceMap, DUMMY_SP, GLOBALS};
use swc_core::ecma::ast::*;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config as CodegenConfig, Emitter};
use swc_core::ecma::parser::{parse_file_as_module, EsSyntax, Syntax, TsSyntax};
use swc_core::ecma::visit::VisitMutWith;
use thiserror::Error;
use visitor::StyledCallVisitor;
use zerostyle_core::files::strip_query;
use zerostyle_core::{create_naming_strategy, StyleError, StylePipeline, TokenResolver};

// Re-exports
pub use collector::StyleCollector;
pub use session::{BuildSession, FileOutput, SessionOptions};
pub use style_object::{JsFunction, Unsupported};
pub use zerostyle_core::{Diagnostic, DiagnosticLevel, NamingMode, Theme};

/// 默认运行时包名
pub const DEFAULT_RUNTIME_PACKAGE: &str = "@zerostyle/runtime";

/// 默认 CSS 变量前缀
pub const DEFAULT_CSS_VARIABLES_PREFIX: &str = "mui";

/// 转换选项
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// 构建期主题
    pub theme: Theme,
    /// CSS 变量前缀（默认 `"mui"`，空字符串表示不加前缀）
    pub css_variables_prefix: String,
    /// 类名 / 变量名生成策略（默认 Hash）
    pub naming_mode: NamingMode,
    /// 提供 `styled` 的运行时包
    pub runtime_package: String,
    /// 是否生成 source map
    pub source_map: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            css_variables_prefix: DEFAULT_CSS_VARIABLES_PREFIX.to_string(),
            naming_mode: NamingMode::Hash,
            runtime_package: DEFAULT_RUNTIME_PACKAGE.to_string(),
            source_map: false,
        }
    }
}

/// 转换结果
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    /// 转换后的源码；没有任何调用点被转换时就是原始源码
    pub code: String,
    /// 本文件生成的 CSS
    pub css: Option<String>,
    /// 被转换的样式参数个数
    pub processed: usize,
    /// JSON source map（`source_map` 选项开启时）
    pub map: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformResult {
    fn unchanged(source: &str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            code: source.to_string(),
            css: None,
            processed: 0,
            map: None,
            diagnostics,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("code generation failed: {0}")]
    Codegen(String),
    #[error("source map generation failed: {0}")]
    SourceMap(String),
    #[error("generated code is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// 转换一个 JS/TS 模块
///
/// 找到从运行时包导入的 `styled` 的调用点，把样式对象提取为静态 CSS，
/// 并把调用参数替换为运行时 glue 对象。
///
/// # 参数
///
/// - `source`: 模块源码
/// - `filename`: 文件名（用于判断语法类型，可以带 `?query`）
/// - `options`: 转换选项
///
/// # 示例
///
/// ```no_run
/// use zerostyle_transform::{transform_module, TransformOptions};
///
/// let source = r#"
///     import { styled } from "@zerostyle/runtime";
///     export const Button = styled("button")({
///         color: "primary.main",
///         opacity: (props) => props.disabled ? 0.5 : 1,
///     });
/// "#;
///
/// let result = transform_module(source, "Button.tsx", &TransformOptions::default()).unwrap();
/// println!("Code:\n{}", result.code);
/// println!("CSS:\n{}", result.css.unwrap_or_default());
/// ```
pub fn transform_module(
    source: &str,
    filename: &str,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    transform_module_with(source, filename, options, |_| None)
}

/// 同 [`transform_module`]，`css_import` 根据生成的 CSS 给出要插入到模块开头的
/// import 路径（构建会话用它注入 `.zero.css`）
pub(crate) fn transform_module_with(
    source: &str,
    filename: &str,
    options: &TransformOptions,
    css_import: impl FnOnce(&str) -> Option<String>,
) -> Result<TransformResult, TransformError> {
    // 不引用运行时包的文件不解析
    if !source.contains(options.runtime_package.as_str()) {
        return Ok(TransformResult::unchanged(source, Vec::new()));
    }

    let syntax = syntax_for(filename);

    // 用占位符注释保留空行位置，防止 SWC parse→emit 吞掉空行
    let preserved_source = preserve_empty_lines(source);

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom(strip_query(filename).to_string()).into(),
        preserved_source,
    );

    let comments = SingleThreadedComments::default();
    let mut errors = vec![];
    let parse_error = |message: String| TransformError::Parse {
        filename: filename.to_string(),
        message,
    };
    let mut module = parse_file_as_module(&fm, syntax, EsVersion::latest(), Some(&comments), &mut errors)
        .map_err(|e| parse_error(format!("{:?}", e.kind())))?;
    if let Some(error) = errors.first() {
        return Err(parse_error(format!("{:?}", error.kind())));
    }

    let naming = create_naming_strategy(options.naming_mode);
    let tokens = TokenResolver::new(&options.theme, &options.css_variables_prefix);
    let mut collector = StyleCollector::new(StylePipeline::new(tokens, naming.as_ref()));
    {
        let mut visitor = StyledCallVisitor::new(&mut collector, &cm, &options.runtime_package);
        module.visit_mut_with(&mut visitor);
        visitor.finish()?;
    }

    let processed = collector.processed();
    if processed == 0 {
        return Ok(TransformResult::unchanged(source, collector.into_diagnostics()));
    }

    let css = collector.combined_css();
    if !css.is_empty() {
        if let Some(path) = css_import(&css) {
            module.body.insert(0, side_effect_import(&path));
        }
    }

    let (code, map) = GLOBALS.set(&Globals::new(), || {
        emit_module(&cm, &module, Some(&comments), options.source_map)
    })?;

    Ok(TransformResult {
        code: restore_empty_lines(&code),
        css: (!css.is_empty()).then_some(css),
        processed,
        map,
        diagnostics: collector.into_diagnostics(),
    })
}

/// `import "{path}";`
fn side_effect_import(path: &str) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers: vec![],
        src: Box::new(Str {
            span: DUMMY_SP,
            value: path.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: Default::default(),
    }))
}

/// 根据扩展名选择语法
fn syntax_for(filename: &str) -> Syntax {
    let path = strip_query(filename);
    if path.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })
    } else if path.ends_with(".ts") || path.ends_with(".mts") || path.ends_with(".cts") {
        Syntax::Typescript(TsSyntax {
            tsx: false,
            ..Default::default()
        })
    } else {
        // .jsx / .js / .mjs / .cjs 默认支持 JSX
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    }
}

/// 空行占位符
///
/// SWC 的 AST 不保留空行信息，parse → emit 后空行会被吞掉。
/// 解析前把空行替换为注释占位符，代码生成后再还原。
const EMPTY_LINE_MARKER: &str = "// __ZEROSTYLE_EMPTY_LINE__";

fn preserve_empty_lines(source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();

    // 末尾的空行不处理
    let last_non_empty = lines.iter().rposition(|l| !l.trim().is_empty());

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if line.trim().is_empty() && last_non_empty.is_some_and(|last| i < last) {
                EMPTY_LINE_MARKER
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 从源码片段里去掉占位符（模板字符串、函数源码、类名种子）
pub(crate) fn strip_empty_line_markers(text: &str) -> String {
    text.replace(EMPTY_LINE_MARKER, "")
}

fn restore_empty_lines(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.trim() == EMPTY_LINE_MARKER {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `sources` 里写入不带尖括号的文件名
struct ModuleSourceMapConfig;

impl SourceMapGenConfig for ModuleSourceMapConfig {
    fn file_name_to_source(&self, f: &FileName) -> String {
        match f {
            FileName::Custom(name) => name.clone(),
            other => other.to_string(),
        }
    }
}

/// 使用 SWC codegen 输出模块代码，按需附带 source map
fn emit_module(
    cm: &Lrc<SourceMap>,
    module: &Module,
    comments: Option<&SingleThreadedComments>,
    source_map: bool,
) -> Result<(String, Option<String>), TransformError> {
    let mut buf = vec![];
    let mut mappings: Vec<(BytePos, LineCol)> = vec![];
    {
        let writer = JsWriter::new(
            cm.clone(),
            "\n",
            &mut buf,
            source_map.then_some(&mut mappings),
        );
        let mut emitter = Emitter {
            cfg: CodegenConfig::default().with_target(EsVersion::latest()),
            cm: cm.clone(),
            comments: comments.map(|c| c as &dyn swc_core::common::comments::Comments),
            wr: writer,
        };
        emitter
            .emit_module(module)
            .map_err(|e| TransformError::Codegen(e.to_string()))?;
    }
    let code = String::from_utf8(buf)?;

    if !source_map {
        return Ok((code, None));
    }
    let mut map = vec![];
    cm.build_source_map(&mappings, None, ModuleSourceMapConfig)
        .to_writer(&mut map)
        .map_err(|e| TransformError::SourceMap(e.to_string()))?;
    Ok((code, Some(String::from_utf8(map)?)))
}
