use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use zerostyle_core::{generate_theme_css as rs_generate_theme_css, ThemeCssOptions};
use zerostyle_transform::{
    transform_module as rs_transform_module, BuildSession, Diagnostic, DiagnosticLevel,
    FileOutput, NamingMode, SessionOptions, Theme, TransformOptions, TransformResult,
    DEFAULT_CSS_VARIABLES_PREFIX, DEFAULT_RUNTIME_PACKAGE,
};

// ── JS 侧 serde 镜像类型 ──────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsTransformOptions {
    #[serde(default)]
    theme: Value,
    #[serde(default = "default_prefix")]
    css_variables_prefix: String,
    #[serde(default)]
    naming_mode: JsNamingMode,
    #[serde(default = "default_runtime_package")]
    runtime_package: String,
    #[serde(default)]
    source_map: bool,
}

impl Default for JsTransformOptions {
    fn default() -> Self {
        Self {
            theme: Value::Null,
            css_variables_prefix: default_prefix(),
            naming_mode: JsNamingMode::default(),
            runtime_package: default_runtime_package(),
            source_map: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsThemeCssOptions {
    #[serde(default = "default_prefix")]
    css_variables_prefix: String,
    #[serde(default = "default_true")]
    inject_default_theme_in_root: bool,
    #[serde(default = "default_theme_key")]
    default_theme_key: String,
}

impl Default for JsThemeCssOptions {
    fn default() -> Self {
        Self {
            css_variables_prefix: default_prefix(),
            inject_default_theme_in_root: true,
            default_theme_key: default_theme_key(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsSessionOptions {
    #[serde(default)]
    theme: Value,
    #[serde(default)]
    alternate_themes: IndexMap<String, Value>,
    #[serde(flatten)]
    theme_css: JsThemeCssOptions,
    #[serde(default)]
    transform_libraries: Vec<String>,
    #[serde(default)]
    naming_mode: JsNamingMode,
    #[serde(default = "default_runtime_package")]
    runtime_package: String,
    #[serde(default)]
    source_map: bool,
}

impl Default for JsSessionOptions {
    fn default() -> Self {
        Self {
            theme: Value::Null,
            alternate_themes: IndexMap::new(),
            theme_css: JsThemeCssOptions::default(),
            transform_libraries: Vec::new(),
            naming_mode: JsNamingMode::default(),
            runtime_package: default_runtime_package(),
            source_map: false,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
enum JsNamingMode {
    #[default]
    Hash,
    Readable,
}

fn default_prefix() -> String {
    DEFAULT_CSS_VARIABLES_PREFIX.to_string()
}

fn default_runtime_package() -> String {
    DEFAULT_RUNTIME_PACKAGE.to_string()
}

fn default_theme_key() -> String {
    ThemeCssOptions::default().default_theme_key
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    level: &'static str,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsTransformResult {
    code: String,
    css: Option<String>,
    processed: usize,
    map: Option<String>,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsFileOutput {
    code: String,
    css_filename: Option<String>,
    css_text: Option<String>,
    map: Option<String>,
    diagnostics: Vec<JsDiagnostic>,
}

// ── 类型转换 ──────────────────────────────────────────────────

impl From<JsNamingMode> for NamingMode {
    fn from(m: JsNamingMode) -> Self {
        match m {
            JsNamingMode::Hash => NamingMode::Hash,
            JsNamingMode::Readable => NamingMode::Readable,
        }
    }
}

impl From<JsTransformOptions> for TransformOptions {
    fn from(opts: JsTransformOptions) -> Self {
        TransformOptions {
            theme: Theme::from_value(opts.theme),
            css_variables_prefix: opts.css_variables_prefix,
            naming_mode: opts.naming_mode.into(),
            runtime_package: opts.runtime_package,
            source_map: opts.source_map,
        }
    }
}

impl From<JsThemeCssOptions> for ThemeCssOptions {
    fn from(opts: JsThemeCssOptions) -> Self {
        ThemeCssOptions {
            inject_in_root: opts.inject_default_theme_in_root,
            default_theme_key: opts.default_theme_key,
        }
    }
}

impl From<JsSessionOptions> for SessionOptions {
    fn from(opts: JsSessionOptions) -> Self {
        SessionOptions {
            theme: Theme::from_value(opts.theme),
            alternate_themes: opts
                .alternate_themes
                .into_iter()
                .map(|(key, theme)| (key, Theme::from_value(theme)))
                .collect(),
            css_variables_prefix: opts.theme_css.css_variables_prefix,
            inject_default_theme_in_root: opts.theme_css.inject_default_theme_in_root,
            default_theme_key: opts.theme_css.default_theme_key,
            transform_libraries: opts.transform_libraries,
            naming_mode: opts.naming_mode.into(),
            runtime_package: opts.runtime_package,
            source_map: opts.source_map,
        }
    }
}

impl From<Diagnostic> for JsDiagnostic {
    fn from(d: Diagnostic) -> Self {
        JsDiagnostic {
            level: match d.level {
                DiagnosticLevel::Warning => "warning",
            },
            message: d.message,
        }
    }
}

impl From<TransformResult> for JsTransformResult {
    fn from(result: TransformResult) -> Self {
        JsTransformResult {
            code: result.code,
            css: result.css,
            processed: result.processed,
            map: result.map,
            diagnostics: result.diagnostics.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<FileOutput> for JsFileOutput {
    fn from(output: FileOutput) -> Self {
        JsFileOutput {
            code: output.code,
            css_filename: output.css_filename,
            css_text: output.css_text,
            map: output.map,
            diagnostics: output.diagnostics.into_iter().map(Into::into).collect(),
        }
    }
}

/// `undefined` / `null` 取默认值
fn parse_value<T>(value: JsValue, what: &str) -> Result<T, JsError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsError::new(&format!("Invalid {}: {}", what, e)))
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

// ── WASM 导出函数 ─────────────────────────────────────────────

/// 初始化 panic hook（自动调用）
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 转换一个 JS/TS 模块
///
/// @param source   - 模块源码
/// @param filename - 文件名（如 "Button.tsx"），用于判断语法
/// @param options  - `{ theme, cssVariablesPrefix, namingMode, runtimePackage, sourceMap }`，可选
/// @returns `{ code, css, processed, map, diagnostics }`
#[wasm_bindgen(js_name = "transformModule")]
pub fn transform_module(
    source: &str,
    filename: &str,
    options: JsValue,
) -> Result<JsValue, JsError> {
    let opts: JsTransformOptions = parse_value(options, "options")?;
    let result = rs_transform_module(source, filename, &opts.into())
        .map_err(|e| JsError::new(&e.to_string()))?;
    serialize(&JsTransformResult::from(result))
}

/// 生成主题 CSS 变量
///
/// @param themes  - `{ [themeKey]: theme }`，默认主题的键为 `defaultThemeKey`
/// @param options - `{ cssVariablesPrefix, injectDefaultThemeInRoot, defaultThemeKey }`，可选
/// @returns CSS 文本
#[wasm_bindgen(js_name = "generateThemeCss")]
pub fn generate_theme_css(themes: JsValue, options: JsValue) -> Result<String, JsError> {
    let themes: IndexMap<String, Value> = parse_value(themes, "themes")?;
    let opts: JsThemeCssOptions = parse_value(options, "options")?;
    Ok(theme_css(themes, opts))
}

fn theme_css(themes: IndexMap<String, Value>, opts: JsThemeCssOptions) -> String {
    let themes: IndexMap<String, Theme> = themes
        .into_iter()
        .map(|(key, theme)| (key, Theme::from_value(theme)))
        .collect();
    let prefix = opts.css_variables_prefix.clone();
    rs_generate_theme_css(&themes, &prefix, &opts.into())
}

/// 构建会话：bundler 插件的 resolveId / load / transform 钩子转发到这里
#[wasm_bindgen(js_name = "BuildSession")]
pub struct JsBuildSession {
    inner: BuildSession,
}

#[wasm_bindgen(js_class = "BuildSession")]
impl JsBuildSession {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsBuildSession, JsError> {
        let opts: JsSessionOptions = parse_value(options, "options")?;
        Ok(JsBuildSession {
            inner: BuildSession::create(opts.into()),
        })
    }

    #[wasm_bindgen(js_name = "resolveId")]
    pub fn resolve_id(&self, source: &str) -> Option<String> {
        self.inner.resolve_id(source)
    }

    pub fn load(&self, id: &str) -> Option<String> {
        self.inner.load(id)
    }

    /// @returns `{ code, cssFilename, cssText, map, diagnostics }`，不需要处理时返回 `null`
    pub fn transform(&self, source: &str, id: &str) -> Result<JsValue, JsError> {
        match self
            .inner
            .transform(source, id)
            .map_err(|e| JsError::new(&e.to_string()))?
        {
            Some(output) => serialize(&JsFileOutput::from(output)),
            None => Ok(JsValue::NULL),
        }
    }
}
