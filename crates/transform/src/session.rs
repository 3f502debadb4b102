//! 构建会话
//!
//! 一次构建（或一个 dev server 生命周期）内共享的状态：CSS 缓存、
//! 转换结果的记忆表以及主题相关的虚拟模块。bundler 适配层只需要
//! 把 resolve / load / transform 三个钩子转发到这里。

use crate::{transform_module_with, Diagnostic, NamingMode, Theme, TransformError, TransformOptions};
use crate::{DEFAULT_CSS_VARIABLES_PREFIX, DEFAULT_RUNTIME_PACKAGE};
use dashmap::DashMap;
use indexmap::IndexMap;
use zerostyle_core::files::strip_query;
use zerostyle_core::{
    css_filename, css_import_id, generate_theme_css, generate_theme_tokens, is_processable_file,
    BuildCache, ThemeCssOptions, VirtualModule,
};

/// 会话选项
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// 默认主题
    pub theme: Theme,
    /// 其他主题（键即 CSS 类名，如 `dark` → `.dark { ... }`）
    pub alternate_themes: IndexMap<String, Theme>,
    pub css_variables_prefix: String,
    /// 默认主题的变量是否写在 `:root` 上（默认 true）
    pub inject_default_theme_in_root: bool,
    /// 默认主题的键（默认 `"theme"`）
    pub default_theme_key: String,
    /// `node_modules` 中需要转换的库
    pub transform_libraries: Vec<String>,
    pub naming_mode: NamingMode,
    pub runtime_package: String,
    /// 是否为转换后的代码生成 source map
    pub source_map: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        let theme_css = ThemeCssOptions::default();
        Self {
            theme: Theme::default(),
            alternate_themes: IndexMap::new(),
            css_variables_prefix: DEFAULT_CSS_VARIABLES_PREFIX.to_string(),
            inject_default_theme_in_root: theme_css.inject_in_root,
            default_theme_key: theme_css.default_theme_key,
            transform_libraries: Vec::new(),
            naming_mode: NamingMode::default(),
            runtime_package: DEFAULT_RUNTIME_PACKAGE.to_string(),
            source_map: false,
        }
    }
}

/// 单个文件的转换输出
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutput {
    /// 转换后的代码（已在开头注入 CSS import）
    pub code: String,
    /// `{hash}.zero.css`；没有生成 CSS 时为 None
    pub css_filename: Option<String>,
    pub css_text: Option<String>,
    /// JSON source map（`source_map` 选项开启时）
    pub map: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct BuildSession {
    options: SessionOptions,
    transform_options: TransformOptions,
    cache: BuildCache,
    /// `{id}\0{blake3(source)}` -> 转换输出，只记录成功的转换
    transformed: DashMap<String, FileOutput>,
}

impl BuildSession {
    pub fn create(options: SessionOptions) -> Self {
        let transform_options = TransformOptions {
            theme: options.theme.clone(),
            css_variables_prefix: options.css_variables_prefix.clone(),
            naming_mode: options.naming_mode,
            runtime_package: options.runtime_package.clone(),
            source_map: options.source_map,
        };
        Self {
            options,
            transform_options,
            cache: BuildCache::create(),
            transformed: DashMap::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// 解析 import 说明符：运行时虚拟模块与已生成的 `.zero.css`
    pub fn resolve_id(&self, source: &str) -> Option<String> {
        if let Some(module) = VirtualModule::from_import(source, &self.options.runtime_package) {
            return Some(module.id().to_string());
        }
        self.cache.resolve_css_file(source)
    }

    /// 加载虚拟模块或已生成的 CSS；不认识的 id 返回 None，交给 bundler 处理
    pub fn load(&self, id: &str) -> Option<String> {
        match VirtualModule::from_id(id) {
            Some(VirtualModule::Styles) => Some(self.theme_css()),
            Some(VirtualModule::Theme) => Some(self.theme_module()),
            None => {
                let path = strip_query(id);
                path.ends_with(".zero.css")
                    .then(|| self.cache.css(path).unwrap_or_default())
            }
        }
    }

    /// 参与生成的全部主题：默认主题在前
    pub fn themes(&self) -> IndexMap<String, Theme> {
        let mut themes = IndexMap::with_capacity(self.options.alternate_themes.len() + 1);
        themes.insert(
            self.options.default_theme_key.clone(),
            self.options.theme.clone(),
        );
        for (key, theme) in &self.options.alternate_themes {
            themes.entry(key.clone()).or_insert_with(|| theme.clone());
        }
        themes
    }

    /// 全局主题 CSS（`{runtime}/styles.css`）
    pub fn theme_css(&self) -> String {
        let options = ThemeCssOptions {
            inject_in_root: self.options.inject_default_theme_in_root,
            default_theme_key: self.options.default_theme_key.clone(),
        };
        generate_theme_css(&self.themes(), &self.options.css_variables_prefix, &options)
    }

    /// 主题 token 模块（`{runtime}/theme`）
    pub fn theme_module(&self) -> String {
        let tokens = generate_theme_tokens(&self.options.theme, &self.options.css_variables_prefix);
        format!("export default {};\n", tokens)
    }

    /// 转换一个文件
    ///
    /// 不需要处理的文件、没有 styled 调用的文件返回 `Ok(None)`。
    /// 失败时不写入任何缓存。
    pub fn transform(&self, source: &str, id: &str) -> Result<Option<FileOutput>, TransformError> {
        if !is_processable_file(id, &self.options.transform_libraries) {
            return Ok(None);
        }

        let memo_key = format!("{}\0{}", id, blake3::hash(source.as_bytes()));
        if let Some(hit) = self.transformed.get(&memo_key) {
            tracing::debug!(id, "transform cache hit");
            return Ok(Some(hit.value().clone()));
        }

        let result = transform_module_with(source, id, &self.transform_options, |css| {
            Some(css_import_id(&css_filename(css)))
        })?;
        if result.processed == 0 {
            return Ok(None);
        }

        // 转换成功后才写入 CSS 缓存
        let filename = result.css.as_deref().map(|css| {
            let filename = css_filename(css);
            self.cache.register_css(&filename, css);
            filename
        });
        let output = FileOutput {
            code: result.code,
            css_filename: filename,
            css_text: result.css,
            map: result.map,
            diagnostics: result.diagnostics,
        };

        self.transformed.insert(memo_key, output.clone());
        Ok(Some(output))
    }

    /// 结束会话，释放所有缓存
    pub fn dispose(self) {
        tracing::debug!(
            css_files = self.cache.css_count(),
            transformed = self.transformed.len(),
            "build session disposed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeSet;
    use zerostyle_core::files::{VIRTUAL_STYLES_ID, VIRTUAL_THEME_ID};

    fn session() -> BuildSession {
        BuildSession::create(SessionOptions {
            theme: Theme::from_value(json!({
                "palette": { "primary": { "main": "#ff0000" } }
            })),
            ..Default::default()
        })
    }

    const BUTTON: &str = r#"import { styled } from "@zerostyle/runtime";
export const Button = styled("button")({ color: "primary.main" });"#;

    #[test]
    fn test_resolve_virtual_modules() {
        let session = session();
        assert_eq!(
            session.resolve_id("@zerostyle/runtime/styles.css").as_deref(),
            Some(VIRTUAL_STYLES_ID)
        );
        assert_eq!(
            session.resolve_id("@zerostyle/runtime/theme").as_deref(),
            Some(VIRTUAL_THEME_ID)
        );
        assert_eq!(session.resolve_id("./App.css"), None);
    }

    #[test]
    fn test_load_theme_modules() {
        let session = session();

        assert_eq!(
            session.load(VIRTUAL_STYLES_ID).unwrap(),
            ":root {\n  --mui-palette-primary-main: #ff0000;\n}\n"
        );
        assert_eq!(
            session.load(VIRTUAL_THEME_ID).unwrap(),
            "export default {\"palette\":{\"primary\":{\"main\":\"var(--mui-palette-primary-main)\"}}};\n"
        );
        assert_eq!(session.load("/src/App.tsx"), None);
    }

    #[test]
    fn test_transform_registers_css() {
        let session = session();
        let output = session.transform(BUTTON, "/src/Button.jsx").unwrap().unwrap();

        let filename = output.css_filename.clone().unwrap();
        let import_id = format!("./{}", filename);
        assert!(output.code.starts_with(&format!("import \"{}\";\n", import_id)));

        assert_eq!(session.resolve_id(&import_id), Some(filename.clone()));
        assert_eq!(session.load(&filename), output.css_text);
        assert_eq!(session.load("missing.zero.css").as_deref(), Some(""));
    }

    #[test]
    fn test_identical_css_shares_one_entry() {
        let session = session();
        let a = session.transform(BUTTON, "/src/A.jsx").unwrap().unwrap();
        let b = session.transform(BUTTON, "/src/B.jsx").unwrap().unwrap();

        assert_eq!(a.css_filename, b.css_filename);
        assert_eq!(session.cache().css_count(), 1);
    }

    #[test]
    fn test_repeated_transform_is_memoised() {
        let session = session();
        let first = session.transform(BUTTON, "/src/Button.jsx").unwrap();
        let second = session.transform(BUTTON, "/src/Button.jsx").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_skipped_files() {
        let session = session();
        assert_eq!(session.transform(BUTTON, "/src/Button.css").unwrap(), None);
        assert_eq!(
            session
                .transform(BUTTON, "/app/node_modules/ui/Button.js")
                .unwrap(),
            None
        );
        assert_eq!(
            session
                .transform("export const x = 1;", "/src/x.js")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_failed_transform_leaves_cache_empty() {
        let session = session();
        let source = r#"import { styled } from "@zerostyle/runtime";
export const A = styled("div")({ color: async () => "red" });"#;

        assert!(session.transform(source, "/src/A.js").is_err());
        assert!(session.cache().is_empty());
    }

    #[test]
    fn test_concurrent_transforms_share_the_cache() {
        let session = session();
        let other = r#"import { styled } from "@zerostyle/runtime";
export const Link = styled("a")({ color: "red", padding: 2 });"#;
        let broken = r#"import { styled } from "@zerostyle/runtime";
export const Bad = styled("div")({ color: async () => "blue", margin: 3 });"#;

        let outputs: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let session = &session;
                    scope.spawn(move || {
                        let (source, id) = match i % 3 {
                            0 => (BUTTON, format!("/src/Button{}.jsx", i)),
                            1 => (other, format!("/src/Link{}.jsx", i)),
                            _ => (broken, format!("/src/Bad{}.jsx", i)),
                        };
                        session.transform(source, &id)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        let failures = outputs.iter().filter(|output| output.is_err()).count();
        assert_eq!(failures, 2);

        let filenames: BTreeSet<String> = outputs
            .into_iter()
            .filter_map(|output| output.ok().flatten())
            .filter_map(|output| output.css_filename)
            .collect();
        assert_eq!(filenames.len(), 2);
        assert_eq!(session.cache().css_count(), 2);
        for filename in &filenames {
            let css = session.load(filename).unwrap_or_default();
            assert!(css.contains("color:"));
            // 失败文件的 CSS 没有写入
            assert!(!css.contains("margin"));
        }
    }

    #[test]
    fn test_source_map_option() {
        let plain = session().transform(BUTTON, "/src/Button.jsx").unwrap().unwrap();
        assert_eq!(plain.map, None);

        let mapped = BuildSession::create(SessionOptions {
            source_map: true,
            ..Default::default()
        });
        let output = mapped.transform(BUTTON, "/src/Button.jsx").unwrap().unwrap();
        let map: serde_json::Value = serde_json::from_str(output.map.as_deref().unwrap()).unwrap();
        assert_eq!(map["sources"], json!(["/src/Button.jsx"]));
        assert!(output.code.starts_with("import \"./"));
    }

    #[test]
    fn test_alternate_themes() {
        let mut alternate_themes = IndexMap::new();
        alternate_themes.insert(
            "dark".to_string(),
            Theme::from_value(json!({ "palette": { "mode": "dark" } })),
        );
        let session = BuildSession::create(SessionOptions {
            theme: Theme::from_value(json!({ "palette": { "mode": "light" } })),
            alternate_themes,
            ..Default::default()
        });

        assert_eq!(
            session.theme_css(),
            ":root {\n  --mui-palette-mode: light;\n}\n.dark {\n  --mui-palette-mode: dark;\n}\n"
        );
        session.dispose();
    }
}
