//! 文件过滤与虚拟模块 id

/// 可处理的脚本扩展名
pub const SCRIPT_EXTENSIONS: [&str; 8] = [".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts"];

/// 依赖目录
const DEPENDENCY_DIR: &str = "node_modules";

/// 运行时自身的构建产物目录，永远不处理
const RUNTIME_OUTPUT_DIR: &str = "runtime/dist";

/// 主题 CSS 的虚拟模块 id
pub const VIRTUAL_STYLES_ID: &str = "\0zero-runtime-styles.css";

/// 主题 token 的虚拟模块 id
pub const VIRTUAL_THEME_ID: &str = "\0zero-runtime-theme.js";

/// 去掉 bundler 附加的查询串（`App.tsx?v=123`）
pub fn strip_query(id: &str) -> &str {
    id.split_once('?').map(|(path, _)| path).unwrap_or(id)
}

pub fn has_script_extension(filename: &str) -> bool {
    let path = strip_query(filename);
    SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// 文件是否需要经过样式转换
///
/// 依赖目录中的文件只有路径包含白名单库名时才处理。
pub fn is_processable_file(filename: &str, transform_libraries: &[String]) -> bool {
    let path = strip_query(filename);
    let in_dependencies = path.contains(DEPENDENCY_DIR);
    let allow_listed = in_dependencies
        && transform_libraries
            .iter()
            .any(|library| path.contains(library.as_str()));

    has_script_extension(path)
        && (allow_listed || !in_dependencies)
        && !path.contains(RUNTIME_OUTPUT_DIR)
}

/// 运行时包暴露的两个虚拟入口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualModule {
    /// `{runtime}/styles.css`
    Styles,
    /// `{runtime}/theme`
    Theme,
}

impl VirtualModule {
    pub fn id(self) -> &'static str {
        match self {
            VirtualModule::Styles => VIRTUAL_STYLES_ID,
            VirtualModule::Theme => VIRTUAL_THEME_ID,
        }
    }

    /// 只按名字匹配 import 说明符，不访问文件系统
    pub fn from_import(source: &str, runtime_package: &str) -> Option<Self> {
        let subpath = source.strip_prefix(runtime_package)?;
        match subpath {
            "/styles.css" => Some(VirtualModule::Styles),
            "/theme" => Some(VirtualModule::Theme),
            _ => None,
        }
    }

    /// 按已解析的 id 匹配
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            VIRTUAL_STYLES_ID => Some(VirtualModule::Styles),
            VIRTUAL_THEME_ID => Some(VirtualModule::Theme),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn libs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_script_extensions() {
        assert!(is_processable_file("/app/src/App.tsx", &[]));
        assert!(is_processable_file("/app/src/util.mjs", &[]));
        assert!(is_processable_file("/app/src/App.tsx?v=1", &[]));
        assert!(!is_processable_file("/app/src/App.css", &[]));
        assert!(!is_processable_file("/app/src/App.tsx.map", &[]));
    }

    #[test]
    fn test_dependency_allow_list() {
        let path = "/app/node_modules/local-ui-lib/index.js";
        assert!(!is_processable_file(path, &[]));
        assert!(is_processable_file(path, &libs(&["local-ui-lib"])));
        assert!(!is_processable_file(path, &libs(&["other-lib"])));
    }

    #[test]
    fn test_runtime_output_is_never_processed() {
        assert!(!is_processable_file("/repo/packages/runtime/dist/index.js", &[]));
        assert!(!is_processable_file(
            "/app/node_modules/@zerostyle/runtime/dist/index.js",
            &libs(&["@zerostyle/runtime"])
        ));
    }

    #[test]
    fn test_virtual_modules() {
        let runtime = "@zerostyle/runtime";
        assert_eq!(
            VirtualModule::from_import("@zerostyle/runtime/styles.css", runtime),
            Some(VirtualModule::Styles)
        );
        assert_eq!(
            VirtualModule::from_import("@zerostyle/runtime/theme", runtime),
            Some(VirtualModule::Theme)
        );
        assert_eq!(VirtualModule::from_import("@zerostyle/runtime", runtime), None);
        assert_eq!(VirtualModule::from_import("./styles.css", runtime), None);
        assert_eq!(
            VirtualModule::from_id(VIRTUAL_THEME_ID),
            Some(VirtualModule::Theme)
        );
        assert_eq!(VirtualModule::Styles.id(), VIRTUAL_STYLES_ID);
    }
}
