use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 命名策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingMode {
    /// 基于内容 hash（默认）
    #[default]
    Hash,
    /// 调试友好：更短的 hash，类名可带组件名前缀
    Readable,
}

/// 主题 CSS 变量集合：`--mui-palette-primary-main` → `#ff0000`
///
/// 每次生成都是新的临时产物，保持插入顺序以稳定输出。
pub type CssVariableSet = IndexMap<String, String>;

/// 诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Warning,
}
