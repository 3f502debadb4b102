use thiserror::Error;

/// 样式管线错误
///
/// token 未命中不算错误（只产生警告），这里只有会让生成代码失效的情况。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// 运行时函数无法改写；整个文件的转换失败
    #[error("{location}: could not rewrite the runtime function for `{key}`: {message}")]
    Rewrite {
        key: String,
        location: String,
        message: String,
    },
}

impl StyleError {
    pub fn rewrite(
        key: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StyleError::Rewrite {
            key: key.into(),
            location: location.into(),
            message: message.into(),
        }
    }
}
