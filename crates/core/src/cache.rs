use dashmap::DashMap;

/// 构建会话内共享的 CSS 缓存
///
/// - CSS 查找表：`{hash}.zero.css` → CSS 文本
/// - CSS 文件查找表：import id（`./{hash}.zero.css`）→ 文件名
///
/// 键由内容决定，同样的 CSS 总是写入同一个键，并发写入也是幂等的。
/// 会话开始时 `create()`，会话结束时 drop。只应写入转换成功的结果。
#[derive(Debug, Default)]
pub struct BuildCache {
    css_lookup: DashMap<String, String>,
    css_file_lookup: DashMap<String, String>,
}

impl BuildCache {
    pub fn create() -> Self {
        Self::default()
    }

    /// 登记一个 CSS 资源，返回其 import id
    pub fn register_css(&self, filename: &str, css: &str) -> String {
        let import_id = css_import_id(filename);
        self.css_lookup
            .entry(filename.to_string())
            .or_insert_with(|| css.to_string());
        self.css_file_lookup
            .entry(import_id.clone())
            .or_insert_with(|| filename.to_string());
        import_id
    }

    /// 按文件名取 CSS 文本（接受带或不带 `./` 前缀的 id）
    pub fn css(&self, id: &str) -> Option<String> {
        let filename = id.strip_prefix("./").unwrap_or(id);
        self.css_lookup.get(filename).map(|entry| entry.value().clone())
    }

    /// import id → 文件名
    pub fn resolve_css_file(&self, import_id: &str) -> Option<String> {
        self.css_file_lookup
            .get(import_id)
            .map(|entry| entry.value().clone())
    }

    pub fn css_count(&self) -> usize {
        self.css_lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.css_lookup.is_empty()
    }
}

/// 模块里引用该 CSS 资源的路径：`./{filename}`
pub fn css_import_id(filename: &str) -> String {
    format!("./{}", filename)
}

/// 基于 CSS 内容生成资源文件名：`{hash}.zero.css`
pub fn css_filename(css: &str) -> String {
    let hash = blake3::hash(css.as_bytes());
    let hex = format!("{}", hash);
    format!("{}.zero.css", &hex[..12])
}
