use crate::css::kebab_case;
use crate::types::NamingMode;

/// 命名策略 trait
///
/// 所有名字都由内容决定，不依赖计数器：同样的输入在任何一次构建里都得到同样的名字，
/// 增量构建不会因此失效。
pub trait NamingStrategy {
    /// 动态值对应的 CSS 变量名（不带 `--`）
    fn variable_name(&self, property: &str, source: &str, is_unit_less: bool) -> String;

    /// 样式规则的类名
    fn class_name(&self, hint: Option<&str>, seed: &str) -> String;
}

/// Hash 命名策略：基于内容生成稳定 hash
pub struct HashNaming;

impl NamingStrategy for HashNaming {
    fn variable_name(&self, property: &str, source: &str, is_unit_less: bool) -> String {
        let hex = variable_hash(property, source, is_unit_less);
        format!("{}-{}", identifier_part(property), &hex[..12])
    }

    fn class_name(&self, _hint: Option<&str>, seed: &str) -> String {
        let hash = blake3::hash(seed.as_bytes());
        let hex = format!("{}", hash);
        format!("zs_{}", &hex[..12])
    }
}

/// Readable 命名策略：短 hash，类名带上组件名，方便调试
pub struct ReadableNaming;

impl NamingStrategy for ReadableNaming {
    fn variable_name(&self, property: &str, source: &str, is_unit_less: bool) -> String {
        let hex = variable_hash(property, source, is_unit_less);
        format!("{}-{}", identifier_part(property), &hex[..6])
    }

    fn class_name(&self, hint: Option<&str>, seed: &str) -> String {
        let hash = blake3::hash(seed.as_bytes());
        let hex = format!("{}", hash);
        match hint.map(identifier_part).filter(|h| !h.is_empty()) {
            Some(hint) => format!("{}_{}", hint, &hex[..6]),
            None => format!("zs_{}", &hex[..6]),
        }
    }
}

/// 根据 NamingMode 创建对应的策略
pub fn create_naming_strategy(mode: NamingMode) -> Box<dyn NamingStrategy> {
    match mode {
        NamingMode::Hash => Box::new(HashNaming),
        NamingMode::Readable => Box::new(ReadableNaming),
    }
}

fn variable_hash(property: &str, source: &str, is_unit_less: bool) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(property.as_bytes());
    hasher.update(&[0, is_unit_less as u8, 0]);
    hasher.update(source.as_bytes());
    format!("{}", hasher.finalize())
}

/// 把属性名 / 组件名转成可用于 CSS 标识符的片段
fn identifier_part(raw: &str) -> String {
    let kebab = kebab_case(raw.trim_start_matches('-'));
    let cleaned: String = kebab
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('-');

    // 标识符不能以数字开头
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "(props) => props.isRed ? 'primary.main' : 'secondary.main'";

    #[test]
    fn test_variable_name_stability() {
        let naming = HashNaming;
        let name1 = naming.variable_name("color", SOURCE, false);
        let name2 = naming.variable_name("color", SOURCE, false);

        assert_eq!(name1, name2, "Variable naming should be stable");
        assert!(name1.starts_with("color-"));
        assert_eq!(name1.len(), "color-".len() + 12);
    }

    #[test]
    fn test_variable_name_different_inputs() {
        let naming = HashNaming;
        let a = naming.variable_name("color", SOURCE, false);
        let b = naming.variable_name("backgroundColor", SOURCE, false);
        let c = naming.variable_name("color", "() => 'red'", false);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(b.starts_with("background-color-"));
    }

    #[test]
    fn test_variable_name_is_valid_ident() {
        let naming = HashNaming;
        let name = naming.variable_name("--custom.prop", SOURCE, true);
        assert!(name.starts_with("custom_prop-"));
    }

    #[test]
    fn test_class_name_hash() {
        let naming = HashNaming;
        let name = naming.class_name(Some("Button"), "{ color: 'red' }");
        assert!(name.starts_with("zs_"));
        assert_eq!(name.len(), 15);
        assert_eq!(name, naming.class_name(None, "{ color: 'red' }"));
    }

    #[test]
    fn test_readable_naming() {
        let naming = ReadableNaming;
        let class = naming.class_name(Some("PrimaryButton"), "{ color: 'red' }");
        assert!(class.starts_with("primary-button_"));

        let var = naming.variable_name("zIndex", SOURCE, true);
        assert_eq!(var.len(), "z-index-".len() + 6);
    }

    #[test]
    fn test_readable_naming_without_hint() {
        let naming = ReadableNaming;
        let class = naming.class_name(None, "{}");
        assert!(class.starts_with("zs_"));
    }
}
