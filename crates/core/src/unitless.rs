use phf::phf_set;

/// 数值不需要单位的 CSS 属性（camelCase）
static UNITLESS_PROPERTIES: phf::Set<&'static str> = phf_set! {
    "animationIterationCount",
    "aspectRatio",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "columns",
    "flex",
    "flexGrow",
    "flexPositive",
    "flexShrink",
    "flexNegative",
    "flexOrder",
    "gridArea",
    "gridRow",
    "gridRowEnd",
    "gridRowSpan",
    "gridRowStart",
    "gridColumn",
    "gridColumnEnd",
    "gridColumnSpan",
    "gridColumnStart",
    "fontWeight",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "scale",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
};

/// 属性的数值是否不带单位
///
/// 接受 camelCase 与 kebab-case；自定义属性（`--x`）一律视为无单位。
pub fn is_unit_less(property: &str) -> bool {
    if property.starts_with("--") {
        return true;
    }
    if property.contains('-') {
        return UNITLESS_PROPERTIES.contains(kebab_to_camel(property).as_str());
    }
    UNITLESS_PROPERTIES.contains(property)
}

fn kebab_to_camel(property: &str) -> String {
    let mut result = String::with_capacity(property.len());
    let mut capitalize_next = false;

    for ch in property.trim_start_matches('-').chars() {
        if ch == '-' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_less_properties() {
        assert!(is_unit_less("opacity"));
        assert!(is_unit_less("zIndex"));
        assert!(is_unit_less("flexGrow"));
        assert!(is_unit_less("--my-var"));
    }

    #[test]
    fn test_kebab_case_input() {
        assert!(is_unit_less("z-index"));
        assert!(is_unit_less("line-height"));
        assert!(!is_unit_less("margin-top"));
    }

    #[test]
    fn test_unit_properties() {
        assert!(!is_unit_less("color"));
        assert!(!is_unit_less("width"));
        assert!(!is_unit_less("padding"));
    }
}
