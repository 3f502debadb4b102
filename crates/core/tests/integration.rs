use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::json;
use zerostyle_core::naming::{HashNaming, ReadableNaming};
use zerostyle_core::{
    generate_theme_css, Diagnostic, FunctionRewriter, Literal, StyleError, StylePipeline,
    StyleTree, StyleValue, Theme, ThemeCssOptions, TokenResolver, Variant,
};

/// 测试用前端：函数即源码字符串，改写双引号中的 token
struct SourceRewriter;

impl FunctionRewriter<String> for SourceRewriter {
    type Expr = String;

    fn source_text(&self, _key: &str, func: &String) -> Result<String, StyleError> {
        Ok(func.clone())
    }

    fn rewrite(
        &mut self,
        key: &str,
        func: &String,
        tokens: &TokenResolver<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String, StyleError> {
        let rewritten: Vec<String> = func
            .split('"')
            .enumerate()
            .map(|(i, part)| match tokens.resolve_for_property(key, part) {
                Some(resolution) if i % 2 == 1 => {
                    diagnostics.extend(resolution.diagnostic());
                    resolution.css_var
                }
                _ => part.to_string(),
            })
            .collect();
        Ok(rewritten.join("\""))
    }
}

fn theme() -> Theme {
    Theme::from_value(json!({
        "palette": {
            "primary": { "main": "#ff0000" },
            "secondary": { "main": "#00ff00" },
            "text": { "primary": "#111" }
        },
        "shape": { "borderRadius": 4 }
    }))
}

fn func(source: &str) -> StyleValue<String> {
    StyleValue::Function(source.to_string())
}

#[test]
fn test_button_style_end_to_end() {
    let theme = theme();
    let naming = HashNaming;
    let pipeline = StylePipeline::new(TokenResolver::new(&theme, "mui"), &naming);

    let tree = StyleTree::new()
        .with(
            "color",
            func(r#"(props) => props.isRed ? "primary.main" : "secondary.main""#),
        )
        .with_literal("backgroundColor", "text.primary")
        .with_literal("padding", 12.0)
        .with_nested(
            "&:hover",
            StyleTree::new().with("opacity", func("(props) => props.dim ? 0.5 : 1")),
        )
        .with_variant(Variant {
            props: IndexMap::from([("size".to_string(), Literal::from("small"))]),
            style: StyleTree::new().with_literal("padding", 4.0),
        });

    let mut diagnostics = Vec::new();
    let output = pipeline
        .transform_style_tree(tree, "seed", Some("Button"), &mut SourceRewriter, &mut diagnostics)
        .unwrap();

    println!("=== CSS ===\n{}", output.css);

    assert_eq!(output.bindings.len(), 2);
    let color = &output.bindings[0];
    assert_eq!(
        color.expression,
        r#"(props) => props.isRed ? "var(--mui-palette-primary-main)" : "var(--mui-palette-secondary-main)""#
    );
    assert!(!color.is_unit_less);
    assert!(output.bindings[1].is_unit_less);

    let class = &output.class_name;
    let expected = format!(
        ".{class} {{\n  color: var(--{color_id});\n  background-color: var(--mui-palette-text-primary);\n  padding: 12px;\n}}\n\
         .{class}:hover {{\n  opacity: var(--{opacity_id});\n}}\n\
         .{class}-v0 {{\n  padding: 4px;\n}}\n",
        class = class,
        color_id = color.variable_id,
        opacity_id = output.bindings[1].variable_id,
    );
    assert_eq!(output.css, expected);

    assert_eq!(output.variants.len(), 1);
    assert_eq!(output.variants[0].class_name, format!("{}-v0", class));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_n_functions_give_n_bindings() {
    let theme = theme();
    let naming = HashNaming;
    let pipeline = StylePipeline::new(TokenResolver::new(&theme, "mui"), &naming);

    let tree = StyleTree::new()
        .with("width", func("(p) => p.w"))
        .with("height", func("(p) => p.h"))
        .with_literal("display", "flex")
        .with_nested(
            "@media (min-width: 600px)",
            StyleTree::new()
                .with("margin", func("(p) => p.m"))
                .with_literal("gap", 2.0),
        );
    let functions = tree.function_count();

    let mut diagnostics = Vec::new();
    let output = pipeline
        .transform_style_tree(tree, "seed", None, &mut SourceRewriter, &mut diagnostics)
        .unwrap();

    assert_eq!(functions, 3);
    assert_eq!(output.bindings.len(), functions);
    assert_eq!(output.tree.function_count(), 0);
    assert_eq!(
        output.tree.get("display"),
        Some(&StyleValue::Literal(Literal::from("flex")))
    );
    let keys: Vec<&str> = output.tree.entries.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["width", "height", "display", "@media (min-width: 600px)"]);
}

#[test]
fn test_repeated_builds_are_stable() {
    let theme = theme();
    let build = || {
        let naming = HashNaming;
        let pipeline = StylePipeline::new(TokenResolver::new(&theme, "mui"), &naming);
        let tree = StyleTree::new().with("color", func(r#"() => "primary.main""#));
        pipeline
            .transform_style_tree(tree, "same seed", None, &mut SourceRewriter, &mut Vec::new())
            .unwrap()
    };

    assert_eq!(build(), build());
}

#[test]
fn test_unresolved_tokens_are_warnings() {
    let theme = theme();
    let naming = ReadableNaming;
    let pipeline = StylePipeline::new(TokenResolver::new(&theme, "mui"), &naming);

    let tree = StyleTree::new()
        .with_literal("border", "nonexistent.path")
        .with("color", func(r#"() => "missing.token""#));

    let mut diagnostics = Vec::new();
    let output = pipeline
        .transform_style_tree(tree, "seed", Some("Card"), &mut SourceRewriter, &mut diagnostics)
        .unwrap();

    assert!(output.class_name.starts_with("card_"));
    assert!(output.css.contains("border: var(--mui-nonexistent-path);"));
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(Diagnostic::is_warning));
}

#[test]
fn test_theme_css_scenario() {
    let themes = IndexMap::from([(
        "theme".to_string(),
        Theme::from_value(json!({ "palette": { "primary": { "main": "#ff0000" } } })),
    )]);

    let css = generate_theme_css(&themes, "mui", &ThemeCssOptions::default());
    assert!(css.starts_with(":root {"));
    assert!(css.contains("--mui-palette-primary-main: #ff0000;"));
}
