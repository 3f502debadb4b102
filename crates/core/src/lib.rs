pub mod cache;
pub mod css;
pub mod error;
pub mod extract;
pub mod files;
pub mod naming;
pub mod pipeline;
pub mod resolver;
pub mod style;
pub mod theme;
pub mod theme_css;
pub mod types;
pub mod unitless;

// Re-export commonly used types
pub use cache::{css_filename, css_import_id, BuildCache};
pub use error::StyleError;
pub use extract::{extract_functions, resolve_static_tokens, Extraction, FunctionRewriter, VariableBinding};
pub use files::{is_processable_file, VirtualModule};
pub use naming::{create_naming_strategy, NamingStrategy};
pub use pipeline::{StyleOutput, StylePipeline, VariantOutput};
pub use resolver::{TokenResolution, TokenResolver};
pub use style::{Literal, StyleTree, StyleValue, Variant};
pub use theme::Theme;
pub use theme_css::{generate_css_variables, generate_theme_css, generate_theme_tokens, ThemeCssOptions};
pub use types::{CssVariableSet, Diagnostic, DiagnosticLevel, NamingMode};
pub use unitless::is_unit_less;
