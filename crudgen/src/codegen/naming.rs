//! Naming utilities for code generation

use heck::ToKebabCase;

/// Convert a snake_case identifier to lowerCamelCase
///
/// The first segment is kept as written; every later segment gets its first
/// character upper-cased. Names without an underscore are returned unchanged.
pub fn snake_to_camel(name: &str) -> String {
    let mut segments = name.split('_');
    let mut camel = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        camel.push_str(&upper_head(segment));
    }
    camel
}

/// Upper-case exactly the first character
pub fn upper_head(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive English plural: trailing `y` becomes `ies`, anything else gets `s`
pub fn pluralize(word: &str) -> String {
    match word.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", word),
    }
}

/// Drop lines that are empty or whitespace-only
pub fn remove_empty_rows(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Route path for a table, e.g. "chapter_stock" -> "/chapter-stock"
pub fn to_route_segment(table: &str) -> String {
    format!("/{}", table.to_kebab_case())
}

/// Path parameter carrying a row id, e.g. "branch" -> "branch_id"
pub fn to_id_param(table: &str) -> String {
    format!("{}_id", table)
}

/// Check if a name is a Go reserved keyword
pub fn is_go_keyword(name: &str) -> bool {
    matches!(
        name,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

/// Local Go variable for a column: lowerCamelCase, suffixed with `_` if it is a keyword
pub fn to_go_var_name(column: &str) -> String {
    let camel = snake_to_camel(column);
    if is_go_keyword(&camel) {
        format!("{}_", camel)
    } else {
        camel
    }
}

/// Exported name used in generated Go and proto code, e.g. "chapter_stock" -> "ChapterStock"
pub fn to_entity_name(table: &str) -> String {
    upper_head(&snake_to_camel(table))
}
