//! Classification of type names as they appear in diagrams.
//!
//! Diagrams carry type names as plain text. These helpers decide whether a
//! name denotes "no value", a primitive with a zero literal, or a reference
//! type that is default-constructed.

use crate::model::Initializer;

const PRIMITIVES: &[&str] = &[
    "int", "long", "short", "byte", "float", "double", "boolean", "bool", "char",
];

/// Returns `true` when `type_name` denotes the absence of a value.
///
/// An empty type name means no return type was declared.
pub fn is_void(type_name: &str) -> bool {
    let trimmed = type_name.trim();
    trimmed.is_empty() || trimmed == "void"
}

/// Returns `true` for the built-in value types.
pub fn is_primitive(type_name: &str) -> bool {
    PRIMITIVES.contains(&type_name)
}

/// Returns `true` when a word reads as a type rather than a variable name.
///
/// Used to disambiguate two-word declarations such as `int x` and `x int`:
/// primitives, `void`, `String` and capitalized words count as types.
pub fn is_recognized_type(word: &str) -> bool {
    let element = word.trim_end_matches("[]");
    is_primitive(element)
        || matches!(element, "void" | "String" | "string")
        || element.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Zero-value literal for primitives and `String`; `None` for reference types.
pub fn zero_value(type_name: &str) -> Option<&'static str> {
    match type_name {
        "int" | "long" | "short" | "byte" => Some("0"),
        "double" | "float" => Some("0.0"),
        "boolean" | "bool" => Some("false"),
        "char" => Some("'\\0'"),
        "String" | "string" => Some("\"\""),
        _ => None,
    }
}

/// Default initializer used when a binding has to be synthesized.
///
/// Primitives get their zero literal, everything else a no-argument construction.
pub fn default_initializer(type_name: &str) -> Initializer {
    match zero_value(type_name) {
        Some(literal) => Initializer::Literal(literal.to_string()),
        None => Initializer::Construct(Vec::new()),
    }
}

/// Rewrite diagram generics (`List~Item~`) into angle-bracket form (`List<Item>`).
pub fn normalize_generics(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut open = false;
    for c in type_name.chars() {
        if c == '~' {
            out.push(if open { '>' } else { '<' });
            open = !open;
        } else {
            out.push(c);
        }
    }
    out
}
