//! Helpers for deriving local variable names.

/// Lowercase the first character of `name`.
///
/// Participant and type names are turned into local variable names this way,
/// e.g. `OrderService` becomes `orderService`.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Return `base` if it is free, otherwise the first of `base1`, `base2`, ...
/// for which `taken` returns `false`.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }

    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
