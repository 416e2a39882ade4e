/// Shapes a base url into route form: exactly one leading `/` and no trailing `/`,
/// except for the root path `/` itself.
///
/// Nothing else is touched: no case folding, repeated separators inside the path are
/// kept, percent escapes are not decoded.
pub fn normalize(path: &str) -> String {
    let mut normalized = if path.starts_with('/') { path.to_owned() } else { format!("/{path}") };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}
