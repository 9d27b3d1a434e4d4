/// URL key for a display name: trimmed, lower-cased, whitespace runs joined by `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
