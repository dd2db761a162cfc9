use lazy_static::lazy_static;
use regex::Regex;

/// Longest value a single field may hold after sanitization.
pub const MAX_FIELD_LEN: usize = 200;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r#"[<>"'&]"#).unwrap();
}

/// Clean one raw input value before it lands in the draft.
///
/// Strips characters that could read as markup, truncates, trims. Pure and
/// idempotent, so re-sanitizing an already stored value is a no-op.
pub fn sanitize(input: &str) -> String {
    let stripped = MARKUP.replace_all(input, "");
    let truncated: String = stripped.chars().take(MAX_FIELD_LEN).collect();

    truncated.trim().to_string()
}
