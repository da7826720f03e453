/// True if `s` parses as a JSON document (any value, not just objects).
pub fn is_valid_json(s: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(s).is_ok()
}
