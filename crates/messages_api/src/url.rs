/// Default messages endpoint.
pub const DEFAULT_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Normalize a configured endpoint URL.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_MESSAGES_URL`]
/// 2) surrounding whitespace and trailing slashes are removed
pub fn normalize_messages_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_MESSAGES_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}
