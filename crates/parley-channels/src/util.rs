//! Shared helpers for channel adapters

/// Maximum characters of user text written to logs
pub const MAX_LOG_TEXT_LENGTH: usize = 50;

/// Discord message character limit
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Patterns that indicate potentially sensitive content
pub const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "api-key",
    "bearer",
    "authorization",
    "credential",
    "private",
    "ssh",
    "-----begin",
];

/// Mask potentially sensitive text for logging
///
/// Text containing a sensitive pattern is replaced entirely; anything else
/// is cut to [`MAX_LOG_TEXT_LENGTH`] characters.
///
/// # Examples
/// ```
/// use parley_channels::util::mask_for_logging;
///
/// assert!(mask_for_logging("my password is hunter2").contains("REDACTED"));
/// assert_eq!(mask_for_logging("Hello"), "Hello");
/// ```
#[must_use]
pub fn mask_for_logging(text: &str) -> String {
    let lower = text.to_lowercase();
    if SENSITIVE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return "[REDACTED - potentially sensitive content]".to_string();
    }

    match text.char_indices().nth(MAX_LOG_TEXT_LENGTH) {
        Some((end, _)) => format!("{}...[truncated]", &text[..end]),
        None => text.to_string(),
    }
}

/// Parse a platform snowflake id
pub fn parse_id(raw: &str, what: &str) -> crate::error::Result<u64> {
    raw.parse()
        .map_err(|_| crate::error::Error::Parse(format!("invalid {what} id: {raw}")))
}
