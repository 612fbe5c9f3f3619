use crate::utils::text::truncate_utf8_prefix;
use once_cell::sync::Lazy;
use regex::Regex;

const TOKEN_REDACTION: &str = "***REDACTED***";

static BOT_TOKEN_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/bot[0-9]+:[A-Za-z0-9_-]+").expect("bot token regex"));

static BARE_BOT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{6,}:[A-Za-z0-9_-]{30,}\b").expect("bare token regex"));

/// Strips bot tokens from URLs and free text before they reach a log line.
pub fn redact_token(text: &str) -> String {
    let masked = BOT_TOKEN_PATH.replace_all(text, format!("/bot{}", TOKEN_REDACTION).as_str());
    BARE_BOT_TOKEN
        .replace_all(&masked, TOKEN_REDACTION)
        .into_owned()
}

/// Redacted and capped copy of a payload for log metadata.
pub fn redact_preview(text: &str, max_bytes: usize) -> String {
    let redacted = redact_token(text);
    if redacted.len() <= max_bytes {
        return redacted;
    }
    format!("{}...", truncate_utf8_prefix(&redacted, max_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_token_in_bot_path() {
        let url = "https://api.telegram.org/bot123456:AAH-x_yz/sendMessage";
        assert_eq!(
            redact_token(url),
            "https://api.telegram.org/bot***REDACTED***/sendMessage"
        );
    }

    #[test]
    fn redacts_bare_tokens() {
        let text = "token 1234567890:AAEhBOweik6ad9r_QXMENQjcrGbqCr4K-ts leaked";
        assert_eq!(redact_token(text), "token ***REDACTED*** leaked");
    }

    #[test]
    fn preview_caps_length() {
        let preview = redact_preview(&"x".repeat(64), 8);
        assert_eq!(preview, "xxxxxxxx...");
    }
}
