//! Redaction of credentials before text reaches logs or RPC replies

use regex::Regex;
use std::sync::OnceLock;

static PATTERNS: OnceLock<Vec<(Regex, String)>> = OnceLock::new();

pub struct LogSanitizer {
    patterns: Vec<(Regex, String)>,
}

impl LogSanitizer {
    pub fn new() -> Self {
        let patterns = PATTERNS.get_or_init(|| {
            vec![
                // Authorization header value: "Authorization: Token abc123"
                (
                    Regex::new(r"(?i)(authorization:\s*(?:token|bearer)\s+)\S+").unwrap(),
                    "$1***".to_string(),
                ),
                (
                    Regex::new(r"(?i)(access_token=)[^&\s]+").unwrap(),
                    "$1***".to_string(),
                ),
                (
                    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
                    "***@***.***".to_string(),
                ),
            ]
        });

        Self {
            patterns: patterns.clone(),
        }
    }

    /// Also redact every literal occurrence of `secret`
    pub fn with_secret(mut self, secret: &str) -> Self {
        if !secret.is_empty() {
            if let Ok(re) = Regex::new(&regex::escape(secret)) {
                self.patterns.push((re, "***".to_string()));
            }
        }
        self
    }

    pub fn sanitize(&self, message: &str) -> String {
        let mut result = message.to_string();
        for (pattern, replacement) in &self.patterns {
            result = pattern.replace_all(&result, replacement).to_string();
        }
        result
    }

    /// Sanitize and cut to at most `max_chars` characters
    pub fn sanitize_truncated(&self, message: &str, max_chars: usize) -> String {
        let clean = self.sanitize(message);
        if clean.chars().count() <= max_chars {
            return clean;
        }
        let mut cut: String = clean.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

impl Default for LogSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
