//! Placeholder scanning.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(\w+)(?:::(\w+))?\s*\}\}").expect("placeholder pattern is a valid regex")
});

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal SQL text, emitted unchanged.
    Text(String),
    /// A named parameter reference.
    Placeholder {
        /// Parameter name (`\w+`).
        name: String,
        /// Inline cast (`{{name::type}}`), forwarded only where supported.
        type_hint: Option<String>,
        /// Byte range of the placeholder in the source template.
        span: Range<usize>,
    },
}

/// Splits `source` into text and placeholder tokens.
///
/// Every occurrence of a placeholder becomes its own token, so a name used
/// twice is bound twice.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in PLACEHOLDER.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            tokens.push(Token::Text(source[cursor..whole.start()].to_string()));
        }
        tokens.push(Token::Placeholder {
            name: caps[1].to_string(),
            type_hint: caps.get(2).map(|m| m.as_str().to_string()),
            span: whole.range(),
        });
        cursor = whole.end();
    }

    if cursor < source.len() {
        tokens.push(Token::Text(source[cursor..].to_string()));
    }

    tokens
}
