//! Redaction of tokens and passwords in diagnostic text.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Redacts bearer tokens and passwords from diagnostic text.
///
/// Applied to anything the transport and HTTP adapters put into error
/// messages, which may echo request headers or form bodies.
#[derive(Clone)]
pub struct TokenScrubber {
    bearer_pattern: Regex,
    jwt_pattern: Regex,
    field_pattern: Regex,
}

impl TokenScrubber {
    /// Compile the redaction patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bearer_pattern: Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-_.~+/=]+")?,
            jwt_pattern: Regex::new(r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*")?,
            field_pattern: Regex::new(
                r#"(?i)["']?(access_token|debug_access_token|token|password)["']?(\s*[:=]\s*)["']?[^"'\s,&}]+["']?"#,
            )?,
        })
    }

    /// Replace tokens and passwords in `message` with a placeholder.
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .bearer_pattern
            .replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self.jwt_pattern.replace_all(&scrubbed, "[TOKEN_REDACTED]");
        self.field_pattern
            .replace_all(&scrubbed, "$1$2[REDACTED]")
            .into_owned()
    }
}

impl fmt::Debug for TokenScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenScrubber").finish()
    }
}

static SCRUBBER: LazyLock<Result<TokenScrubber, regex::Error>> = LazyLock::new(TokenScrubber::new);

/// Scrub with the shared scrubber.
pub fn scrub(message: &str) -> String {
    match &*SCRUBBER {
        Ok(scrubber) => scrubber.scrub_message(message),
        Err(_) => "[diagnostic suppressed]".to_string(),
    }
}
