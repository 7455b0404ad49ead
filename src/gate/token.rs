//! Gate token issued after a successful password check.
//!
//! The wire form is `base64("<issued-at-millis>-verified")`. The token is
//! not signed and carries no identity; its expiry is advisory data for the
//! caller, never enforced server-side.

use base64ct::{Base64, Encoding};

/// Advisory token lifetime returned to callers.
pub const TOKEN_TTL_MILLIS: i64 = 86_400_000; // 24 hours

const TOKEN_SUFFIX: &str = "-verified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateToken {
    issued_at_millis: i64,
}

impl GateToken {
    #[must_use]
    pub const fn issue(issued_at_millis: i64) -> Self {
        Self { issued_at_millis }
    }

    #[must_use]
    pub const fn issued_at_millis(&self) -> i64 {
        self.issued_at_millis
    }

    #[must_use]
    pub const fn expires_at_millis(&self) -> i64 {
        self.issued_at_millis + TOKEN_TTL_MILLIS
    }

    /// Encode to the wire form sent back to the browser.
    #[must_use]
    pub fn encode(&self) -> String {
        let plain = format!("{}{TOKEN_SUFFIX}", self.issued_at_millis);
        Base64::encode_string(plain.as_bytes())
    }

    /// Decode a wire-form token back into its issue timestamp.
    ///
    /// This is a format check, not verification: the token is unsigned, so
    /// anything matching `<digits>-verified` decodes successfully.
    #[must_use]
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = Base64::decode_vec(encoded).ok()?;
        let plain = String::from_utf8(bytes).ok()?;
        let millis = plain.strip_suffix(TOKEN_SUFFIX)?;

        if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        millis.parse::<i64>().ok().map(Self::issue)
    }
}
