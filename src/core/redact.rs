//! Credential redaction for diagnostic text.

pub const REDACTED: &str = "***";

/// Replace every occurrence of `secret` in `text`.
///
/// Also catches the percent-encoded form, since connection URLs echoed back
/// by tools carry the password that way.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }

    let mut out = text.replace(secret, REDACTED);
    let encoded = percent_encode(secret);
    if encoded != secret {
        out = out.replace(&encoded, REDACTED);
        out = out.replace(&encoded.to_ascii_lowercase(), REDACTED);
    }
    out
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
