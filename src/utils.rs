use rand::Rng;
use std::string::ToString;

/// slash quoting for digest strings
pub trait QuoteForDigest {
    fn quote_for_digest(&self) -> String;
}

impl QuoteForDigest for &str {
    fn quote_for_digest(&self) -> String {
        self.to_string().quote_for_digest()
    }
}

impl QuoteForDigest for String {
    fn quote_for_digest(&self) -> String {
        self.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

/// Remove exactly one pair of surrounding double quotes, if present
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Random client nonce, 16 bytes hex-encoded
pub fn random_cnonce() -> String {
    let mut rng = rand::thread_rng();
    let nonce_bytes: [u8; 16] = rng.gen();
    hex::encode(nonce_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""abc""#), "abc");
        assert_eq!(unquote(r#""a"b"c""#), r#"a"b"c"#);
        assert_eq!(unquote(r#"""#), r#"""#);
        assert_eq!(unquote("MD5"), "MD5");
        assert_eq!(unquote(r#""half"#), r#""half"#);
    }

    #[test]
    fn test_quote_for_digest() {
        assert_eq!("plain".quote_for_digest(), "plain");
        assert_eq!(r#"a"b\c"#.quote_for_digest(), r#"a\"b\\c"#);
    }

    #[test]
    fn test_random_cnonce() {
        let a = random_cnonce();
        assert_eq!(a.len(), 32);
        assert_ne!(a, random_cnonce());
    }
}
