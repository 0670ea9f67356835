//! `WWW-Authenticate` parsing.
//!
//! A response may carry several challenges, either as separate header values or
//! comma-joined in one value. The parser is deliberately lenient: it never fails,
//! it only records what was offered. Whether an offered Digest challenge is usable
//! is decided later by [`DigestChallenge::from_directives`].

use crate::utils::unquote;
use crate::{Algorithm, Error::*, Qop, Result};
use http::header::WWW_AUTHENTICATE;
use http::HeaderMap;
use std::borrow::Cow;
use std::str::FromStr;

/// Directive name/value pairs of one Digest challenge, in the order received.
///
/// Names keep the case the server used; lookups ignore case.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Directives {
    entries: Vec<(String, String)>,
}

impl Directives {
    /// Look up a directive by name (case-insensitive). If the server repeated it,
    /// the last occurrence wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a 401 response offered
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Challenges {
    /// A `Basic` challenge was present
    pub basic: bool,
    /// All `Digest` challenges, in the order received
    pub digest: Vec<Directives>,
}

impl Challenges {
    /// Parse all `WWW-Authenticate` values of a response. Bytes outside visible
    /// ASCII are decoded as UTF-8, invalid sequences become U+FFFD.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<Cow<'_, str>> = headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();
        parse_challenges(values.iter().map(|v| v.as_ref()))
    }

    pub fn basic_offered(&self) -> bool {
        self.basic
    }

    pub fn digest_offered(&self) -> bool {
        !self.digest.is_empty()
    }
}

/// Parse a (possibly multi-valued) `WWW-Authenticate` header.
pub fn parse_challenges<'a, I>(values: I) -> Challenges
where
    I: IntoIterator<Item = &'a str>,
{
    #[derive(PartialEq)]
    enum Current {
        Nothing,
        Basic,
        Digest,
        Other,
    }

    let mut parsed = Challenges::default();
    let mut current = Current::Nothing;

    for value in values {
        for segment in split_unquoted_commas(value) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (first_word, rest) = match segment.find(char::is_whitespace) {
                Some(idx) => (&segment[..idx], segment[idx..].trim_start()),
                None => (segment, ""),
            };

            // a leading word that is neither `name=...` nor `name = ...` is an
            // auth-scheme token; anything else continues the challenge we are in
            let directive = if first_word.contains('=') || rest.starts_with('=') {
                segment
            } else {
                current = if first_word.eq_ignore_ascii_case("digest") {
                    parsed.digest.push(Directives::default());
                    Current::Digest
                } else if first_word.eq_ignore_ascii_case("basic") {
                    parsed.basic = true;
                    Current::Basic
                } else {
                    Current::Other
                };
                rest
            };

            if current != Current::Digest {
                continue;
            }

            if let Some((name, value)) = split_directive(directive) {
                if let Some(last) = parsed.digest.last_mut() {
                    last.insert(name, value);
                }
            }
        }
    }

    parsed
}

/// Split `name=value`, trimming both sides and removing one pair of outer quotes
/// from the value. Segments without `=` carry nothing usable.
fn split_directive(segment: &str) -> Option<(&str, &str)> {
    let (name, value) = segment.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, unquote(value.trim())))
}

/// Split on commas that are not inside a double-quoted value.
///
/// A quote only opens a value right after `=` (whitespace allowed in between) and
/// only closes it when followed by a comma or the end of input, so stray quotes
/// inside a value do not hide the commas after it.
fn split_unquoted_commas(input: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut quoted = false;
    let mut after_eq = false;
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        if quoted {
            if c == '"' {
                let tail = input[idx + 1..].trim_start();
                quoted = !(tail.is_empty() || tail.starts_with(','));
            }
            continue;
        }

        match c {
            '=' => after_eq = true,
            '"' if after_eq => {
                quoted = true;
                after_eq = false;
            }
            ',' => {
                parts.push(&input[start..idx]);
                start = idx + 1;
                after_eq = false;
            }
            c if c.is_whitespace() => {}
            _ => after_eq = false,
        }
    }
    parts.push(&input[start..]);

    parts
}

/// A Digest challenge with every directive the client needs
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DigestChallenge {
    /// Authorization realm
    pub realm: String,
    /// Server nonce
    pub nonce: String,
    /// Client nonce, if the server dictated one
    pub cnonce: Option<String>,
    /// Server opaque string, echoed back verbatim
    pub opaque: Option<String>,
    /// Hashing algo
    pub algorithm: Algorithm,
    /// Algorithm name exactly as the server spelled it
    pub algorithm_name: String,
    /// qop chosen from the offered list; None selects the RFC 2069 computation
    pub qop: Option<Qop>,
    /// Nonce count, if the server dictated one
    pub nc: Option<String>,
}

impl DigestChallenge {
    /// Validate a parsed Digest challenge.
    ///
    /// # Errors
    /// If `realm`, `nonce` or `algorithm` is missing, the algorithm is unknown,
    /// or `qop` offers nothing the client can do.
    pub fn from_directives(directives: &Directives) -> Result<Self> {
        let ctx = || format!("{:?}", directives);

        let realm = directives.get("realm").ok_or_else(|| MissingRequired("realm", ctx()))?;
        let nonce = directives.get("nonce").ok_or_else(|| MissingRequired("nonce", ctx()))?;
        let algorithm_name = directives
            .get("algorithm")
            .ok_or_else(|| MissingRequired("algorithm", ctx()))?;
        let algorithm = Algorithm::from_str(algorithm_name)?;

        let qop = match directives.get("qop") {
            Some(offered) => Some(Qop::choose(offered)?),
            None => None,
        };

        Ok(DigestChallenge {
            realm: realm.to_string(),
            nonce: nonce.to_string(),
            cnonce: directives.get("cnonce").map(ToString::to_string),
            opaque: directives.get("opaque").map(ToString::to_string),
            algorithm,
            algorithm_name: algorithm_name.to_string(),
            qop,
            nc: directives.get("nc").map(ToString::to_string),
        })
    }
}

impl FromStr for DigestChallenge {
    type Err = crate::Error;

    /// Parse a single `Digest ...` header value
    fn from_str(input: &str) -> Result<Self> {
        let parsed = parse_challenges(std::iter::once(input));
        match parsed.digest.first() {
            Some(directives) => Self::from_directives(directives),
            None => Err(InvalidHeaderSyntax(input.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlgorithmType, Error};
    use http::HeaderValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_digest_directives() {
        let src = r#"Digest realm="test", nonce="abc123", qop="auth", algorithm=MD5"#;
        let parsed = parse_challenges(vec![src]);

        assert!(!parsed.basic_offered());
        assert!(parsed.digest_offered());

        let d = &parsed.digest[0];
        assert_eq!(d.len(), 4);
        assert_eq!(d.get("realm"), Some("test"));
        assert_eq!(d.get("nonce"), Some("abc123"));
        assert_eq!(d.get("qop"), Some("auth"));
        assert_eq!(d.get("algorithm"), Some("MD5"));
    }

    #[test]
    fn test_scheme_tokens_ignore_case() {
        let lower = parse_challenges(vec![r#"digest realm="r", nonce="n", algorithm=md5"#]);
        let upper = parse_challenges(vec![r#"DIGEST realm="r", nonce="n", algorithm=md5"#]);
        assert_eq!(lower, upper);

        for basic in &["Basic realm=\"r\"", "basic realm=\"r\"", "BASIC realm=\"r\"", "Basic"] {
            let parsed = parse_challenges(vec![*basic]);
            assert!(parsed.basic_offered(), "{}", basic);
            assert!(!parsed.digest_offered());
        }
    }

    #[test]
    fn test_multiple_header_values() {
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static(r#"Basic realm="a""#));
        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_static(r#"Digest realm="a", nonce="n1", algorithm=MD5"#),
        );

        let parsed = Challenges::from_headers(&headers);
        assert!(parsed.basic_offered());
        assert_eq!(parsed.digest.len(), 1);
        assert_eq!(parsed.digest[0].get("nonce"), Some("n1"));
    }

    #[test]
    fn test_combined_header_value() {
        let src = r#"Negotiate, Digest realm="a", qop="auth,auth-int", nonce="n", algorithm=MD5-sess, Basic realm="a""#;
        let parsed = parse_challenges(vec![src]);

        assert!(parsed.basic_offered());
        assert_eq!(parsed.digest.len(), 1);
        let d = &parsed.digest[0];
        assert_eq!(d.get("qop"), Some("auth,auth-int"));
        assert_eq!(d.get("algorithm"), Some("MD5-sess"));
        assert_eq!(d.get("realm"), Some("a"));
    }

    #[test]
    fn test_unknown_directives_kept() {
        let parsed = parse_challenges(vec![
            r#"Digest Realm="r", nonce="n", algorithm=MD5, userhash=true, Charset="UTF-8""#,
        ]);
        let d = &parsed.digest[0];
        assert_eq!(d.get("realm"), Some("r"));
        assert_eq!(d.get("userhash"), Some("true"));
        assert_eq!(d.get("charset"), Some("UTF-8"));
        assert!(d.iter().any(|(k, _)| k == "Charset"));
    }

    #[test]
    fn test_inner_quotes_preserved() {
        let parsed = parse_challenges(vec![r#"Digest realm=""quoted" realm", nonce=n"#]);
        assert_eq!(parsed.digest[0].get("realm"), Some(r#""quoted" realm"#));
        assert_eq!(parsed.digest[0].get("nonce"), Some("n"));
    }

    #[test]
    fn test_stray_quote_inside_value() {
        let parsed =
            parse_challenges(vec![r#"Digest realm="it"s", nonce="abc123", algorithm=MD5"#]);
        let d = &parsed.digest[0];
        assert_eq!(d.len(), 3);
        assert_eq!(d.get("realm"), Some(r#"it"s"#));
        assert_eq!(d.get("nonce"), Some("abc123"));
        assert_eq!(d.get("algorithm"), Some("MD5"));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let parsed = parse_challenges(vec![
            r#"Digest realm = "test", nonce = "abc123" ,algorithm= MD5, qop ="auth,auth-int""#,
        ]);
        assert_eq!(parsed.digest.len(), 1);
        let d = &parsed.digest[0];
        assert_eq!(d.get("realm"), Some("test"));
        assert_eq!(d.get("nonce"), Some("abc123"));
        assert_eq!(d.get("algorithm"), Some("MD5"));
        assert_eq!(d.get("qop"), Some("auth,auth-int"));

        let challenge = DigestChallenge::from_directives(d).unwrap();
        assert_eq!(challenge.nonce, "abc123");
        assert_eq!(challenge.qop, Some(Qop::AUTH));
    }

    #[test]
    fn test_non_ascii_header_bytes() {
        let mut headers = HeaderMap::new();
        let digest = r#"Digest realm="Kalender für", nonce="n", algorithm=MD5"#;
        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_bytes(digest.as_bytes()).unwrap(),
        );
        // not UTF-8 at all
        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_bytes(b"Basic realm=\"caf\xe9\"").unwrap(),
        );

        let parsed = Challenges::from_headers(&headers);
        assert!(parsed.basic_offered());
        assert_eq!(parsed.digest.len(), 1);
        assert_eq!(parsed.digest[0].get("realm"), Some("Kalender für"));
        assert_eq!(parsed.digest[0].get("nonce"), Some("n"));
    }

    #[test]
    fn test_neither_scheme() {
        let parsed = parse_challenges(vec![r#"Bearer realm="api""#, "NTLM"]);
        assert!(!parsed.basic_offered());
        assert!(!parsed.digest_offered());

        let parsed = parse_challenges(Vec::<&str>::new());
        assert_eq!(parsed, Challenges::default());
    }

    #[test]
    fn test_digest_challenge_from_directives() {
        let challenge = DigestChallenge::from_str(
            r#"Digest realm="test", nonce="abc123", qop="auth", algorithm=MD5, opaque="xyz""#,
        )
        .unwrap();

        assert_eq!(
            challenge,
            DigestChallenge {
                realm: "test".into(),
                nonce: "abc123".into(),
                cnonce: None,
                opaque: Some("xyz".into()),
                algorithm: Algorithm::new(AlgorithmType::MD5, false),
                algorithm_name: "MD5".into(),
                qop: Some(Qop::AUTH),
                nc: None,
            }
        );
    }

    #[test]
    fn test_digest_challenge_unusable() {
        let missing_nonce = DigestChallenge::from_str(r#"Digest realm="r", algorithm=MD5"#);
        assert!(matches!(missing_nonce, Err(Error::MissingRequired("nonce", _))));

        let missing_realm = DigestChallenge::from_str(r#"Digest nonce="n", algorithm=MD5"#);
        assert!(matches!(missing_realm, Err(Error::MissingRequired("realm", _))));

        let missing_algo = DigestChallenge::from_str(r#"Digest realm="r", nonce="n""#);
        assert!(matches!(missing_algo, Err(Error::MissingRequired("algorithm", _))));

        let bad_algo = DigestChallenge::from_str(r#"Digest realm="r", nonce="n", algorithm=XYZ"#);
        assert!(matches!(bad_algo, Err(Error::UnknownAlgorithm(_))));

        let bad_qop =
            DigestChallenge::from_str(r#"Digest realm="r", nonce="n", algorithm=MD5, qop="x""#);
        assert!(matches!(bad_qop, Err(Error::BadQop(_))));

        let not_digest = DigestChallenge::from_str(r#"Basic realm="r""#);
        assert!(matches!(not_digest, Err(Error::InvalidHeaderSyntax(_))));
    }
}
