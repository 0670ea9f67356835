//! This crate answers HTTP `401` challenges for outbound requests. It understands the
//! Basic scheme and the Digest scheme as specified by IETF RFCs 2069 and 2617, and
//! retries a challenged request exactly once.
//!
//! The pieces can be used on their own: [`parse_challenges`] reads `WWW-Authenticate`,
//! [`compute_ha1`] and [`compute_response`] do the Digest hashing, and
//! [`DigestAuthorization`] renders the answer. [`AuthClient`] ties them to a
//! [`Transport`] and a [`CredentialSource`].
//!
//! # Examples
//!
//! Answering a Digest challenge by hand:
//!
//! ```
//! use http_auth_retry::{Credentials, DigestAuthorization, DigestChallenge};
//!
//! // Value from the WWW-Authenticate HTTP header (usually in a HTTP 401 response)
//! let www_authenticate = r#"Digest realm="test", nonce="abc123", qop="auth", algorithm=MD5"#;
//! let challenge: DigestChallenge = www_authenticate.parse().unwrap();
//!
//! let credentials = Credentials::new("Mufasa", "Circle Of Life");
//!
//! // For this example, we inject a custom cnonce. It's generated for you otherwise.
//! let answer = DigestAuthorization::from_challenge(
//!     &challenge,
//!     &credentials,
//!     &http::Method::GET,
//!     "/calendars/users/mufasa/",
//!     b"",
//!     Some("0a4f113b"),
//! )
//! .unwrap();
//!
//! assert_eq!(answer.to_string(), r#"Digest username="Mufasa", realm="test", nonce="abc123", uri="/calendars/users/mufasa/", response=6dbbb0215d46ff575dbbb5c705a77c67, algorithm=MD5, cnonce="0a4f113b", qop=auth, nc=00000001"#);
//! ```
//!
//! Driving a whole request cycle needs a [`Transport`]; with the `reqwest` feature
//! enabled, `ReqwestTransport` is one:
//!
//! ```ignore
//! let client = AuthClient::new(ReqwestTransport::new()?)
//!     .with_credential_source(StaticCredentials::new().insert("calendar", Credentials::new("Mufasa", "Circle Of Life")));
//!
//! let request = RequestContext::new(Method::GET, TransportScheme::Https, "calendar.example.com", 8443, "/principals/")
//!     .with_account("calendar");
//! let response = client.execute(request).await?;
//! ```

mod basic;
mod challenge;
mod credentials;
mod digest;
mod driver;
mod enums;
mod error;
#[cfg(feature = "reqwest")]
mod transport;
mod utils;

pub use error::{CredentialError, Error, Result, TransportError, Unauthorized};

pub use crate::basic::BasicAuthorization;
pub use crate::challenge::{parse_challenges, Challenges, DigestChallenge, Directives};
pub use crate::credentials::{CredentialSource, Credentials, Secret, StaticCredentials};
pub use crate::digest::{compute_ha1, compute_response, DigestAuthorization};
pub use crate::driver::{
    authorization_value, select_scheme, AuthClient, AuthState, RequestContext, RetryState,
    SchemeChoice, Transition, Transport, TransportScheme,
};
#[cfg(feature = "reqwest")]
pub use crate::transport::ReqwestTransport;

pub use crate::enums::*;

/// Parse a single `Digest` WWW-Authenticate header value.
/// It's just a convenience method to call [`DigestChallenge::from_str()`](struct.DigestChallenge.html).
pub fn parse(www_authenticate: &str) -> Result<DigestChallenge> {
    www_authenticate.parse()
}

#[test]
fn test_parse_respond() {
    let src = r#"
    Digest
       realm="testrealm@host.com",
       qop="auth,auth-int",
       nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093",
       algorithm=MD5,
       opaque="5ccc069c403ebaf9f0171e9517f40e41"
    "#;

    let credentials = Credentials::new("Mufasa", "Circle Of Life");
    let prompt = crate::parse(src).unwrap();
    let answer = DigestAuthorization::from_challenge(
        &prompt,
        &credentials,
        &http::Method::GET,
        "/dir/index.html",
        b"",
        Some("0a4f113b"),
    )
    .unwrap();

    let str = answer.to_string().replace(", ", ",\n  ");

    assert_eq!(
        str,
        r#"
Digest username="Mufasa",
  realm="testrealm@host.com",
  nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093",
  uri="/dir/index.html",
  response=6629fae49393a05397450978507c4ef1,
  algorithm=MD5,
  cnonce="0a4f113b",
  qop=auth,
  nc=00000001,
  opaque="5ccc069c403ebaf9f0171e9517f40e41"
"#
        .trim()
    );
}
