//! Digest (RFC 2069 / RFC 2617) hash computation and the `Authorization` value built from it.

use crate::challenge::DigestChallenge;
use crate::utils::{random_cnonce, QuoteForDigest};
use crate::{Algorithm, Credentials, Error::*, Qop, Result, Secret};
use http::Method;
use std::fmt::{self, Display, Formatter};

/// Nonce count used when the server does not dictate one. A fresh challenge is
/// answered exactly once, so this is always the first use of the nonce.
const FIRST_NONCE_COUNT: &str = "00000001";

/// Compute HA1 as lower-case hex.
///
/// Either pass `username`, `realm` and `password`, or pass only `pre_ha1` (a hex
/// HA1 computed earlier). For `-sess` algorithms the result is additionally bound
/// to `nonce` and `cnonce`, hashing the raw HA1 bytes.
///
/// # Errors
/// `InvalidInput` if `pre_ha1` is combined with any plaintext component, if it is
/// not valid hex, or if neither form is complete.
pub fn compute_ha1(
    algorithm: Algorithm,
    username: Option<&str>,
    realm: Option<&str>,
    password: Option<&str>,
    nonce: &str,
    cnonce: &str,
    pre_ha1: Option<&str>,
) -> Result<String> {
    let ha1 = match pre_ha1 {
        Some(pre) => {
            if username.is_some() || realm.is_some() || password.is_some() {
                return Err(InvalidInput(
                    "precomputed HA1 is incompatible with username, realm and password".into(),
                ));
            }
            hex::decode(pre)?
        }
        None => match (username, realm, password) {
            (Some(username), Some(realm), Some(password)) => {
                algorithm.digest(format!("{}:{}:{}", username, realm, password).as_bytes())
            }
            _ => {
                return Err(InvalidInput(
                    "username, realm and password are required without a precomputed HA1".into(),
                ))
            }
        },
    };

    if !algorithm.sess {
        return Ok(hex::encode(ha1));
    }

    let mut a1 = ha1;
    a1.extend_from_slice(format!(":{}:{}", nonce, cnonce).as_bytes());
    Ok(algorithm.hash(&a1))
}

/// Compute the `response` value as lower-case hex.
///
/// Uses the RFC 2617 form when `nonce_count`, `cnonce` and `qop` are all given and
/// the RFC 2069 form otherwise. `entity_hash` (hex hash of the request body) only
/// matters for `auth-int`.
#[allow(clippy::too_many_arguments)]
pub fn compute_response(
    ha1: &str,
    algorithm: Algorithm,
    nonce: &str,
    nonce_count: Option<&str>,
    cnonce: Option<&str>,
    qop: Option<Qop>,
    method: &str,
    digest_uri: &str,
    entity_hash: Option<&str>,
) -> String {
    let a2 = match qop {
        Some(Qop::AUTH_INT) => format!(
            "{method}:{uri}:{bodyhash}",
            method = method,
            uri = digest_uri,
            bodyhash = entity_hash.unwrap_or_default()
        ),
        _ => format!("{method}:{uri}", method = method, uri = digest_uri),
    };
    let ha2 = algorithm.hash_str(&a2);

    let tmp = match (nonce_count, cnonce, qop) {
        (Some(nc), Some(cnonce), Some(qop)) => format!(
            "{ha1}:{nonce}:{nc}:{cnonce}:{qop}:{ha2}",
            ha1 = ha1,
            nonce = nonce,
            nc = nc,
            cnonce = cnonce,
            qop = qop,
            ha2 = ha2
        ),
        _ => format!("{ha1}:{nonce}:{ha2}", ha1 = ha1, nonce = nonce, ha2 = ha2),
    };
    algorithm.hash_str(&tmp)
}

/// Header sent back to the server, including password hashes.
#[derive(Debug)]
pub struct DigestAuthorization<'ctx> {
    /// The challenge being answered; realm, nonce, algorithm and opaque are echoed from it
    pub challenge: &'ctx DigestChallenge,
    /// Login username
    pub username: &'ctx str,
    /// Requested URI (path and query)
    pub uri: &'ctx str,
    /// Computed digest
    pub response: String,
    /// Client nonce
    pub cnonce: String,
    /// Nonce count, as sent
    pub nc: String,
}

impl<'a> DigestAuthorization<'a> {
    /// Answer a challenge for one request.
    ///
    /// `custom_cnonce` is used when the challenge does not dictate a cnonce; a random
    /// one is generated when neither is available.
    pub fn from_challenge(
        challenge: &'a DigestChallenge,
        credentials: &'a Credentials,
        method: &Method,
        uri: &'a str,
        body: &[u8],
        custom_cnonce: Option<&str>,
    ) -> Result<DigestAuthorization<'a>> {
        let cnonce = match (&challenge.cnonce, custom_cnonce) {
            (Some(cnonce), _) => cnonce.clone(),
            (None, Some(cnonce)) => cnonce.to_owned(),
            (None, None) => random_cnonce(),
        };
        let nc = challenge
            .nc
            .clone()
            .unwrap_or_else(|| FIRST_NONCE_COUNT.to_owned());

        let ha1 = match &credentials.secret {
            Secret::Password(password) => compute_ha1(
                challenge.algorithm,
                Some(credentials.username.as_str()),
                Some(challenge.realm.as_str()),
                Some(password.as_str()),
                &challenge.nonce,
                &cnonce,
                None,
            )?,
            Secret::Ha1(pre) => compute_ha1(
                challenge.algorithm,
                None,
                None,
                None,
                &challenge.nonce,
                &cnonce,
                Some(pre.as_str()),
            )?,
        };

        let entity_hash = match challenge.qop {
            Some(Qop::AUTH_INT) => Some(challenge.algorithm.hash(body)),
            _ => None,
        };

        let response = compute_response(
            &ha1,
            challenge.algorithm,
            &challenge.nonce,
            Some(nc.as_str()),
            Some(cnonce.as_str()),
            challenge.qop,
            method.as_str(),
            uri,
            entity_hash.as_deref(),
        );

        Ok(DigestAuthorization {
            challenge,
            username: &credentials.username,
            uri,
            response,
            cnonce,
            nc,
        })
    }

    /// Produce a header string (also accessible through the Display trait)
    pub fn to_header_string(&self) -> String {
        self.to_string()
    }
}

impl<'a> Display for DigestAuthorization<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // server-supplied values are echoed exactly as received
        write!(
            f,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", response={}, algorithm={}",
            self.username.quote_for_digest(),
            self.challenge.realm,
            self.challenge.nonce,
            self.uri,
            self.response,
            self.challenge.algorithm_name,
        )?;

        if let Some(qop) = self.challenge.qop {
            write!(
                f,
                ", cnonce=\"{}\", qop={}, nc={}",
                self.cnonce, qop, self.nc
            )?;
        }

        if let Some(opaque) = &self.challenge.opaque {
            write!(f, ", opaque=\"{}\"", opaque)?;
        }

        Ok(())
    }
}
