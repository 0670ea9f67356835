use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use digest::{Digest, DynDigest};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;

/// Algorithm type
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum AlgorithmType {
    MD5,
    SHA1,
    SHA2_256,
}

/// Algorithm and the -sess flag pair
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Algorithm {
    pub algo: AlgorithmType,
    pub sess: bool,
}

impl Algorithm {
    /// Compose from algorithm type and the -sess flag
    pub fn new(algo: AlgorithmType, sess: bool) -> Algorithm {
        Algorithm { algo, sess }
    }

    /// Calculate the raw digest of bytes using the selected algorithm
    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        let mut hash: Box<dyn DynDigest> = match self.algo {
            AlgorithmType::MD5 => Box::new(Md5::new()),
            AlgorithmType::SHA1 => Box::new(Sha1::new()),
            AlgorithmType::SHA2_256 => Box::new(Sha256::new()),
        };

        hash.update(bytes);
        hash.finalize().into_vec()
    }

    /// Calculate a lower-case hex hash of bytes using the selected algorithm
    pub fn hash(self, bytes: &[u8]) -> String {
        hex::encode(self.digest(bytes))
    }

    /// Calculate a hash of string's bytes using the selected algorithm
    pub fn hash_str(self, bytes: &str) -> String {
        self.hash(bytes.as_bytes())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse from the format used in WWW-Authenticate. Servers are not consistent
    /// about case, so the match is case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::new(AlgorithmType::MD5, false)),
            "md5-sess" => Ok(Algorithm::new(AlgorithmType::MD5, true)),
            "sha" | "sha-1" => Ok(Algorithm::new(AlgorithmType::SHA1, false)),
            "sha-sess" | "sha-1-sess" => Ok(Algorithm::new(AlgorithmType::SHA1, true)),
            "sha-256" => Ok(Algorithm::new(AlgorithmType::SHA2_256, false)),
            "sha-256-sess" => Ok(Algorithm::new(AlgorithmType::SHA2_256, true)),
            _ => Err(UnknownAlgorithm(s.into())),
        }
    }
}

/// QOP field values
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Qop {
    AUTH,
    AUTH_INT,
}

impl Qop {
    /// Pick from the comma-separated list offered by a server. Plain "auth" is preferred
    /// because it does not need the request body.
    pub fn choose(offered: &str) -> Result<Qop> {
        let mut auth_int = false;
        for token in offered.split(',') {
            match Qop::from_str(token.trim()) {
                Ok(Qop::AUTH) => return Ok(Qop::AUTH),
                Ok(Qop::AUTH_INT) => auth_int = true,
                Err(_) => {}
            }
        }

        if auth_int {
            Ok(Qop::AUTH_INT)
        } else {
            Err(BadQop(offered.into()))
        }
    }
}

impl FromStr for Qop {
    type Err = Error;

    /// Parse from "auth" or "auth-int" as used in HTTP headers
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auth" => Ok(Qop::AUTH),
            "auth-int" => Ok(Qop::AUTH_INT),
            _ => Err(BadQop(s.into())),
        }
    }
}

impl Display for Qop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qop::AUTH => "auth",
            Qop::AUTH_INT => "auth-int",
        })
    }
}
