use std::fmt::{self, Display, Formatter};
use std::result;

/// Terminal outcome of an authentication cycle that could not succeed
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Unauthorized {
    /// The server challenged, but no credentials are configured for the request
    AuthenticationRequired,
    /// The single retry was already spent and the server challenged again
    CouldNotAuthenticate(String),
    /// Neither a usable Digest challenge nor Basic was offered
    UnsupportedScheme,
}

impl Display for Unauthorized {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Unauthorized: ")?;
        match self {
            Unauthorized::AuthenticationRequired => f.write_str("authentication required"),
            Unauthorized::CouldNotAuthenticate(user) => {
                write!(f, "could not authenticate user {}", user)
            }
            Unauthorized::UnsupportedScheme => {
                f.write_str("server does not support a usable scheme")
            }
        }
    }
}

/// Failure reported by a [`CredentialSource`](trait.CredentialSource.html)
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CredentialError {
    /// The account has no stored credentials
    NotFound(String),
    /// The credential store could not be consulted at all
    Access(String),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::NotFound(ctx) => write!(f, "Credentials not found: {}", ctx),
            CredentialError::Access(ctx) => write!(f, "Credential store not accessible: {}", ctx),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Failure reported by a [`Transport`](trait.Transport.html) before a response arrived
#[derive(Debug)]
pub enum TransportError {
    /// The connection went away before a response was received
    ConnectionLost(String),
    Io(std::io::Error),
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionLost(ctx) => write!(f, "Connection lost: {}", ctx),
            TransportError::Io(e) => write!(f, "I/O error: {}", e),
            TransportError::Other(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::ConnectionLost(_) => None,
            TransportError::Io(e) => Some(e),
            TransportError::Other(e) => Some(e.as_ref()),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e)
    }
}

#[derive(Debug)]
pub enum Error {
    Unauthorized(Unauthorized),
    InvalidInput(String),
    UnknownAlgorithm(String),
    BadQop(String),
    MissingRequired(&'static str, String),
    InvalidHeaderSyntax(String),
    InvalidHeader(String),
    Credential(CredentialError),
    Transport(TransportError),
}

pub type Result<T> = result::Result<T, Error>;

use Error::*;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unauthorized(reason) => reason.fmt(f),
            InvalidInput(ctx) => write!(f, "Invalid input: {}", ctx),
            UnknownAlgorithm(ctx) => write!(f, "Unknown algorithm: {}", ctx),
            BadQop(ctx) => write!(f, "Bad Qop option: {}", ctx),
            MissingRequired(what, ctx) => write!(f, "Missing \"{}\" in header: {}", what, ctx),
            InvalidHeaderSyntax(ctx) => write!(f, "Invalid header syntax: {}", ctx),
            InvalidHeader(ctx) => write!(f, "Invalid header value: {}", ctx),
            Credential(e) => e.fmt(f),
            Transport(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Credential(e) => Some(e),
            Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Unauthorized> for Error {
    fn from(reason: Unauthorized) -> Self {
        Error::Unauthorized(reason)
    }
}

impl From<CredentialError> for Error {
    fn from(e: CredentialError) -> Self {
        Credential(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Transport(e)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        InvalidInput(format!("precomputed HA1 is not valid hex: {}", e))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        InvalidHeader(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Unauthorized};

    #[test]
    fn test_unauthorized_messages() {
        assert_eq!(
            Unauthorized::AuthenticationRequired.to_string(),
            "Unauthorized: authentication required"
        );
        assert_eq!(
            Error::from(Unauthorized::CouldNotAuthenticate("mufasa".into())).to_string(),
            "Unauthorized: could not authenticate user mufasa"
        );
        assert_eq!(
            Unauthorized::UnsupportedScheme.to_string(),
            "Unauthorized: server does not support a usable scheme"
        );
    }
}
