//! The authenticate-and-retry request cycle.
//!
//! A cycle sends the request, and if the server answers `401` it picks a scheme from
//! the challenge, attaches an `Authorization` header and sends the request once more
//! on a new connection. Scheme choice and header construction are plain functions of
//! their inputs ([`select_scheme`], [`authorization_value`]). [`AuthClient::on_response`]
//! decides the next step for one response, consulting the credential source on a `401`,
//! and [`AuthClient::execute`] moves requests and responses between it and the
//! [`Transport`].

use crate::basic::BasicAuthorization;
use crate::challenge::{Challenges, DigestChallenge};
use crate::digest::DigestAuthorization;
use crate::{CredentialSource, Credentials, Error, Result, TransportError, Unauthorized};
use async_trait::async_trait;
use http::header::{HeaderName, AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method, Response, StatusCode};
use log::{debug, warn};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Transport scheme of the target server
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransportScheme {
    Http,
    Https,
}

impl Display for TransportScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportScheme::Http => "http",
            TransportScheme::Https => "https",
        })
    }
}

/// One logical request, as handed to the [`Transport`] on every attempt
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Request target (path and query); also the Digest `uri`
    pub uri: String,
    pub host: String,
    pub port: u16,
    pub scheme: TransportScheme,
    pub headers: HeaderMap,
    /// Request payload body; hashed for `auth-int`
    pub body: Vec<u8>,
    /// Account handed to the credential source when the server challenges
    pub account: Option<String>,
}

impl RequestContext {
    /// Construct a request without headers, body or account.
    pub fn new<H, U>(method: Method, scheme: TransportScheme, host: H, port: u16, uri: U) -> Self
    where
        H: Into<String>,
        U: Into<String>,
    {
        RequestContext {
            method,
            uri: uri.into(),
            host: host.into(),
            port,
            scheme,
            headers: HeaderMap::new(),
            body: vec![],
            account: None,
        }
    }

    pub fn with_account<A: Into<String>>(mut self, account: A) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header, replacing any previous value of the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Absolute URL of the target
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.uri)
    }
}

/// Sends one attempt of a request.
///
/// Every call must use its own connection to `host:port` over `scheme`; a connection
/// that delivered a `401` is never reused for the retry. Timeouts are the
/// implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestContext)
        -> std::result::Result<Response<Vec<u8>>, TransportError>;
}

/// Whether the single retry of a cycle has been spent.
///
/// Lives for exactly one [`AuthClient::execute`] call.
#[derive(Debug, Default)]
pub struct RetryState {
    retried_as: Option<String>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_retried(&self) -> bool {
        self.retried_as.is_some()
    }

    fn consume(&mut self, username: &str) {
        self.retried_as = Some(username.to_owned());
    }
}

/// Where a request cycle is
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AuthState {
    Init,
    Sent,
    Success,
    ChallengeReceived,
    Retried,
    Failed,
}

/// Outcome of looking at one response
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    /// Hand the response to the caller
    Complete,
    /// Send again with this `Authorization` value
    Retry(HeaderValue),
}

/// Scheme picked for the retry
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SchemeChoice {
    Digest(DigestChallenge),
    Basic,
}

/// Pick the scheme to answer with: the first usable Digest challenge, otherwise
/// Basic when offered and a plain password is at hand.
pub fn select_scheme(challenges: &Challenges, credentials: &Credentials) -> Option<SchemeChoice> {
    for directives in &challenges.digest {
        match DigestChallenge::from_directives(directives) {
            Ok(challenge) => return Some(SchemeChoice::Digest(challenge)),
            Err(e) => warn!("ignoring unusable Digest challenge: {}", e),
        }
    }

    if challenges.basic && credentials.password().is_some() {
        return Some(SchemeChoice::Basic);
    }

    None
}

/// Build the `Authorization` value for the chosen scheme.
pub fn authorization_value(
    choice: &SchemeChoice,
    credentials: &Credentials,
    request: &RequestContext,
    custom_cnonce: Option<&str>,
) -> Result<HeaderValue> {
    let value = match choice {
        SchemeChoice::Digest(challenge) => DigestAuthorization::from_challenge(
            challenge,
            credentials,
            &request.method,
            &request.uri,
            &request.body,
            custom_cnonce,
        )?
        .to_header_string(),
        SchemeChoice::Basic => match credentials.password() {
            Some(password) => BasicAuthorization::new(&credentials.username, password).to_string(),
            None => return Err(Unauthorized::UnsupportedScheme.into()),
        },
    };

    let mut value = HeaderValue::from_str(&value)?;
    value.set_sensitive(true);
    Ok(value)
}

/// HTTP client wrapper that answers Basic and Digest challenges, retrying once.
///
/// The client holds no per-request state and can drive any number of cycles
/// concurrently.
pub struct AuthClient<T> {
    transport: T,
    credentials: Option<Arc<dyn CredentialSource>>,
    custom_cnonce: Option<String>,
}

impl<T: Transport> AuthClient<T> {
    /// Construct a client without credentials; every challenge fails the request.
    pub fn new(transport: T) -> Self {
        AuthClient {
            transport,
            credentials: None,
            custom_cnonce: None,
        }
    }

    pub fn with_credential_source<C: CredentialSource + 'static>(mut self, source: C) -> Self {
        self.credentials = Some(Arc::new(source));
        self
    }

    /// Spoofed client nonce (use only for tests; a random nonce is generated otherwise)
    pub fn with_custom_cnonce<S: Into<String>>(mut self, cnonce: S) -> Self {
        self.custom_cnonce = Some(cnonce.into());
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Decide what follows a response.
    ///
    /// Anything but `401` completes the cycle. A `401` either yields the header for the
    /// retry (marking `retry` as spent) or a terminal [`Unauthorized`] error.
    pub async fn on_response<B: Sync>(
        &self,
        request: &RequestContext,
        response: &Response<B>,
        retry: &mut RetryState,
    ) -> Result<Transition> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(Transition::Complete);
        }

        let (source, account) = match (&self.credentials, &request.account) {
            (Some(source), Some(account)) => (source, account),
            _ => return Err(Unauthorized::AuthenticationRequired.into()),
        };

        if let Some(username) = &retry.retried_as {
            return Err(Unauthorized::CouldNotAuthenticate(username.clone()).into());
        }

        let credentials = source.credentials(account).await?;
        let challenges = Challenges::from_headers(response.headers());

        let choice = match select_scheme(&challenges, &credentials) {
            Some(choice) => choice,
            None => return Err(Unauthorized::UnsupportedScheme.into()),
        };
        debug!(
            "answering {} challenge for {} as {}",
            match choice {
                SchemeChoice::Digest(_) => "Digest",
                SchemeChoice::Basic => "Basic",
            },
            request.url(),
            credentials.username
        );

        let value = authorization_value(
            &choice,
            &credentials,
            request,
            self.custom_cnonce.as_deref(),
        )?;
        retry.consume(&credentials.username);

        Ok(Transition::Retry(value))
    }

    /// Run one request cycle to completion.
    ///
    /// Returns the first non-`401` response untouched. Transport failures end the
    /// cycle immediately and are returned as [`Error::Transport`].
    pub async fn execute(&self, request: RequestContext) -> Result<Response<Vec<u8>>> {
        let mut cycle = Cycle::new(request);

        loop {
            cycle.enter(AuthState::Sent);
            let response = match self.transport.send(&cycle.request).await {
                Ok(response) => response,
                Err(e) => {
                    cycle.enter(AuthState::Failed);
                    return Err(Error::Transport(e));
                }
            };

            if response.status() == StatusCode::UNAUTHORIZED {
                cycle.enter(AuthState::ChallengeReceived);
            }

            match self.on_response(&cycle.request, &response, &mut cycle.retry).await {
                Ok(Transition::Complete) => {
                    cycle.enter(AuthState::Success);
                    return Ok(response);
                }
                Ok(Transition::Retry(authorization)) => {
                    // the challenged connection is finished; the retry goes out on a new one
                    drop(response);
                    cycle.request.headers.insert(AUTHORIZATION, authorization);
                    cycle.enter(AuthState::Retried);
                }
                Err(e) => {
                    cycle.enter(AuthState::Failed);
                    warn!("{} {} failed: {}", cycle.request.method, cycle.request.url(), e);
                    return Err(e);
                }
            }
        }
    }
}

/// Per-call state of [`AuthClient::execute`]
struct Cycle {
    request: RequestContext,
    retry: RetryState,
    state: AuthState,
}

impl Cycle {
    fn new(request: RequestContext) -> Self {
        Cycle {
            request,
            retry: RetryState::new(),
            state: AuthState::Init,
        }
    }

    fn enter(&mut self, state: AuthState) {
        debug!(
            "{} {}: {:?} -> {:?}",
            self.request.method,
            self.request.url(),
            self.state,
            state
        );
        self.state = state;
    }
}
