//! [`Transport`] on top of `reqwest`.

use crate::{RequestContext, Transport, TransportError};
use async_trait::async_trait;
use http::Response;

/// Sends each attempt over a fresh `reqwest` connection.
///
/// Redirects are not followed, so the `uri` answered in a Digest header is always
/// the one that was challenged.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(from_reqwest)?;
        Ok(ReqwestTransport { client })
    }

    /// Use a preconfigured client. It should neither follow redirects nor keep idle
    /// connections around.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestContext) -> Result<Response<Vec<u8>>, TransportError> {
        let response = self
            .client
            .request(request.method.clone(), request.url())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(from_reqwest)?;

        let mut builder = Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            *headers = response.headers().clone();
        }

        let body = response.bytes().await.map_err(from_reqwest)?;
        builder
            .body(body.to_vec())
            .map_err(|e| TransportError::Other(Box::new(e)))
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_connect() || e.is_body() {
        TransportError::ConnectionLost(e.to_string())
    } else {
        TransportError::Other(Box::new(e))
    }
}
