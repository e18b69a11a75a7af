//! Request/response transport to a light's REST API.

use std::future::Future;
use std::net::Ipv6Addr;

use log::debug;
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// REST endpoints exposed by a light under `/elgato/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum Endpoint {
    #[strum(serialize = "lights")]
    Lights,
    #[strum(serialize = "accessory-info")]
    AccessoryInfo,
}

/// Sends one request to a light and returns the parsed JSON reply.
///
/// A `body` of `None` is a read; `Some` is a write carrying that body.
/// Implementations must not retry.
pub trait Transport: Send + Sync {
    fn request(
        &self,
        address: &str,
        port: u16,
        endpoint: Endpoint,
        body: Option<&Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Transport speaking HTTP, `GET` for reads and `PUT` for writes.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client, e.g. one with a request timeout.
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    pub(crate) fn url(address: &str, port: u16, endpoint: Endpoint) -> String {
        if address.parse::<Ipv6Addr>().is_ok() {
            format!("http://[{}]:{}/elgato/{}", address, port, endpoint)
        } else {
            format!("http://{}:{}/elgato/{}", address, port, endpoint)
        }
    }
}

impl Transport for HttpTransport {
    async fn request(
        &self,
        address: &str,
        port: u16,
        endpoint: Endpoint,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = Self::url(address, port, endpoint);
        let (action, request) = match body {
            Some(body) => ("put", self.client.put(&url).json(body)),
            None => ("get", self.client.get(&url)),
        };
        debug!("HTTP {} {}", action, url);

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::http(action, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::http("read body", e))?;
        serde_json::from_slice(&bytes).map_err(Error::JsonLoad)
    }
}
