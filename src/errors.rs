/// All error types that can occur when discovering or talking to Elgato lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// A device reply did not have the expected shape.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// An HTTP exchange with a light failed.
    #[error("http {action} error: {err:?}")]
    Http { action: String, err: reqwest::Error },

    /// A custom [`crate::Transport`] failed to complete a request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The `lights` reply contained an empty `lights` array.
    #[error("device reply contained no lights")]
    NoLights,

    /// The mDNS daemon reported an error.
    #[error("mdns error: {0}")]
    Mdns(String),

    /// A discovered service could not be resolved in time.
    #[error("timed out resolving service {0}")]
    ResolveTimeout(String),

    /// Resolving a discovered service panicked.
    #[error("resolving service {0} panicked")]
    ResolvePanicked(String),

    /// A resolved service carried an address that is not an IPv4 or IPv6 address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Create a new HTTP error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new mDNS error
    pub fn mdns(err: impl std::fmt::Display) -> Self {
        Error::Mdns(err.to_string())
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
