//! Error type shared across the Streamsight crates.

/// Convenience result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the platform gateway and the extension directory.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cancelled by operator")]
    Cancelled,

    #[error("Push channel closed")]
    ChannelClosed,
}

impl Error {
    /// Status code of an `Http` error, `None` for every other variant.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_accessor() {
        let err = Error::Http {
            status: 404,
            url: "/service/cep/apamacorrelator/EN/Missing.json".to_string(),
        };
        assert_eq!(err.http_status(), Some(404));
        assert_eq!(Error::Cancelled.http_status(), None);
    }
}
