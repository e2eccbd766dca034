#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Data directory not found")]
    NoDataDir,

    #[error("No catalog API key configured (set catalog.api_key or TMDB_API_KEY)")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Catalog returned {status}: {message}")]
    Catalog { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Failed to launch player: {0}")]
    PlayerLaunch(String),

    #[error("Player IPC error: {0}")]
    PlayerIpc(String),

    #[error("Not a show or episode route: {0}")]
    InvalidRoute(String),
}

impl Error {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e
                        .status()
                        .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            Error::Catalog { status, .. } => *status == 429 || *status >= 500,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_status_classification() {
        let throttled = Error::Catalog {
            status: 429,
            message: String::new(),
        };
        let unavailable = Error::Catalog {
            status: 503,
            message: String::new(),
        };
        let unauthorized = Error::Catalog {
            status: 401,
            message: "Invalid API key".to_string(),
        };

        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!unauthorized.is_transient());
    }

    #[test]
    fn test_local_errors_are_terminal() {
        assert!(!Error::MissingApiKey.is_transient());
        assert!(!Error::InvalidRoute("/movie/1".to_string()).is_transient());
        assert!(
            Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")).is_transient()
        );
    }
}
