use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("Feed is rate limiting us (HTTP 429)")]
    RateLimited,

    #[error("Response is not feed markup: {0}")]
    NotAFeed(String),

    #[error("Feed parse error: {0}")]
    Feed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::HttpStatus(403).to_string(), "Feed returned HTTP status 403");
        assert_eq!(Error::RateLimited.to_string(), "Feed is rate limiting us (HTTP 429)");
    }
}
