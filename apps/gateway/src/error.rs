use credentials::ConfigurationError;
use thiserror::Error;

/// Anything that stops the gateway from serving traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    #[error("failed to build upstream client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}
