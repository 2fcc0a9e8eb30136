use thiserror::Error;

#[derive(Error, Debug)]
pub enum HackmdError {
    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated. Run: hackmd auth login")]
    NotAuthenticated,

    #[error("Not configured. Run: hackmd auth login")]
    NotConfigured,

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("API error ({status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HackmdError>;
