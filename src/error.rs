use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResponderError>;

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("Notification transport failed: {0}")]
    Notification(#[from] reqwest::Error),

    #[error("Notification rejected with status {status}: {message}")]
    NotificationRejected { status: u16, message: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ResponderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<handlebars::TemplateError> for ResponderError {
    fn from(err: handlebars::TemplateError) -> Self {
        ResponderError::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for ResponderError {
    fn from(err: handlebars::RenderError) -> Self {
        ResponderError::Template(err.to_string())
    }
}
