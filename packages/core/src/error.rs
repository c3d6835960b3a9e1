use std::fmt;
use std::error::Error;

/// Application-level error for startup and wiring.
///
/// Runtime failures inside the calendar pipeline have their own types and
/// are contained where they occur; these are the ones that stop the process.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Network(String),
    Metrics(String),
    Server(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Metrics(msg) => write!(f, "Metrics error: {}", msg),
            AppError::Server(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl Error for AppError {}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Metrics(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Server(err.to_string())
    }
}
