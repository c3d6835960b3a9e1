//! Error types for the calendar pipeline

use thiserror::Error;

/// Errors from event feeds. None of them is fatal: the polling path logs
/// the failure and treats the cycle as having no events.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Feed unreachable: {message}")]
    Unreachable { message: String },

    #[error("Feed returned HTTP {code}")]
    BadStatus { code: u16 },

    #[error("Failed to read feed body: {message}")]
    Body { message: String },
}

/// Errors isolated to a single feed row.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("Row {index} has no cells")]
    Empty { index: usize },
}

/// An event time that cannot be placed on the calendar.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Unrecognised time of day '{value}'")]
    Unrecognised { value: String },

    #[error("Local time '{value}' does not exist on {date} in {zone}")]
    NonExistent {
        value: String,
        date: chrono::NaiveDate,
        zone: String,
    },
}

impl FetchError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable { message: message.into() }
    }

    pub fn body(message: impl Into<String>) -> Self {
        Self::Body { message: message.into() }
    }
}
