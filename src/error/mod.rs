//! Error module for Topicrelay
//!
//! This module defines the error codes and the error type shared by the
//! registry, the topic registry and the broker.

use thiserror::Error;
use std::fmt;

/// Error code of a relay failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Registry errors (0x0101-0x0200)
    KeyNotFound = 0x0101,
    TypeMismatch = 0x0102,

    // Topic errors (0x0201-0x0300)
    TopicNotFound = 0x0201,

    // Delivery errors (0x0301-0x0400)
    SubscriberFailed = 0x0301,
    ChannelClosed = 0x0302,

    // Lifecycle errors (0x0401-0x0500)
    AlreadyStarted = 0x0401,
    AlreadyStopped = 0x0402,

    // System errors (0x0501-0x0600)
    ConfigInvalid = 0x0501,
    InternalError = 0x0502,
}

impl ErrorCode {
    /// Get the error code as a u16
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the error code category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() >> 8 {
            0x01 => ErrorCategory::Registry,
            0x02 => ErrorCategory::Topic,
            0x03 => ErrorCategory::Delivery,
            0x04 => ErrorCategory::Lifecycle,
            0x05 => ErrorCategory::System,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Try to convert a u16 to an ErrorCode
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x0101 => Some(Self::KeyNotFound),
            0x0102 => Some(Self::TypeMismatch),
            0x0201 => Some(Self::TopicNotFound),
            0x0301 => Some(Self::SubscriberFailed),
            0x0302 => Some(Self::ChannelClosed),
            0x0401 => Some(Self::AlreadyStarted),
            0x0402 => Some(Self::AlreadyStopped),
            0x0501 => Some(Self::ConfigInvalid),
            0x0502 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get a human-readable description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "No entry stored under key",
            Self::TypeMismatch => "Entry stored under a different type",
            Self::TopicNotFound => "No topic with that name",
            Self::SubscriberFailed => "Subscriber failed to handle message",
            Self::ChannelClosed => "Forwarding channel is closed",
            Self::AlreadyStarted => "Broker was already started",
            Self::AlreadyStopped => "Broker was already stopped",
            Self::ConfigInvalid => "Invalid configuration",
            Self::InternalError => "Unexpected internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::TopicNotFound => "TOPIC_NOT_FOUND",
            Self::SubscriberFailed => "SUBSCRIBER_FAILED",
            Self::ChannelClosed => "CHANNEL_CLOSED",
            Self::AlreadyStarted => "ALREADY_STARTED",
            Self::AlreadyStopped => "ALREADY_STOPPED",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{} (0x{:04X})", name, self.as_u16())
    }
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Registry,
    Topic,
    Delivery,
    Lifecycle,
    System,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "Registry"),
            Self::Topic => write!(f, "Topic"),
            Self::Delivery => write!(f, "Delivery"),
            Self::Lifecycle => write!(f, "Lifecycle"),
            Self::System => write!(f, "System"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Main error type for Topicrelay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{code}: {message}")]
    Standard {
        code: ErrorCode,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl RelayError {
    /// Create a new standard error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Standard {
            code,
            message: message.into(),
        }
    }

    /// Get the error code if this is a standard error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Standard { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True if this is a standard error carrying `code`
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code() == Some(code)
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Standard { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for Topicrelay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl From<String> for RelayError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for RelayError {
    fn from(message: &str) -> Self {
        Self::Other(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trips_through_u16() {
        for code in [
            ErrorCode::KeyNotFound,
            ErrorCode::TypeMismatch,
            ErrorCode::TopicNotFound,
            ErrorCode::ChannelClosed,
            ErrorCode::AlreadyStopped,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::from_u16(code.as_u16()), Some(code));
        }
        assert_eq!(ErrorCode::from_u16(0xFFFF), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::TypeMismatch.category(), ErrorCategory::Registry);
        assert_eq!(ErrorCode::TopicNotFound.category(), ErrorCategory::Topic);
        assert_eq!(ErrorCode::SubscriberFailed.category(), ErrorCategory::Delivery);
        assert_eq!(ErrorCode::AlreadyStarted.category(), ErrorCategory::Lifecycle);
        assert_eq!(ErrorCode::ConfigInvalid.category(), ErrorCategory::System);
    }

    #[test]
    fn test_display_and_code_lookup() {
        let err = RelayError::new(ErrorCode::KeyNotFound, "orders");
        assert_eq!(err.to_string(), "KEY_NOT_FOUND (0x0101): orders");
        assert!(err.is(ErrorCode::KeyNotFound));
        assert!(!err.is(ErrorCode::TypeMismatch));
        assert_eq!(err.message(), "orders");

        let other = RelayError::from("boom");
        assert_eq!(other.code(), None);
        assert_eq!(other.message(), "Unknown error: boom");
    }
}
