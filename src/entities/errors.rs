//! Error taxonomy for the feed core.
//!
//! - [`FetchError`]: page fetch failed (transport or payload). Surfaces as
//!   `PaginationState::Failed`, retryable by the caller.
//! - [`InitError`]: one media resource failed to open. Stays on its handle.
//! - [`PolicyViolation`]: programmer error. Asserts in debug builds, logged
//!   and ignored in release builds.

use log::error;

/// Page fetch failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fetch error: {}", self.message)
    }
}

impl std::error::Error for FetchError {}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::new(format!("JSON error: {}", e))
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::new(format!("IO error: {}", e))
    }
}

/// Media resource initialization failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitError {
    message: String,
}

impl InitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Init error: {}", self.message)
    }
}

impl std::error::Error for InitError {}

/// Misuse of the window or gate API
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyViolation {
    IndexOutOfRange { index: usize, len: usize },
    InvalidSpeed(f32),
    InvalidVisibility(f32),
    InvalidPolicy(String),
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyViolation::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for feed of {} items", index, len)
            }
            PolicyViolation::InvalidSpeed(m) => write!(f, "invalid playback speed {}", m),
            PolicyViolation::InvalidVisibility(v) => write!(f, "invalid visibility fraction {}", v),
            PolicyViolation::InvalidPolicy(msg) => write!(f, "invalid window policy: {}", msg),
        }
    }
}

impl std::error::Error for PolicyViolation {}

impl PolicyViolation {
    /// Fatal in debug builds, logged and ignored otherwise.
    pub fn report(self) {
        error!("policy violation: {}", self);
        debug_assert!(false, "policy violation: {}", self);
    }
}
