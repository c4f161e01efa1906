use crate::error::*;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    /// Whether the next scheduled cycle can be expected to clear the error.
    fn is_transient(&self) -> bool;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Fetch(e) => {
                error!("Fetch error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Store error details: {:?}", e);
            }
            CoreError::Notify(e) => {
                error!("Notification error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            CoreError::Fetch(FetchError::UnexpectedStatus { status_code, .. }) => {
                *status_code == 429 || *status_code >= 500
            }
            CoreError::Fetch(FetchError::RequestFailed { .. })
            | CoreError::Fetch(FetchError::BodyUnreadable { .. }) => true,
            // Permission and disk faults need an operator.
            CoreError::Store(_) => false,
            CoreError::Notify(e) => matches!(e, NotifyError::Transport { .. }),
            CoreError::Network(_) => true,
            CoreError::Config(_) | CoreError::Url(_) | CoreError::Internal { .. } => false,
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Fetch(_) => "FETCH".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Notify(_) => "NOTIFY".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Url(_) => "URL".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

/// Single place where cycle failures are logged.
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        if error.is_transient() {
            info!("Error is transient, the next cycle will try again");
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
