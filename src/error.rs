/*
 * Error type shared by every fallible operation of the crate. Native failures
 * carry the platform's last-error code so callers can log something useful;
 * none of these conditions are retried, since native widget operations fail
 * for non-transient reasons.
 */

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The native layer did not return a handle for a new control.
    #[error("native control creation failed for class {class} (error {code:#010x})")]
    CreationFailed { class: &'static str, code: u32 },

    /// Installing the interception routine as the control's event handler failed.
    #[error("installing the event interception failed (error {code:#010x})")]
    SubclassFailed { code: u32 },

    /// A property round-trip against a live control reported the failure sentinel.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// A required collaborator reference was absent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The widget's native handle is no longer usable.
    #[error("invalid handle: {0}")]
    InvalidHandle(String),
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(e: windows::core::Error) -> Self {
        PlatformError::OperationFailed(format!("{} ({:#010x})", e.message(), e.code().0 as u32))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
