use thiserror::Error;

use crate::network::interface::ViabilityError;

/// Errors that abort a scan before any result is produced.
///
/// Per-address name resolution failures never show up here; they become
/// [`UNKNOWN_NAME`](crate::network::device::UNKNOWN_NAME).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid network range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("sending raw ARP frames requires root privileges (try again with sudo)")]
    InsufficientPrivilege,

    #[error("interface '{0}' does not exist")]
    InterfaceNotFound(String),

    #[error("interface '{name}' cannot be used for ARP: {reason}")]
    InterfaceUnusable {
        name: String,
        reason: ViabilityError,
    },

    #[error("no usable interface found to reach {0}")]
    NoUsableInterface(String),

    #[error("failed to open a datalink channel on {interface}")]
    Channel {
        interface: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Probe(#[from] anyhow::Error),
}

impl ScanError {
    pub fn invalid_range(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidRange {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
