//! Shared building blocks for the netsweep workspace.
//!
//! Holds the types every other crate agrees on: the scan configuration, the
//! fatal error taxonomy, the address range being probed and the devices a scan
//! produces.

pub mod config;
pub mod error;
pub mod macros;
pub mod network;

pub use error::ScanError;

#[doc(hidden)]
pub use tracing as __tracing;
