//! The two-stage discovery pipeline: an ARP probe round followed by bounded,
//! time-limited reverse name resolution.

pub mod discovery;
pub mod probe;
pub mod resolver;

pub use discovery::{DiscoveryService, ResolutionStats, ScanReport};
pub use probe::{ArpProber, Prober};
pub use resolver::{NameLookup, NameResolver, SystemLookup};
