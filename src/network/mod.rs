pub mod client;
pub mod consensus;
pub mod registry;

pub use client::{HttpPeerClient, PeerClient};
pub use consensus::resolve_conflicts;
pub use registry::PeerRegistry;
