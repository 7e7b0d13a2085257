use thiserror::Error;

/// Failures of the local ledger itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger has no blocks (genesis missing)")]
    EmptyChain,
}

/// Failures talking to a single peer. The resolver logs and skips these.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {address} unreachable: {reason}")]
    Unreachable { address: String, reason: String },
    #[error("peer {address} answered with status {status}")]
    BadStatus { address: String, status: u16 },
    #[error("peer {address} sent a malformed chain: {reason}")]
    MalformedChain { address: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
}
