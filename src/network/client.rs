use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::blockchain::Block;
use crate::error::PeerError;

/// Path every node serves its chain on.
pub const CHAIN_PATH: &str = "/api/v1/chain/";

/// A peer's answer to "send me your chain".
#[derive(Debug, Clone, Deserialize)]
pub struct PeerChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Fetches a peer's current chain. Implementations must give up on
/// unreachable peers instead of blocking forever.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, PeerError>;
}

/// `PeerClient` over plain HTTP.
pub struct HttpPeerClient {
    client: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, PeerError> {
        let response = self
            .client
            .get(chain_url(address))
            .send()
            .await
            .map_err(|e| PeerError::Unreachable {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::BadStatus {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| PeerError::Unreachable {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        decode_chain(address, &body)
    }
}

pub fn chain_url(address: &str) -> String {
    format!("http://{address}{CHAIN_PATH}")
}

/// Decode a `{ "length", "chain" }` payload, rejecting missing fields and
/// a `length` that disagrees with the chain actually sent.
pub fn decode_chain(address: &str, body: &[u8]) -> Result<PeerChain, PeerError> {
    let malformed = |reason: String| PeerError::MalformedChain {
        address: address.to_string(),
        reason,
    };

    let peer: PeerChain = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
    if peer.length != peer.chain.len() {
        return Err(malformed(format!(
            "reported length {} but sent {} blocks",
            peer.length,
            peer.chain.len()
        )));
    }
    Ok(peer)
}
