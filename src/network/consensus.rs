use std::sync::Mutex;

use futures::future::join_all;
use log::{debug, info, warn};

use super::client::{PeerChain, PeerClient};
use super::registry::PeerRegistry;
use crate::blockchain::{
    Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF, Ledger, is_valid_chain,
};
use crate::error::PeerError;

/// Consensus: replace the local chain with the longest valid chain held by
/// any registered peer. Returns whether the local chain was replaced.
///
/// Peers are fetched concurrently without holding either lock. Failing
/// peers are logged and skipped; the outcome is always a plain bool.
pub async fn resolve_conflicts(
    ledger: &Mutex<Ledger>,
    registry: &Mutex<PeerRegistry>,
    client: &dyn PeerClient,
) -> bool {
    let peers = registry.lock().expect("mutex poisoned").list();
    let local_len = ledger.lock().expect("mutex poisoned").len();

    if peers.is_empty() {
        debug!("CONSENSUS - no peers registered");
        return false;
    }

    let replies = join_all(peers.iter().map(|addr| client.fetch_chain(addr))).await;
    let Some((winner, chain)) = select_longest(local_len, peers.into_iter().zip(replies)) else {
        info!("CONSENSUS - local chain ({local_len} blocks) is authoritative");
        return false;
    };

    let mut bc = ledger.lock().expect("mutex poisoned");
    if chain.len() <= bc.len() {
        // Our own chain grew while the peers were being fetched.
        info!(
            "CONSENSUS - chain from {winner} ({} blocks) no longer beats ours ({})",
            chain.len(),
            bc.len()
        );
        return false;
    }

    let new_len = chain.len();
    match bc.replace_chain(chain) {
        Ok(()) => {
            info!("CONSENSUS - adopted chain from {winner}: {local_len} -> {new_len} blocks");
            true
        }
        Err(e) => {
            warn!("CONSENSUS - could not adopt chain from {winner}: {e}");
            false
        }
    }
}

/// Pick the winning peer chain among fetch results.
///
/// A candidate must be strictly longer than the best seen so far (starting
/// at `local_len`) and valid. Candidates are visited by ascending address,
/// so the longest chain wins and equal lengths go to the smallest address.
/// Chains that would break the ledger layout (1-based contiguous indices,
/// fixed genesis parameters) are rejected as well.
pub fn select_longest<I>(local_len: usize, replies: I) -> Option<(String, Vec<Block>)>
where
    I: IntoIterator<Item = (String, Result<PeerChain, PeerError>)>,
{
    let mut replies: Vec<_> = replies.into_iter().collect();
    replies.sort_by(|a, b| a.0.cmp(&b.0));

    let mut max_length = local_len;
    let mut winner = None;

    for (address, reply) in replies {
        let peer = match reply {
            Ok(peer) => peer,
            Err(e) => {
                warn!("CONSENSUS - skipping peer: {e}");
                continue;
            }
        };

        if peer.length <= max_length {
            debug!(
                "CONSENSUS - {address}: {} blocks, not longer than {max_length}",
                peer.length
            );
            continue;
        }
        if !follows_ledger_layout(&peer.chain) {
            warn!("CONSENSUS - {address}: rejected chain with bad genesis or block indices");
            continue;
        }
        if !is_valid_chain(&peer.chain) {
            warn!("CONSENSUS - {address}: rejected invalid chain of {} blocks", peer.length);
            continue;
        }

        debug!("CONSENSUS - {address}: new best chain with {} blocks", peer.length);
        max_length = peer.length;
        winner = Some((address, peer.chain));
    }

    winner
}

fn follows_ledger_layout(chain: &[Block]) -> bool {
    let Some(genesis) = chain.first() else {
        return false;
    };
    genesis.previous_hash == GENESIS_PREVIOUS_HASH
        && genesis.proof == GENESIS_PROOF
        && chain
            .iter()
            .enumerate()
            .all(|(i, block)| block.index == i as u64 + 1)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{follows_ledger_layout, resolve_conflicts, select_longest};
    use crate::blockchain::testutil::{mined_chain, mined_ledger};
    use crate::blockchain::{Block, Ledger};
    use crate::error::PeerError;
    use crate::network::client::PeerChain;
    use crate::network::registry::PeerRegistry;
    use crate::network::testutil::FakePeerClient;

    fn registry_of(peers: &[&str]) -> Mutex<PeerRegistry> {
        let mut reg = PeerRegistry::new();
        for p in peers {
            reg.register(p).unwrap();
        }
        Mutex::new(reg)
    }

    fn tampered(mut chain: Vec<Block>) -> Vec<Block> {
        chain[2].transactions[0].amount = 1_000;
        chain
    }

    #[actix_web::test]
    async fn adopts_longer_valid_chain() {
        let ledger = Mutex::new(mined_ledger(3, "local"));
        let registry = registry_of(&["10.0.0.1:5000"]);
        let peer_chain = mined_chain(5);
        let client = FakePeerClient::new().with_chain("10.0.0.1:5000", peer_chain.clone());

        assert!(resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().chain(), peer_chain.as_slice());
    }

    #[actix_web::test]
    async fn rejects_longer_tampered_chain() {
        let ledger = Mutex::new(mined_ledger(3, "local"));
        let before = ledger.lock().unwrap().chain().to_vec();
        let registry = registry_of(&["10.0.0.1:5000"]);
        let client = FakePeerClient::new().with_chain("10.0.0.1:5000", tampered(mined_chain(5)));

        assert!(!resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().chain(), before.as_slice());
    }

    #[actix_web::test]
    async fn equal_length_never_replaces() {
        let ledger = Mutex::new(mined_ledger(3, "local"));
        let registry = registry_of(&["10.0.0.1:5000"]);
        let client = FakePeerClient::new().with_chain("10.0.0.1:5000", mined_chain(3));

        assert!(!resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().chain()[1].transactions[0].recipient, "local");
    }

    #[actix_web::test]
    async fn unreachable_peer_does_not_block_others() {
        let ledger = Mutex::new(Ledger::new());
        let registry = registry_of(&["10.0.0.1:5000", "10.0.0.2:5000"]);
        let client = FakePeerClient::new()
            .with_down("10.0.0.1:5000")
            .with_chain("10.0.0.2:5000", mined_chain(3));

        assert!(resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn all_peers_down_is_not_an_error() {
        let ledger = Mutex::new(Ledger::new());
        let registry = registry_of(&["10.0.0.1:5000", "10.0.0.2:5000"]);
        let client = FakePeerClient::new();

        assert!(!resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn second_resolution_is_a_no_op() {
        let ledger = Mutex::new(Ledger::new());
        let registry = registry_of(&["10.0.0.1:5000"]);
        let client = FakePeerClient::new().with_chain("10.0.0.1:5000", mined_chain(4));

        assert!(resolve_conflicts(&ledger, &registry, &client).await);
        assert!(!resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn pending_pool_survives_replacement() {
        let mut local = Ledger::new();
        local.new_transaction("alice", "bob", 2);
        let ledger = Mutex::new(local);
        let registry = registry_of(&["10.0.0.1:5000"]);
        let client = FakePeerClient::new().with_chain("10.0.0.1:5000", mined_chain(2));

        assert!(resolve_conflicts(&ledger, &registry, &client).await);
        assert_eq!(ledger.lock().unwrap().pending().len(), 1);
    }

    fn reply(chain: Vec<Block>) -> Result<PeerChain, PeerError> {
        Ok(PeerChain {
            length: chain.len(),
            chain,
        })
    }

    #[test]
    fn longest_wins_regardless_of_order() {
        let replies = vec![
            ("c:1".to_string(), reply(mined_chain(4))),
            ("a:1".to_string(), reply(mined_chain(5))),
            ("b:1".to_string(), reply(mined_chain(3))),
        ];
        let (addr, chain) = select_longest(1, replies).unwrap();
        assert_eq!(addr, "a:1");
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn equal_lengths_go_to_smallest_address() {
        let replies = vec![
            ("b:1".to_string(), reply(mined_chain(4))),
            ("a:1".to_string(), reply(mined_chain(4))),
        ];
        let (addr, _) = select_longest(2, replies).unwrap();
        assert_eq!(addr, "a:1");
    }

    #[test]
    fn invalid_longest_falls_back_to_next_valid() {
        let replies = vec![
            ("a:1".to_string(), reply(tampered(mined_chain(5)))),
            ("b:1".to_string(), reply(mined_chain(4))),
        ];
        let (addr, chain) = select_longest(2, replies).unwrap();
        assert_eq!(addr, "b:1");
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn nothing_longer_selects_nothing() {
        let replies = vec![
            ("a:1".to_string(), reply(mined_chain(2))),
            (
                "b:1".to_string(),
                Err(PeerError::Unreachable {
                    address: "b:1".into(),
                    reason: "timed out".into(),
                }),
            ),
        ];
        assert!(select_longest(2, replies).is_none());
    }

    #[test]
    fn misnumbered_chain_is_not_adopted() {
        let mut chain = mined_chain(4);
        // The last block's index is not covered by any successor's hash.
        chain[3].index = 9;
        assert!(crate::blockchain::is_valid_chain(&chain));
        assert!(!follows_ledger_layout(&chain));

        let replies = vec![
            ("a:1".to_string(), reply(chain)),
            ("b:1".to_string(), reply(mined_chain(3))),
        ];
        let (addr, chain) = select_longest(1, replies).unwrap();
        assert_eq!(addr, "b:1");
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn foreign_genesis_breaks_layout() {
        let mut chain = vec![Block::genesis()];
        assert!(follows_ledger_layout(&chain));

        chain[0].proof = 7;
        assert!(!follows_ledger_layout(&chain));

        let mut chain = vec![Block::genesis()];
        chain[0].previous_hash = "0".into();
        assert!(!follows_ledger_layout(&chain));

        assert!(!follows_ledger_layout(&[]));
    }
}
