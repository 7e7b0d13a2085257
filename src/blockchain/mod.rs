pub mod block;
pub mod model;
pub mod pow;
pub mod validation;

pub use block::Block;
pub use model::Ledger;
pub use validation::is_valid_chain;

/// Hex prefix a proof digest must start with (16 leading zero bits).
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Proof carried by the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` of the genesis block, which has no predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Amount paid to the node that forges a block.
pub const MINING_REWARD: u64 = 1;

#[cfg(test)]
pub(crate) mod testutil {
    use std::sync::Mutex;

    use super::pow::solve;
    use super::{Block, GENESIS_PROOF, Ledger};

    // Proofs only depend on their predecessor, so every chain mined from
    // genesis shares the same sequence.
    static PROOFS: Mutex<Vec<u64>> = Mutex::new(Vec::new());

    /// Proofs of blocks 1..=n of any chain mined from genesis.
    pub fn proofs(n: usize) -> Vec<u64> {
        let mut cache = PROOFS.lock().unwrap_or_else(|e| e.into_inner());
        if cache.is_empty() {
            cache.push(GENESIS_PROOF);
        }
        while cache.len() < n {
            let last = *cache.last().unwrap();
            cache.push(solve(last));
        }
        cache[..n].to_vec()
    }

    /// A valid ledger of `n` blocks, each after genesis holding one reward.
    pub fn mined_ledger(n: usize, miner: &str) -> Ledger {
        let mut ledger = Ledger::new();
        for proof in proofs(n).into_iter().skip(1) {
            ledger.new_transaction("0", miner, 1);
            ledger.new_block(proof, None).unwrap();
        }
        ledger
    }

    pub fn mined_chain(n: usize) -> Vec<Block> {
        mined_ledger(n, "miner").chain().to_vec()
    }
}
