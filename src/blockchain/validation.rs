use log::debug;

use super::Block;
use super::pow::is_valid_proof;

/// Check hash linkage and proof-of-work for every adjacent pair of `chain`.
///
/// The first block is trusted as genesis. An empty chain is malformed and
/// therefore invalid.
pub fn is_valid_chain(chain: &[Block]) -> bool {
    if chain.is_empty() {
        debug!("rejecting empty chain");
        return false;
    }

    for pair in chain.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);

        if cur.previous_hash != prev.compute_hash() {
            debug!("block #{} does not link to #{}", cur.index, prev.index);
            return false;
        }

        if !is_valid_proof(prev.proof, cur.proof) {
            debug!("block #{} carries an invalid proof {}", cur.index, cur.proof);
            return false;
        }
    }

    true
}
