use sha2::{Digest, Sha256};

use super::DIFFICULTY_PREFIX;

/// Does `sha256("{previous_proof}{proof}")` start with the difficulty prefix?
pub fn is_valid_proof(previous_proof: u64, proof: u64) -> bool {
    let guess = format!("{previous_proof}{proof}");
    let digest = hex::encode(Sha256::digest(guess.as_bytes()));
    digest.starts_with(DIFFICULTY_PREFIX)
}

/// Find the smallest proof that is valid against `previous_proof`.
///
/// Plain linear search from zero. This blocks the calling thread until a
/// solution is found; callers inside async code should hand it to a
/// blocking pool.
pub fn solve(previous_proof: u64) -> u64 {
    let mut proof = 0u64;
    while !is_valid_proof(previous_proof, proof) {
        proof += 1;
    }
    proof
}

#[cfg(test)]
mod tests {
    use super::{is_valid_proof, solve};
    use sha2::{Digest, Sha256};

    #[test]
    fn predicate_matches_digest_of_concatenation() {
        for (p, q) in [(100u64, 0u64), (100, 42), (7, 12345)] {
            let digest = hex::encode(Sha256::digest(format!("{p}{q}").as_bytes()));
            assert_eq!(is_valid_proof(p, q), digest.starts_with("0000"));
        }
    }

    #[test]
    fn solve_returns_smallest_valid_proof() {
        let proof = solve(100);
        assert!(is_valid_proof(100, proof));
        assert!((0..proof).all(|q| !is_valid_proof(100, q)));
    }

    #[test]
    fn solve_is_deterministic() {
        assert_eq!(solve(100), solve(100));
    }
}
