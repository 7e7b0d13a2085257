use log::debug;

use super::Block;
use super::validation::is_valid_chain;
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// In-memory ledger: the hash-linked chain plus the pool of transactions
/// waiting for the next block.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Forge a block holding every pending transaction and append it.
    ///
    /// Without `previous_hash` the block links to the hash of the current
    /// last block.
    pub fn new_block(
        &mut self,
        proof: u64,
        previous_hash: Option<String>,
    ) -> Result<&Block, LedgerError> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block()?.compute_hash(),
        };
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(
            self.chain.len() as u64 + 1,
            transactions,
            proof,
            previous_hash,
        );
        debug!(
            "forged block #{} with {} txs",
            block.index,
            block.transactions.len()
        );

        self.chain.push(block);
        self.last_block()
    }

    /// Queue a transaction for the next block and return that block's index.
    /// The index is only a hint: the pool is flushed whole into whichever
    /// block is forged next.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> u64 {
        self.pending.push(Transaction::new(sender, recipient, amount));
        self.chain.len() as u64 + 1
    }

    /// Swap the whole chain for `chain`. The pending pool is kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<(), LedgerError> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        self.chain = chain;
        Ok(())
    }

    /// Validate the ledger's own chain: linkage and PoW.
    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.chain)
    }
}
