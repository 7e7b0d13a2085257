use serde::{Deserialize, Serialize};

/// Sender used for mining rewards: the coin comes from nowhere.
pub const REWARD_SENDER: &str = "0";

/// A transfer waiting in the pending pool or committed to a block.
/// No balance or signature checks are performed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}
