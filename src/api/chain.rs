use actix_web::{HttpResponse, Responder, get, web};
use log::{debug, info, warn};

use super::models::{AppState, ChainResponse, MineResponse, ValidateResponse};
use crate::blockchain::{Block, Ledger, MINING_REWARD, pow};
use crate::error::LedgerError;
use crate::transaction::REWARD_SENDER;

/// Get the full chain. This is also what peers fetch during consensus.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        length: bc.len(),
        chain: bc.chain(),
    })
}

/// Validate the local chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: bc.is_valid(),
        length: bc.len(),
    })
}

/// Mine a new block:
/// - Snapshot the head and release the ledger lock
/// - Run PoW on the blocking pool
/// - Re-lock; if the head moved meanwhile, start over against the new head
/// - Otherwise queue the reward and forge the block from the pending pool
#[get("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    loop {
        let head = {
            let bc = state.ledger.lock().expect("mutex poisoned");
            bc.last_block().map(|last| (last.proof, last.compute_hash()))
        };
        let (last_proof, last_hash) = match head {
            Ok(head) => head,
            Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
        };

        let proof = match web::block(move || pow::solve(last_proof)).await {
            Ok(proof) => proof,
            Err(e) => {
                warn!("MINER - proof-of-work worker failed: {e}");
                return HttpResponse::InternalServerError().body("proof-of-work worker failed");
            }
        };

        let forged = {
            let mut bc = state.ledger.lock().expect("mutex poisoned");
            forge(&mut bc, &state.node_id, proof, &last_hash)
        };

        match forged {
            Ok(Some(block)) => {
                info!(
                    "MINER - forged block #{} (proof={}, txs={})",
                    block.index,
                    block.proof,
                    block.transactions.len()
                );
                return HttpResponse::Ok().json(MineResponse {
                    message: "New Block Forged",
                    index: block.index,
                    transactions: block.transactions,
                    proof: block.proof,
                    previous_hash: block.previous_hash,
                });
            }
            Ok(None) => debug!("MINER - head moved during proof-of-work, retrying"),
            Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
        }
    }
}

/// Append the reward and a block on top of `last_hash`, unless the head is
/// no longer `last_hash`.
fn forge(
    bc: &mut Ledger,
    node_id: &str,
    proof: u64,
    last_hash: &str,
) -> Result<Option<Block>, LedgerError> {
    if bc.last_block()?.compute_hash() != last_hash {
        return Ok(None);
    }
    bc.new_transaction(REWARD_SENDER, node_id, MINING_REWARD);
    let block = bc.new_block(proof, Some(last_hash.to_string()))?;
    Ok(Some(block.clone()))
}
