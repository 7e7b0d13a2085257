use actix_web::{HttpResponse, Responder, get, post, web};
use log::debug;

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};

/// Queue a transaction for the next mined block.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();

    let index = {
        let mut bc = state.ledger.lock().expect("mutex poisoned");
        debug!("POST /transactions/new/ - {sender:?} -> {recipient:?} ({amount}) queued");
        let index = bc.new_transaction(sender, recipient, amount);
        debug!(
            "POST /transactions/new/ - pending size {}",
            bc.pending().len()
        );
        index
    };

    HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
        index,
    })
}

/// List transactions waiting for the next block.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let bc = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PendingResponse {
        size: bc.pending().len(),
        transactions: bc.pending(),
    })
}
