use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, NodesResponse, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse,
};
use crate::network::registry::normalize;
use crate::network::resolve_conflicts;

/// Register peers. All addresses are checked before any is stored.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> impl Responder {
    if body.nodes.is_empty() {
        return HttpResponse::BadRequest().body("Error: Please supply a valid list of nodes");
    }

    let authorities = match body
        .nodes
        .iter()
        .map(|n| normalize(n))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(a) => a,
        Err(e) => {
            warn!("POST /nodes/register/ - rejected: {e}");
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    let total_nodes = {
        let mut peers = state.peers.lock().expect("mutex poisoned");
        for authority in &authorities {
            if let Err(e) = peers.register(authority) {
                return HttpResponse::BadRequest().body(e.to_string());
            }
        }
        peers.list()
    };
    info!("POST /nodes/register/ - {} peer(s) known", total_nodes.len());

    HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes,
    })
}

#[get("/nodes/")]
pub async fn list_nodes(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(NodesResponse {
        count: peers.len(),
        total_nodes: peers.list(),
    })
}

/// Run consensus against every registered peer.
#[get("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let replaced =
        resolve_conflicts(&state.ledger, &state.peers, state.peer_client.as_ref()).await;
    let chain = state.ledger.lock().expect("mutex poisoned").chain().to_vec();

    let resp = if replaced {
        ResolveResponse::Replaced {
            message: "Our chain was replaced",
            new_chain: chain,
        }
    } else {
        ResolveResponse::Authoritative {
            message: "Our chain is authoritative",
            chain,
        }
    };
    HttpResponse::Ok().json(resp)
}
