mod api;
mod blockchain;
mod config;
mod error;
mod network;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};
use uuid::Uuid;

use api::AppState;
use config::Config;
use network::HttpPeerClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let node_id = Uuid::new_v4().simple().to_string();
    let client = HttpPeerClient::new(config.peer_timeout).map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(node_id.clone(), Box::new(client)));

    {
        let mut peers = state.peers.lock().expect("mutex poisoned");
        for address in &config.peers {
            if let Err(e) = peers.register(address) {
                warn!("ignoring configured peer: {e}");
            }
        }
        if peers.is_empty() {
            info!("no peers configured; register them via /api/v1/nodes/register/");
        } else {
            info!("{} peer(s) configured: {:?}", peers.len(), peers.list());
        }
    }

    let (host, port) = (config.host.clone(), config.port);
    println!("⛓️ Starting node {node_id} at http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
