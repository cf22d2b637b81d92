use crate::{config, error, info, server, spotify::auth::TokenRefresher};

pub async fn serve() {
    let refresher = match TokenRefresher::from_env() {
        Ok(r) => r,
        Err(e) => error!("Cannot read Spotify credentials: {}", e),
    };

    let addr = config::server_addr();
    info!("Listening on http://{}", addr);

    if let Err(e) = server::start_api_server(&addr, super::server_state(refresher)).await {
        error!("{}", e);
    }
}
