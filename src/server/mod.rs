pub mod response;
pub mod routes;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::{config::ServerConfig, error::Result};

pub use routes::configure;
pub use state::AppState;

/// Serves the meme API until the process is stopped.
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let bind_address = config.bind_address();
    let data = web::Data::new(state);

    log::info!("🔄 Binding HTTP server to {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::new("%r %s %b %Dms"))
            .configure(configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    log::info!("🛑 HTTP server stopped");
    Ok(())
}
