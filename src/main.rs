use std::sync::Arc;

use memeai::{
    logger,
    server::{self, AppState},
    CaptionOrchestrator, Compositor, Config, ImageNormalizer, OpenRouterProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();
    logger::init()?;

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        log::error!("❌ Invalid configuration: {}", e);
        return Err(e.into());
    }
    logger::log_config_info(&config);

    let provider = match OpenRouterProvider::new(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            log::error!("❌ Failed to initialize OpenRouter client: {}", e);
            return Err(e.into());
        }
    };
    let orchestrator = CaptionOrchestrator::from_config(Arc::new(provider), &config.captions);
    let normalizer = ImageNormalizer::from_config(&config.imaging);

    let compositor = match Compositor::from_config(&config.compositing) {
        Ok(compositor) => Some(compositor),
        Err(e) => {
            log::warn!("⚠️  Meme export disabled: {}", e);
            None
        }
    };

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.server.bind_address(),
    );

    let state = AppState::new(orchestrator, normalizer, compositor);
    server::run(&config.server, state).await?;
    Ok(())
}
