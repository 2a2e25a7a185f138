use std::sync::Arc;

use crate::{
    captions::CaptionOrchestrator,
    compositing::Compositor,
    error::{MemeError, Result},
    imaging::ImageNormalizer,
};

/// Shared, read-only handles used by every request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: CaptionOrchestrator,
    pub normalizer: ImageNormalizer,
    /// `None` when no caption font could be loaded; export is then unavailable.
    pub compositor: Option<Arc<Compositor>>,
}

impl AppState {
    pub fn new(
        orchestrator: CaptionOrchestrator,
        normalizer: ImageNormalizer,
        compositor: Option<Compositor>,
    ) -> Self {
        Self {
            orchestrator,
            normalizer,
            compositor: compositor.map(Arc::new),
        }
    }

    pub fn compositor(&self) -> Result<Arc<Compositor>> {
        self.compositor.clone().ok_or_else(|| {
            MemeError::ConfigError("export requires a caption font; set MEME_FONT_PATH".into())
        })
    }
}
