pub mod captions;
pub mod compositing;
pub mod config;
pub mod error;
pub mod imaging;
pub mod logger;
pub mod models;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

pub use captions::{extract_captions, CaptionOrchestrator};
pub use compositing::{Compositor, ExportArtifact, MemeFont, Surface};
pub use config::{CaptionConfig, CompositingConfig, Config, ImagingConfig, ProviderConfig, ServerConfig};
pub use error::{MemeError, Result};
pub use imaging::ImageNormalizer;
pub use models::{
    Alignment, Band, CaptionRequest, CaptionResult, CaptionSet, HexColor, ImagePayload,
    MemeDocument, ModelCandidate, ModelRoster, TextStyle,
};
pub use provider::{ChatProvider, OpenRouterProvider};
pub use session::MemeSession;
