use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MemeError, Result};
use crate::models::{ModelCandidate, ModelRoster};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_TITLE: &str = "AI Meme Gen";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub site_url: String,
    pub app_title: String,
}

#[derive(Debug, Clone)]
pub struct CaptionConfig {
    /// Covers every candidate of one generation call combined.
    pub deadline: Duration,
    pub roster: ModelRoster,
}

#[derive(Debug, Clone)]
pub struct ImagingConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct CompositingConfig {
    pub font_path: Option<PathBuf>,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub captions: CaptionConfig,
    pub imaging: ImagingConfig,
    pub compositing: CompositingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        ServerConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        ProviderConfig {
            api_key: env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: env::var("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            site_url: env::var("SITE_URL").unwrap_or(defaults.site_url),
            app_title: env::var("APP_TITLE").unwrap_or(defaults.app_title),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_attribution(
        mut self,
        site_url: impl Into<String>,
        app_title: impl Into<String>,
    ) -> Self {
        self.site_url = site_url.into();
        self.app_title = app_title.into();
        self
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        CaptionConfig {
            deadline: Duration::from_secs(60),
            roster: ModelRoster::default(),
        }
    }
}

impl CaptionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fast = env::var("MEME_FAST_MODELS")
            .ok()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(ModelCandidate::fast)
                    .collect::<Vec<_>>()
            })
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| defaults.roster.fast().to_vec());
        let reasoning = env::var("MEME_REASONING_MODEL")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .map(|id| ModelCandidate::reasoning(id.trim()))
            .unwrap_or_else(|| defaults.roster.reasoning().clone());

        CaptionConfig {
            deadline: env::var("MEME_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.deadline),
            roster: ModelRoster::new(reasoning, fast),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_roster(mut self, roster: ModelRoster) -> Self {
        self.roster = roster;
        self
    }
}

impl Default for ImagingConfig {
    fn default() -> Self {
        ImagingConfig {
            max_dimension: 800,
            jpeg_quality: 85,
        }
    }
}

impl ImagingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        ImagingConfig {
            max_dimension: env::var("MEME_MAX_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_dimension),
            jpeg_quality: env::var("MEME_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jpeg_quality),
        }
    }
}

impl Default for CompositingConfig {
    fn default() -> Self {
        CompositingConfig {
            font_path: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl CompositingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        CompositingConfig {
            font_path: env::var("MEME_FONT_PATH").ok().map(PathBuf::from),
            export_dir: env::var("MEME_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        }
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            captions: CaptionConfig::default(),
            imaging: ImagingConfig::default(),
            compositing: CompositingConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            server: ServerConfig::from_env(),
            provider: ProviderConfig::from_env(),
            captions: CaptionConfig::from_env(),
            imaging: ImagingConfig::from_env(),
            compositing: CompositingConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_captions(mut self, captions: CaptionConfig) -> Self {
        self.captions = captions;
        self
    }

    pub fn with_compositing(mut self, compositing: CompositingConfig) -> Self {
        self.compositing = compositing;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(MemeError::ConfigError("OPENROUTER_API_KEY is required".into()));
        }
        if self.captions.roster.fast().is_empty() {
            return Err(MemeError::ConfigError("at least one fast model is required".into()));
        }
        if self.captions.deadline.is_zero() {
            return Err(MemeError::ConfigError("caption deadline must be positive".into()));
        }
        if self.imaging.max_dimension == 0 {
            return Err(MemeError::ConfigError("max image dimension must be positive".into()));
        }
        if !(1..=100).contains(&self.imaging.jpeg_quality) {
            return Err(MemeError::ConfigError(format!(
                "JPEG quality must be within 1..=100, got {}",
                self.imaging.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::new();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.captions.deadline, Duration::from_secs(60));
        assert_eq!(config.imaging.max_dimension, 800);
        assert_eq!(config.imaging.jpeg_quality, 85);
        assert_eq!(config.captions.roster.fast().len(), 3);
    }

    #[test]
    fn validate_requires_api_key() {
        let config = Config::new();
        assert!(matches!(config.validate(), Err(MemeError::ConfigError(_))));

        let config = Config::new().with_provider(ProviderConfig::new().with_api_key("sk-test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_deadline() {
        let config = Config::new()
            .with_provider(ProviderConfig::new().with_api_key("sk-test"))
            .with_captions(CaptionConfig::default().with_deadline(Duration::ZERO));
        assert!(config.validate().is_err());
    }
}
