use async_trait::async_trait;
use reqwest::{header, Client};

use crate::{
    config::ProviderConfig,
    error::{FailureReason, MemeError, Result},
    models::{ChatRequest, ChatResponse},
    provider::traits::ChatProvider,
};

/// Longest error body kept for diagnostics.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    site_url: String,
    app_title: String,
}

impl OpenRouterProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MemeError::ConfigError("OpenRouter API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            site_url: config.site_url.clone(),
            app_title: config.app_title.clone(),
        })
    }

    fn build_headers(&self) -> Result<header::HeaderMap> {
        let value = |v: &str| {
            header::HeaderValue::from_str(v)
                .map_err(|e| MemeError::ConfigError(format!("invalid header value: {}", e)))
        };

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            value(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(header::CONTENT_TYPE, value("application/json")?);
        headers.insert("http-referer", value(&self.site_url)?);
        headers.insert("x-title", value(&self.app_title)?);
        Ok(headers)
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        log::debug!("POST {} model={}", self.endpoint, request.model);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| MemeError::Provider(FailureReason::Transport(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MemeError::Provider(FailureReason::Status {
                code: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            }));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MemeError::Provider(FailureReason::Transport(e.to_string())))?;

        // A 200 with a body that is not a completion is treated as empty output
        // so the caller falls through to the next model.
        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => Ok(parsed.first_text()),
            Err(e) => {
                log::warn!("Unreadable completion body from {}: {}", request.model, e);
                Ok(String::new())
            }
        }
    }
}
