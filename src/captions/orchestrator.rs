use std::sync::Arc;
use std::time::Duration;

use crate::{
    captions::{extract::extract_captions, prompt::build_chat_request},
    config::CaptionConfig,
    error::{FailureReason, MemeError, PerModelFailure, Result},
    logger,
    models::{CaptionRequest, CaptionSet, ModelCandidate, ModelRoster},
    provider::ChatProvider,
};

/// Longest slice of raw model output written to the debug log.
const RAW_EXCERPT_CHARS: usize = 100;

/// Walks the ranked model list until one model yields usable captions.
///
/// Candidates are tried strictly one after another with a single attempt
/// each. Per-model failures are logged and skipped; only exhausting the list
/// (or the overall deadline) is reported to the caller.
#[derive(Clone)]
pub struct CaptionOrchestrator {
    provider: Arc<dyn ChatProvider>,
    roster: ModelRoster,
    deadline: Duration,
}

impl CaptionOrchestrator {
    pub fn new(provider: Arc<dyn ChatProvider>, roster: ModelRoster) -> Self {
        Self {
            provider,
            roster,
            deadline: CaptionConfig::default().deadline,
        }
    }

    pub fn from_config(provider: Arc<dyn ChatProvider>, config: &CaptionConfig) -> Self {
        Self::new(provider, config.roster.clone()).with_deadline(config.deadline)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    pub async fn generate_captions(&self, request: CaptionRequest) -> Result<CaptionSet> {
        let _timer = logger::timer("caption generation");
        let candidates = self.roster.candidates(request.reasoning_mode);

        let mut attempts = 0;
        let mut last_failure = None;
        let outcome = tokio::time::timeout(
            self.deadline,
            self.try_candidates(&request, &candidates, &mut attempts, &mut last_failure),
        )
        .await;

        match outcome {
            Ok(Some(captions)) => Ok(captions),
            Ok(None) => {
                log::error!(
                    "All {} candidate models failed to produce captions",
                    attempts
                );
                Err(MemeError::AllModelsFailed {
                    attempts,
                    last: last_failure,
                })
            }
            Err(_) => {
                log::error!(
                    "Caption deadline of {:?} expired after {} attempt(s)",
                    self.deadline,
                    attempts
                );
                Err(MemeError::AllModelsFailed {
                    attempts,
                    last: last_failure,
                })
            }
        }
    }

    async fn try_candidates(
        &self,
        request: &CaptionRequest,
        candidates: &[&ModelCandidate],
        attempts: &mut usize,
        last_failure: &mut Option<PerModelFailure>,
    ) -> Option<CaptionSet> {
        for candidate in candidates {
            *attempts += 1;
            log::info!(
                "Attempting model {} ({}/{}) | reasoning mode: {}",
                candidate.id,
                attempts,
                candidates.len(),
                request.reasoning_mode
            );

            match self.attempt(request, candidate).await {
                Ok(captions) => {
                    log::info!(
                        "Model {} produced {} caption(s)",
                        candidate.id,
                        captions.len()
                    );
                    return Some(captions);
                }
                Err(failure) => {
                    log::warn!("{}", failure);
                    *last_failure = Some(failure);
                }
            }
        }
        None
    }

    async fn attempt(
        &self,
        request: &CaptionRequest,
        candidate: &ModelCandidate,
    ) -> std::result::Result<CaptionSet, PerModelFailure> {
        let failure = |reason: FailureReason| PerModelFailure {
            model: candidate.id.clone(),
            reason,
        };

        let chat = build_chat_request(request, candidate);
        let raw = self
            .provider
            .complete(&chat)
            .await
            .map_err(|e| match e {
                MemeError::Provider(reason) => failure(reason),
                other => failure(FailureReason::Transport(other.to_string())),
            })?;

        let captions = extract_captions(&raw);
        if captions.is_empty() {
            let excerpt: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
            log::debug!(
                "Structured parsing found nothing for model {}. Raw output: {}...",
                candidate.id,
                excerpt
            );
            return Err(failure(FailureReason::NoCaptions));
        }

        Ok(CaptionSet::new(captions))
    }
}
