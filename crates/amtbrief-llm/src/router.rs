use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use amtbrief_core::types::ProviderFamily;

use crate::error::LlmError;
use crate::health::HealthTracker;
use crate::provider::{ChatRequest, ImagePart, LlmProvider, Message, ProviderError, Role};
use crate::{AnthropicProvider, GeminiProvider, OpenAiProvider};

const SOFT_TIMEOUT: Duration = Duration::from_secs(30);
const HARD_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_BASE_MS: u64 = 500;
const RETRY_CAP_MS: u64 = 4000;

/// A resolved system-wide key per provider family, passed in from
/// `ProvidersConfig` at call sites — the router itself holds no state
/// beyond health tracking.
#[derive(Debug, Clone, Default)]
pub struct SystemKeys {
    pub gemini: Option<String>,
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl SystemKeys {
    fn get(&self, family: ProviderFamily) -> Option<&str> {
        match family {
            ProviderFamily::GeminiLike => self.gemini.as_deref(),
            ProviderFamily::OpenAILike => self.openai.as_deref(),
            ProviderFamily::AnthropicLike => self.anthropic.as_deref(),
        }
    }
}

/// The user's three key slots, already mapped to a provider family each —
/// slot→family mapping is resolved by the caller via
/// `ProvidersConfig::slot_mapping` before reaching the router.
pub struct UserKeys {
    pub slots: [Option<(ProviderFamily, String)>; 3],
}

pub struct GenerateRequest {
    pub prompt: String,
    pub system: String,
    pub image: Option<ImagePart>,
    pub preferred_provider: Option<ProviderFamily>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

pub struct GenerateOutcome {
    pub text: String,
    pub provider_used: ProviderFamily,
    pub model_used: String,
}

/// One unified call surface over the three native provider families.
///
/// Resolution walks candidates in fixed order: preferred provider first
/// (if a matching key exists), then the user's own key slots, then
/// system-wide keys — failing over to the next candidate on auth or
/// transport errors.
pub struct Router {
    health: Arc<HealthTracker>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            health: HealthTracker::new(),
        }
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    /// This deployment ships only the minimal reqwest-based HTTP client per
    /// provider family — there is no official SDK crate wired in, so the
    /// router always reports the degraded/minimal implementation.
    pub fn modern(&self) -> bool {
        false
    }

    pub async fn generate(
        &self,
        req: GenerateRequest,
        user_keys: &UserKeys,
        system_keys: &SystemKeys,
    ) -> Result<GenerateOutcome, LlmError> {
        let candidates = self.resolve_candidates(&req, user_keys, system_keys);
        if candidates.is_empty() {
            return Err(LlmError::NoProviderAvailable);
        }

        let mut last_err: Option<ProviderError> = None;

        for (family, api_key) in candidates {
            let provider = build_provider(family, api_key);
            let model = family.default_model().to_string();

            if req.image.is_some() && !provider.supports_vision() {
                info!(provider = provider.name(), "skipping: no vision support for attached image");
                continue;
            }

            let chat_req = ChatRequest {
                model: model.clone(),
                system: req.system.clone(),
                messages: vec![Message {
                    role: Role::User,
                    content: req.prompt.clone(),
                }],
                max_tokens: req.max_tokens,
                temperature: req.temperature,
                image: req.image.clone(),
            };

            match self.call_with_retry(provider.as_ref(), &chat_req).await {
                Ok(resp) => {
                    return Ok(GenerateOutcome {
                        text: resp.content,
                        provider_used: family,
                        model_used: resp.model,
                    });
                }
                Err(ProviderError::AuthInvalid) => {
                    warn!(provider = provider.name(), "key rejected, trying next resolution step");
                    last_err = Some(ProviderError::AuthInvalid);
                    continue;
                }
                Err(e) => {
                    last_err = Some(e);
                }
            }
        }

        Err(classify_final_error(last_err))
    }

    /// Resolution order: preferred+matching key, then user slots 1..3,
    /// then system-wide keys, all in fixed order.
    fn resolve_candidates(
        &self,
        req: &GenerateRequest,
        user_keys: &UserKeys,
        system_keys: &SystemKeys,
    ) -> Vec<(ProviderFamily, String)> {
        let mut out = Vec::new();

        if let Some(preferred) = req.preferred_provider {
            if let Some(key) = user_keys
                .slots
                .iter()
                .flatten()
                .find(|(f, _)| *f == preferred)
                .map(|(_, k)| k.clone())
                .or_else(|| system_keys.get(preferred).map(String::from))
            {
                out.push((preferred, key));
            }
        }

        for slot in user_keys.slots.iter().flatten() {
            let (family, key) = slot;
            if !out.iter().any(|(f, k)| f == family && k == key) {
                out.push((*family, key.clone()));
            }
        }

        for family in [
            ProviderFamily::GeminiLike,
            ProviderFamily::OpenAILike,
            ProviderFamily::AnthropicLike,
        ] {
            if let Some(key) = system_keys.get(family) {
                if !out.iter().any(|(f, _)| *f == family) {
                    out.push((family, key.to_string()));
                }
            }
        }

        out
    }

    /// One transparent retry on transport/5xx errors with exponential
    /// backoff (500ms base, 4s cap); no retry on auth errors. Soft/hard
    /// timeouts wrap the whole attempt sequence for a single candidate.
    async fn call_with_retry(
        &self,
        provider: &dyn LlmProvider,
        req: &ChatRequest,
    ) -> Result<crate::provider::ChatResponse, ProviderError> {
        let started = std::time::Instant::now();
        let attempt_fut = async {
            let mut attempt = 0u32;
            loop {
                let result = tokio::time::timeout(SOFT_TIMEOUT, provider.send(req)).await;

                match result {
                    Ok(Ok(resp)) => {
                        self.health.record_success(provider.name(), started.elapsed().as_millis() as u64);
                        return Ok(resp);
                    }
                    Ok(Err(ProviderError::AuthInvalid)) => {
                        return Err(ProviderError::AuthInvalid);
                    }
                    Ok(Err(e @ ProviderError::RateLimited { .. })) => {
                        self.health.record_error(provider.name(), &e);
                        return Err(e);
                    }
                    Ok(Err(e)) => {
                        self.health.record_error(provider.name(), &e);
                        if attempt >= 1 {
                            return Err(e);
                        }
                        let backoff = (RETRY_BASE_MS * 2u64.pow(attempt)).min(RETRY_CAP_MS);
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                        attempt += 1;
                    }
                    Err(_elapsed) => {
                        let e = ProviderError::Unavailable("soft timeout".to_string());
                        self.health.record_error(provider.name(), &e);
                        if attempt >= 1 {
                            return Err(e);
                        }
                        attempt += 1;
                    }
                }
            }
        };

        match tokio::time::timeout(HARD_TIMEOUT, attempt_fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Unavailable("hard timeout".to_string())),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn build_provider(family: ProviderFamily, api_key: String) -> Box<dyn LlmProvider> {
    match family {
        ProviderFamily::GeminiLike => Box::new(GeminiProvider::new(api_key, None)),
        ProviderFamily::OpenAILike => Box::new(OpenAiProvider::new(api_key, None)),
        ProviderFamily::AnthropicLike => Box::new(AnthropicProvider::new(api_key, None)),
    }
}

fn classify_final_error(err: Option<ProviderError>) -> LlmError {
    match err {
        Some(ProviderError::AuthInvalid) => LlmError::KeyInvalid,
        Some(ProviderError::RateLimited { .. }) => LlmError::RateLimited,
        Some(ProviderError::Unavailable(m)) if m.contains("timeout") => LlmError::Timeout,
        Some(_) => LlmError::UpstreamError,
        None => LlmError::NoProviderAvailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChatResponse;
    use async_trait::async_trait;

    struct AlwaysFail;

    #[async_trait]
    impl LlmProvider for AlwaysFail {
        fn name(&self) -> &str {
            "always-fail"
        }
        fn supports_vision(&self) -> bool {
            true
        }
        async fn send(&self, _req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
            Err(ProviderError::Unavailable("intentional failure".to_string()))
        }
    }

    struct AlwaysOk;

    #[async_trait]
    impl LlmProvider for AlwaysOk {
        fn name(&self) -> &str {
            "always-ok"
        }
        fn supports_vision(&self) -> bool {
            true
        }
        async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
            Ok(ChatResponse {
                content: "ok".to_string(),
                model: req.model.clone(),
                tokens_in: 1,
                tokens_out: 1,
                stop_reason: "stop".to_string(),
            })
        }
    }

    #[test]
    fn resolve_candidates_prefers_matching_user_slot_first() {
        let router = Router::new();
        let req = GenerateRequest {
            prompt: "hi".to_string(),
            system: "".to_string(),
            image: None,
            preferred_provider: Some(ProviderFamily::AnthropicLike),
            max_tokens: 64,
            temperature: None,
        };
        let user_keys = UserKeys {
            slots: [
                Some((ProviderFamily::GeminiLike, "g-key".to_string())),
                None,
                Some((ProviderFamily::AnthropicLike, "a-key".to_string())),
            ],
        };
        let system_keys = SystemKeys::default();

        let candidates = router.resolve_candidates(&req, &user_keys, &system_keys);
        assert_eq!(candidates[0].0, ProviderFamily::AnthropicLike);
        assert_eq!(candidates[0].1, "a-key");
    }

    #[test]
    fn resolve_candidates_falls_back_to_system_keys_when_no_user_slots() {
        let router = Router::new();
        let req = GenerateRequest {
            prompt: "hi".to_string(),
            system: "".to_string(),
            image: None,
            preferred_provider: None,
            max_tokens: 64,
            temperature: None,
        };
        let user_keys = UserKeys { slots: [None, None, None] };
        let system_keys = SystemKeys {
            gemini: Some("sys-gemini".to_string()),
            ..Default::default()
        };

        let candidates = router.resolve_candidates(&req, &user_keys, &system_keys);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, ProviderFamily::GeminiLike);
    }

    #[tokio::test]
    async fn call_with_retry_falls_back_within_one_retry() {
        let router = Router::new();
        let req = ChatRequest {
            model: "test-model".to_string(),
            system: "sys".to_string(),
            messages: vec![Message { role: Role::User, content: "hi".to_string() }],
            max_tokens: 64,
            temperature: None,
            image: None,
        };
        let result = router.call_with_retry(&AlwaysFail, &req).await;
        assert!(result.is_err());

        let ok_result = router.call_with_retry(&AlwaysOk, &req).await;
        assert!(ok_result.is_ok());
    }
}
