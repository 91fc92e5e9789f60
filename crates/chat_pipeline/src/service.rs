use std::time::Duration;

use chat_logging::{chat_debug, chat_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use url::Url;

use crate::wire::{
    decode_refinement, decode_similarity, decode_validation, RefineRequest, SimilarityRequest,
    ValidateRequest,
};
use crate::{
    FailureKind, RefinementResult, ServiceError, SimilarityResult, Stage, ValidationResult,
};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Address the `chat`, `refine` and `similarity` endpoints hang off.
    pub base_url: String,
    /// `None` waits for the connection indefinitely.
    pub connect_timeout: Option<Duration>,
    /// `None` waits for the response indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: None,
            request_timeout: None,
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// The three remote calls a question goes through.
#[async_trait::async_trait]
pub trait QuestionService: Send + Sync {
    async fn validate(&self, message: &str) -> Result<ValidationResult, ServiceError>;

    /// `feedback` is empty on a first pass.
    async fn refine(&self, question: &str, feedback: &str)
        -> Result<RefinementResult, ServiceError>;

    async fn similar(&self, question: &str) -> Result<SimilarityResult, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestQuestionService {
    settings: ServiceSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestQuestionService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let base = parse_base_url(&settings.base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn endpoint(&self, stage: Stage) -> Result<Url, ServiceError> {
        self.base
            .join(stage.endpoint())
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post<B>(&self, stage: Stage, body: &B) -> Result<Vec<u8>, ServiceError>
    where
        B: Serialize + Sync,
    {
        let url = self.endpoint(stage)?;
        let payload = encode_body(body)?;

        chat_debug!("POST {} ({} bytes)", url, payload.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            chat_warn!("{} answered {}", stage.endpoint(), status);
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ServiceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        chat_debug!("{} answered {} bytes", stage.endpoint(), bytes.len());
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl QuestionService for ReqwestQuestionService {
    async fn validate(&self, message: &str) -> Result<ValidationResult, ServiceError> {
        let body = self.post(Stage::Validate, &ValidateRequest { message }).await?;
        decode_validation(&body)
    }

    async fn refine(
        &self,
        question: &str,
        feedback: &str,
    ) -> Result<RefinementResult, ServiceError> {
        let body = self
            .post(Stage::Refine, &RefineRequest { question, feedback })
            .await?;
        decode_refinement(&body)
    }

    async fn similar(&self, question: &str) -> Result<SimilarityResult, ServiceError> {
        let body = self
            .post(Stage::Similarity, &SimilarityRequest { question })
            .await?;
        decode_similarity(&body)
    }
}

/// Endpoint names are joined onto the base, so its path must end in `/`
/// for `https://host/api` to resolve to `https://host/api/chat`.
fn parse_base_url(raw: &str) -> Result<Url, ServiceError> {
    let mut base = Url::parse(raw.trim())
        .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
        return Err(ServiceError::new(
            FailureKind::InvalidUrl,
            format!("not an http base address: {raw}"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Ok(base)
}

fn encode_body<B: Serialize>(body: &B) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec(body)
        .map_err(|err| ServiceError::new(FailureKind::InvalidRequest, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
