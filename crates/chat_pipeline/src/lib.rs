//! Chat pipeline: the validate, refine and similarity exchange with the question backend.
mod handle;
mod pipeline;
mod service;
mod types;
mod wire;

pub use handle::{HandleError, PipelineHandle};
pub use pipeline::{ChannelEventSink, ConversationPipeline, EventSink, PipelineSettings};
pub use service::{QuestionService, ReqwestQuestionService, ServiceSettings};
pub use types::{
    DisplayEvent, ExchangeId, FailureKind, MatchLine, PipelineError, PipelineEvent,
    RefinementResult, RunOutcome, ServiceError, SimilarityMatch, SimilarityResult, Stage,
    ValidationOutcome, ValidationResult, FEEDBACK_PROMPT,
};
pub use wire::{decode_refinement, decode_similarity, decode_validation};
