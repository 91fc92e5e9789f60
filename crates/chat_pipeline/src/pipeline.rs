use std::sync::Arc;

use chat_logging::{chat_info, chat_warn};

use crate::service::QuestionService;
use crate::{
    DisplayEvent, ExchangeId, MatchLine, PipelineError, PipelineEvent, RunOutcome, ServiceError,
    Stage, ValidationOutcome, FEEDBACK_PROMPT,
};

/// Receives display events as soon as they are produced.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DisplayEvent);
}

/// Forwards display events of one exchange to the handle's event channel.
pub struct ChannelEventSink {
    exchange_id: ExchangeId,
    tx: std::sync::mpsc::Sender<PipelineEvent>,
}

impl ChannelEventSink {
    pub fn new(exchange_id: ExchangeId, tx: std::sync::mpsc::Sender<PipelineEvent>) -> Self {
        Self { exchange_id, tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: DisplayEvent) {
        let _ = self.tx.send(PipelineEvent::Display {
            exchange_id: self.exchange_id,
            event,
        });
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Emit a `StatusUpdate` before each stage's request.
    pub announce_progress: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            announce_progress: true,
        }
    }
}

/// Drives one message through validate, refine and similarity, in that order.
#[derive(Clone)]
pub struct ConversationPipeline {
    service: Arc<dyn QuestionService>,
    settings: PipelineSettings,
}

impl ConversationPipeline {
    pub fn new(service: Arc<dyn QuestionService>, settings: PipelineSettings) -> Self {
        Self { service, settings }
    }

    /// Runs the stages for `raw_text`, emitting events to `sink` as they happen.
    ///
    /// Blank input emits nothing and issues no request. A transport failure
    /// stops the run at the failing stage; events already emitted stand.
    pub async fn run(
        &self,
        raw_text: &str,
        sink: &dyn EventSink,
    ) -> Result<RunOutcome, PipelineError> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Ok(RunOutcome::Ignored);
        }

        sink.emit(DisplayEvent::UserEcho(raw_text.to_string()));

        self.announce(Stage::Validate, sink);
        let validation = self
            .service
            .validate(text)
            .await
            .map_err(|err| stage_failed(Stage::Validate, err))?;
        if !validation.is_valid {
            chat_info!("question rejected: {:?}", validation.reason);
            sink.emit(DisplayEvent::ValidationOutcome(ValidationOutcome::Invalid {
                reason: validation.reason,
            }));
            return Ok(RunOutcome::Rejected);
        }
        sink.emit(DisplayEvent::ValidationOutcome(ValidationOutcome::Valid));

        self.announce(Stage::Refine, sink);
        let refined = self
            .service
            .refine(text, "")
            .await
            .map_err(|err| stage_failed(Stage::Refine, err))?;
        sink.emit(DisplayEvent::RefinementOutcome(
            refined.revised_question.clone(),
        ));

        self.announce(Stage::Similarity, sink);
        let matches = self
            .service
            .similar(&refined.revised_question)
            .await
            .map_err(|err| stage_failed(Stage::Similarity, err))?;
        chat_info!("{} similar question(s)", matches.len());
        sink.emit(DisplayEvent::SimilarityOutcome(
            matches.iter().map(MatchLine::from).collect(),
        ));

        sink.emit(DisplayEvent::Prompt(FEEDBACK_PROMPT.to_string()));
        Ok(RunOutcome::Completed)
    }

    fn announce(&self, stage: Stage, sink: &dyn EventSink) {
        if self.settings.announce_progress {
            sink.emit(DisplayEvent::StatusUpdate(stage));
        }
    }
}

fn stage_failed(stage: Stage, err: ServiceError) -> PipelineError {
    let err = PipelineError::at(stage, err);
    chat_warn!("{}", err);
    err
}
