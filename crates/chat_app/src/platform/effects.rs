use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chat_core::{Effect, ExchangeId, Msg, SimilarLine, StatusKind};
use chat_logging::{chat_info, chat_warn};
use chat_pipeline::{
    DisplayEvent, HandleError, PipelineEvent, PipelineHandle, Stage, ValidationOutcome,
};

use super::config::WidgetConfig;

pub struct EffectRunner {
    pipeline: PipelineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: &WidgetConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, HandleError> {
        let pipeline =
            PipelineHandle::new(config.service_settings(), config.pipeline_settings())?;
        let runner = Self { pipeline, msg_tx };
        runner.spawn_event_loop(runner.msg_tx.clone());
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitQuestion { exchange_id, text } => {
                    chat_info!("SubmitQuestion exchange_id={} len={}", exchange_id, text.len());
                    if let Err(err) = self.pipeline.submit(exchange_id, text) {
                        chat_warn!("Exchange {} not submitted: {}", exchange_id, err);
                        let _ = self.msg_tx.send(submit_failed(exchange_id, &err));
                    }
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let pipeline = self.pipeline.clone();
        thread::spawn(move || loop {
            if let Some(event) = pipeline.recv_timeout(Duration::from_millis(50)) {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

fn map_event(event: PipelineEvent) -> Msg {
    match event {
        PipelineEvent::Display { event, .. } => match event {
            DisplayEvent::UserEcho(text) => Msg::UserEchoed(text),
            DisplayEvent::StatusUpdate(stage) => Msg::StatusShown(map_stage(stage)),
            DisplayEvent::ValidationOutcome(ValidationOutcome::Valid) => Msg::Validated {
                valid: true,
                reason: None,
            },
            DisplayEvent::ValidationOutcome(ValidationOutcome::Invalid { reason }) => {
                Msg::Validated {
                    valid: false,
                    reason,
                }
            }
            DisplayEvent::RefinementOutcome(question) => Msg::Refined(question),
            DisplayEvent::SimilarityOutcome(lines) => Msg::SimilarFound(
                lines
                    .into_iter()
                    .map(|line| SimilarLine {
                        question: line.question,
                        score: line.score,
                    })
                    .collect(),
            ),
            DisplayEvent::Prompt(text) => Msg::PromptShown(text),
        },
        PipelineEvent::Finished {
            exchange_id,
            result: Ok(_),
        } => Msg::ExchangeFinished { exchange_id },
        PipelineEvent::Finished {
            exchange_id,
            result: Err(err),
        } => {
            chat_warn!("Exchange {} failed: {}", exchange_id, err);
            Msg::ExchangeFailed {
                exchange_id,
                stage: map_stage(err.stage),
                message: err.kind.to_string(),
            }
        }
    }
}

/// The exchange never reached the backend, so it fails at the first stage.
fn submit_failed(exchange_id: ExchangeId, err: &HandleError) -> Msg {
    Msg::ExchangeFailed {
        exchange_id,
        stage: StatusKind::Validating,
        message: err.to_string(),
    }
}

fn map_stage(stage: Stage) -> StatusKind {
    match stage {
        Stage::Validate => StatusKind::Validating,
        Stage::Refine => StatusKind::Refining,
        Stage::Similarity => StatusKind::CheckingSimilarity,
    }
}
