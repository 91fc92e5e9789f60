use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use chat_logging::{chat_debug, set_exchange};

use crate::pipeline::{ChannelEventSink, ConversationPipeline, PipelineSettings};
use crate::service::{QuestionService, ReqwestQuestionService, ServiceSettings};
use crate::{ExchangeId, PipelineEvent, ServiceError};

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("could not start pipeline runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("pipeline worker has stopped")]
    Stopped,
}

enum PipelineCommand {
    Submit { exchange_id: ExchangeId, text: String },
}

/// Runs the pipeline on a worker thread, one submitted message at a time.
///
/// Commands are awaited in submission order, so the display events of two
/// exchanges never interleave on the event channel.
#[derive(Clone)]
pub struct PipelineHandle {
    cmd_tx: mpsc::Sender<PipelineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<PipelineEvent>>>,
}

impl PipelineHandle {
    pub fn new(
        service_settings: ServiceSettings,
        settings: PipelineSettings,
    ) -> Result<Self, HandleError> {
        let service = ReqwestQuestionService::new(service_settings)?;
        Self::with_service(Arc::new(service), settings)
    }

    pub fn with_service(
        service: Arc<dyn QuestionService>,
        settings: PipelineSettings,
    ) -> Result<Self, HandleError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let pipeline = ConversationPipeline::new(service, settings);
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                runtime.block_on(handle_command(&pipeline, command, &event_tx));
            }
            chat_debug!("pipeline worker stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Fails only once the worker thread is gone.
    pub fn submit(
        &self,
        exchange_id: ExchangeId,
        text: impl Into<String>,
    ) -> Result<(), HandleError> {
        self.cmd_tx
            .send(PipelineCommand::Submit {
                exchange_id,
                text: text.into(),
            })
            .map_err(|_| HandleError::Stopped)
    }

    pub fn try_recv(&self) -> Option<PipelineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PipelineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    pipeline: &ConversationPipeline,
    command: PipelineCommand,
    event_tx: &mpsc::Sender<PipelineEvent>,
) {
    match command {
        PipelineCommand::Submit { exchange_id, text } => {
            set_exchange(exchange_id);
            let sink = ChannelEventSink::new(exchange_id, event_tx.clone());
            let result = pipeline.run(&text, &sink).await;
            chat_debug!("exchange finished: {:?}", result);
            let _ = event_tx.send(PipelineEvent::Finished {
                exchange_id,
                result,
            });
            set_exchange(0);
        }
    }
}
