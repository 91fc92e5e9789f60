mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chat_pipeline::{
    DisplayEvent, HandleError, PipelineEvent, PipelineHandle, PipelineSettings, QuestionService,
    RefinementResult, RunOutcome, ServiceError, SimilarityResult, ValidationResult,
};
use common::ScriptedService;

fn drain_until_finished(handle: &PipelineHandle, exchanges: usize) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    let mut finished = 0;
    while finished < exchanges {
        let event = handle
            .recv_timeout(Duration::from_secs(5))
            .expect("pipeline event before timeout");
        if matches!(event, PipelineEvent::Finished { .. }) {
            finished += 1;
        }
        events.push(event);
    }
    events
}

#[test]
fn submitted_messages_run_one_after_another() {
    let service = Arc::new(ScriptedService::valid("refined", vec![("older", 0.95)]));
    let handle = PipelineHandle::with_service(
        service,
        PipelineSettings {
            announce_progress: false,
        },
    )
    .expect("handle");

    handle.submit(1, "first?").expect("submit");
    handle.submit(2, "second?").expect("submit");
    let events = drain_until_finished(&handle, 2);

    let ids: Vec<_> = events
        .iter()
        .map(|event| match event {
            PipelineEvent::Display { exchange_id, .. }
            | PipelineEvent::Finished { exchange_id, .. } => *exchange_id,
        })
        .collect();
    let second_start = ids.iter().position(|id| *id == 2).expect("second exchange");
    assert!(ids[..second_start].iter().all(|id| *id == 1));
    assert!(ids[second_start..].iter().all(|id| *id == 2));

    assert_eq!(
        events[0],
        PipelineEvent::Display {
            exchange_id: 1,
            event: DisplayEvent::UserEcho("first?".to_string()),
        }
    );
    assert_eq!(
        events[second_start - 1],
        PipelineEvent::Finished {
            exchange_id: 1,
            result: Ok(RunOutcome::Completed),
        }
    );
}

#[test]
fn blank_submission_finishes_without_display_events() {
    let service = Arc::new(ScriptedService::valid("unused", Vec::new()));
    let handle = PipelineHandle::with_service(service.clone(), PipelineSettings::default())
        .expect("handle");

    handle.submit(9, "   ").expect("submit");
    let events = drain_until_finished(&handle, 1);

    assert_eq!(
        events,
        vec![PipelineEvent::Finished {
            exchange_id: 9,
            result: Ok(RunOutcome::Ignored),
        }]
    );
    assert!(service.calls().is_empty());
    assert!(handle.try_recv().is_none());
}

/// Takes the worker thread down on the first call.
struct PanickingService;

#[async_trait::async_trait]
impl QuestionService for PanickingService {
    async fn validate(&self, _message: &str) -> Result<ValidationResult, ServiceError> {
        panic!("backend blew up");
    }

    async fn refine(
        &self,
        _question: &str,
        _feedback: &str,
    ) -> Result<RefinementResult, ServiceError> {
        unreachable!()
    }

    async fn similar(&self, _question: &str) -> Result<SimilarityResult, ServiceError> {
        unreachable!()
    }
}

#[test]
fn submit_reports_a_stopped_worker() {
    let handle = PipelineHandle::with_service(
        Arc::new(PanickingService),
        PipelineSettings {
            announce_progress: false,
        },
    )
    .expect("handle");

    handle.submit(1, "q?").expect("worker still running");
    // The event channel closes when the worker unwinds.
    while handle.recv_timeout(Duration::from_secs(5)).is_some() {}

    let mut result = handle.submit(2, "q?");
    for _ in 0..100 {
        if result.is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(10));
        result = handle.submit(2, "q?");
    }
    assert!(matches!(result, Err(HandleError::Stopped)));
}
