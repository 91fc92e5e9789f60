use crate::{AppState, Effect, Msg};

const VALID_QUESTION: &str = "Validation: Valid question";
const REWRITE_HINT: &str = "Try rewriting your question and send again.";
const SIMILAR_HEADER: &str = "Similar questions found:";
const NO_SIMILAR: &str = "No similar questions found.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SendClicked => {
            if state.input().trim().is_empty() || state.quit_requested() {
                return (state, Vec::new());
            }
            let text = state.take_input();
            if state.in_flight().is_some() {
                // Submitted once the running exchange ends.
                state.enqueue(text);
                return (state, Vec::new());
            }
            let exchange_id = state.begin_exchange();
            vec![Effect::SubmitQuestion { exchange_id, text }]
        }
        Msg::QuitRequested => {
            state.request_quit();
            Vec::new()
        }
        Msg::UserEchoed(text) => {
            state.push_user(text.trim());
            Vec::new()
        }
        Msg::StatusShown(kind) => {
            state.show_status(kind);
            Vec::new()
        }
        Msg::Validated { valid: true, .. } => {
            state.push_bot(VALID_QUESTION);
            Vec::new()
        }
        Msg::Validated {
            valid: false,
            reason,
        } => {
            let reason = reason.as_deref().unwrap_or("no reason given");
            state.push_bot(format!("Invalid question: {reason}"));
            state.push_bot(REWRITE_HINT);
            Vec::new()
        }
        Msg::Refined(question) => {
            state.push_bot(format!("Refined: {question}"));
            Vec::new()
        }
        Msg::SimilarFound(lines) => {
            if lines.is_empty() {
                state.push_bot(NO_SIMILAR);
            } else {
                state.push_bot(SIMILAR_HEADER);
                for line in lines {
                    state.push_bot(format!("- {} (score {})", line.question, line.score));
                }
            }
            Vec::new()
        }
        Msg::PromptShown(text) => {
            state.push_bot(text);
            Vec::new()
        }
        Msg::ExchangeFinished { exchange_id } => {
            if state.in_flight() != Some(exchange_id) {
                return (state, Vec::new());
            }
            state.end_exchange();
            submit_queued(&mut state)
        }
        Msg::ExchangeFailed {
            exchange_id,
            stage,
            message,
        } => {
            if state.in_flight() != Some(exchange_id) {
                return (state, Vec::new());
            }
            state.push_bot(format!(
                "Request failed while {}: {message}",
                stage.activity()
            ));
            state.end_exchange();
            submit_queued(&mut state)
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_queued(state: &mut AppState) -> Vec<Effect> {
    match state.next_queued() {
        Some(text) => {
            let exchange_id = state.begin_exchange();
            vec![Effect::SubmitQuestion { exchange_id, text }]
        }
        None => Vec::new(),
    }
}
